use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::job::{
    ApplicationStatus, CompanySize, EmploymentType, ExperienceLevel, JobApplication, JobPosting,
    SalaryRange, WorkType,
};
use crate::services::job_store::{JobAnalytics, JobStoreSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PostedWithin {
    #[serde(rename = "past_24_hours")]
    Past24Hours,
    #[serde(rename = "past_week")]
    PastWeek,
    #[serde(rename = "past_month")]
    PastMonth,
    #[default]
    #[serde(rename = "any_time")]
    AnyTime,
}

impl PostedWithin {
    pub fn window(&self) -> Option<Duration> {
        match self {
            PostedWithin::Past24Hours => Some(Duration::hours(24)),
            PostedWithin::PastWeek => Some(Duration::days(7)),
            PostedWithin::PastMonth => Some(Duration::days(30)),
            PostedWithin::AnyTime => None,
        }
    }

    /// Oldest posting date still inside the window, if there is one.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSortOrder {
    #[default]
    MostRecent,
    HighestSalary,
    MostApplicants,
}

/// Job search criteria. Every empty field means "no constraint on this axis".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobFilterCriteria {
    pub keyword: String,
    pub location: String,
    pub work_types: BTreeSet<WorkType>,
    pub employment_types: BTreeSet<EmploymentType>,
    pub experience_levels: BTreeSet<ExperienceLevel>,
    pub company_sizes: BTreeSet<CompanySize>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub remote_only: bool,
    pub easy_apply_only: bool,
    pub posted_within: PostedWithin,
    pub sort: JobSortOrder,
}

impl JobFilterCriteria {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Number of axes that actually constrain results (sort order excluded).
    pub fn active_filter_count(&self) -> usize {
        [
            !self.keyword.trim().is_empty(),
            !self.location.trim().is_empty(),
            !self.work_types.is_empty(),
            !self.employment_types.is_empty(),
            !self.experience_levels.is_empty(),
            !self.company_sizes.is_empty(),
            self.salary_min.is_some() || self.salary_max.is_some(),
            self.remote_only,
            self.easy_apply_only,
            self.posted_within != PostedWithin::AnyTime,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JobMutation {
    Apply {
        #[serde(default)]
        cover_letter: Option<String>,
    },
    Save,
    Unsave,
    View,
    Withdraw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusPayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub work_type: WorkType,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary_range: SalaryRange,
    pub posted_date: DateTime<Utc>,
    pub applicant_count: u32,
    pub is_active: bool,
    pub is_easy_apply: bool,
    pub saved: bool,
}

impl JobSummary {
    pub fn for_user(job: &JobPosting, user_id: &str) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            work_type: job.work_type,
            employment_type: job.employment_type,
            experience_level: job.experience_level,
            salary_range: job.salary_range.clone(),
            posted_date: job.posted_date,
            applicant_count: job.applicant_count,
            is_active: job.is_active,
            is_easy_apply: job.is_easy_apply,
            saved: job.is_saved_by(user_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub items: Vec<JobSummary>,
    pub page: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub total_matches: usize,
    pub analytics: JobAnalytics,
}

impl JobListResponse {
    pub fn from_snapshot(snapshot: JobStoreSnapshot, user_id: &str) -> Self {
        Self {
            items: snapshot
                .results
                .iter()
                .map(|job| JobSummary::for_user(job, user_id))
                .collect(),
            page: snapshot.current_page,
            has_more: snapshot.has_more,
            is_loading: snapshot.is_loading,
            total_matches: snapshot.total_matches,
            analytics: snapshot.analytics,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub items: Vec<JobApplication>,
    pub total: usize,
}

impl From<Vec<JobApplication>> for ApplicationListResponse {
    fn from(items: Vec<JobApplication>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}
