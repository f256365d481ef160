//! Predicate evaluation for job search and feed narrowing.
//!
//! Every axis is independent and an empty constraint always passes. String
//! tests are case-insensitive substring matches, never tokenized.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;

use crate::dto::job_dto::{JobFilterCriteria, JobSortOrder};
use crate::dto::post_dto::FeedFilter;
use crate::models::job::{JobPosting, WorkType};
use crate::models::post::Post;
use crate::utils::text::contains_ci;

fn normalized(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Criteria compiled once per search so the per-job test does no allocation
/// beyond the lowercase comparisons.
pub struct JobMatcher<'a> {
    criteria: &'a JobFilterCriteria,
    keyword: Option<String>,
    location: Option<String>,
    posted_after: Option<DateTime<Utc>>,
}

impl<'a> JobMatcher<'a> {
    pub fn new(criteria: &'a JobFilterCriteria, now: DateTime<Utc>) -> Self {
        Self {
            criteria,
            keyword: normalized(&criteria.keyword),
            location: normalized(&criteria.location),
            posted_after: criteria.posted_within.cutoff(now),
        }
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        self.matches_keyword(job)
            && self.matches_location(job)
            && self.matches_sets(job)
            && job
                .salary_range
                .overlaps(self.criteria.salary_min, self.criteria.salary_max)
            && (!self.criteria.remote_only || job.work_type == WorkType::Remote)
            && (!self.criteria.easy_apply_only || job.is_easy_apply)
            && self.posted_after.map_or(true, |cutoff| job.posted_date >= cutoff)
    }

    fn matches_keyword(&self, job: &JobPosting) -> bool {
        let Some(keyword) = &self.keyword else {
            return true;
        };
        contains_ci(&job.title, keyword)
            || contains_ci(&job.company, keyword)
            || job.skills.iter().any(|skill| contains_ci(skill, keyword))
    }

    fn matches_location(&self, job: &JobPosting) -> bool {
        self.location
            .as_deref()
            .map_or(true, |location| contains_ci(&job.location, location))
    }

    fn matches_sets(&self, job: &JobPosting) -> bool {
        let c = self.criteria;
        (c.work_types.is_empty() || c.work_types.contains(&job.work_type))
            && (c.employment_types.is_empty() || c.employment_types.contains(&job.employment_type))
            && (c.experience_levels.is_empty()
                || c.experience_levels.contains(&job.experience_level))
            && (c.company_sizes.is_empty() || c.company_sizes.contains(&job.company_size))
    }
}

pub fn evaluate(job: &JobPosting, criteria: &JobFilterCriteria, now: DateTime<Utc>) -> bool {
    JobMatcher::new(criteria, now).matches(job)
}

/// Filters and orders `jobs` for `criteria`. Ties keep input order.
pub fn search_jobs(
    jobs: &[JobPosting],
    criteria: &JobFilterCriteria,
    now: DateTime<Utc>,
) -> Vec<JobPosting> {
    let matcher = JobMatcher::new(criteria, now);
    let mut results: Vec<JobPosting> = jobs
        .iter()
        .filter(|j| matcher.matches(j))
        .cloned()
        .collect();
    sort_jobs(&mut results, criteria.sort);
    results
}

pub fn sort_jobs(jobs: &mut [JobPosting], order: JobSortOrder) {
    match order {
        JobSortOrder::MostRecent => jobs.sort_by_key(|j| Reverse(j.posted_date)),
        JobSortOrder::HighestSalary => jobs.sort_by_key(|j| Reverse(j.salary_range.max)),
        JobSortOrder::MostApplicants => jobs.sort_by_key(|j| Reverse(j.applicant_count)),
    }
}

impl FeedFilter {
    pub fn matches(&self, post: &Post) -> bool {
        let author_ok = self
            .author_id
            .as_deref()
            .map_or(true, |author| post.author_id == author);

        let hashtag_ok = normalized(self.hashtag.trim().trim_start_matches('#'))
            .map_or(true, |tag| post.hashtags.iter().any(|h| *h == tag));

        let keyword_ok =
            normalized(&self.keyword).map_or(true, |keyword| contains_ci(&post.content, &keyword));

        author_ok && hashtag_ok && keyword_ok
    }
}
