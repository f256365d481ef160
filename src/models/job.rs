use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Remote,
    OnSite,
    Hybrid,
}

impl WorkType {
    pub const ALL: [WorkType; 3] = [WorkType::Remote, WorkType::OnSite, WorkType::Hybrid];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 5] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::Internship,
        EmploymentType::Freelance,
    ];
}

/// Seniority ladder; the derived ordering runs from internship up to executive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Internship,
    Entry,
    Associate,
    MidSenior,
    Director,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 6] = [
        ExperienceLevel::Internship,
        ExperienceLevel::Entry,
        ExperienceLevel::Associate,
        ExperienceLevel::MidSenior,
        ExperienceLevel::Director,
        ExperienceLevel::Executive,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySize {
    Startup,
    Small,
    Medium,
    Large,
    Enterprise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryPeriod {
    Hourly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Decimal,
    pub max: Decimal,
    pub currency: String,
    pub period: SalaryPeriod,
}

impl SalaryRange {
    pub fn midpoint(&self) -> Decimal {
        (self.min + self.max) / Decimal::TWO
    }

    /// True when `[min, max]` intersects the optional bounds.
    pub fn overlaps(&self, lower: Option<Decimal>, upper: Option<Decimal>) -> bool {
        lower.map_or(true, |lo| self.max >= lo) && upper.map_or(true, |hi| self.min <= hi)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_size: CompanySize,
    pub location: String,
    pub work_type: WorkType,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub benefits: Vec<String>,
    pub skills: Vec<String>,
    pub salary_range: SalaryRange,
    pub posted_date: DateTime<Utc>,
    pub applicant_count: u32,
    pub view_count: u32,
    pub is_active: bool,
    pub is_easy_apply: bool,
    pub saved_by_user_ids: BTreeSet<String>,
}

impl JobPosting {
    pub fn is_saved_by(&self, user_id: &str) -> bool {
        self.saved_by_user_ids.contains(user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    Reviewing,
    Shortlisted,
    Interviewing,
    Offered,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }

    fn stage(&self) -> Option<u8> {
        match self {
            ApplicationStatus::Submitted => Some(0),
            ApplicationStatus::Reviewing => Some(1),
            ApplicationStatus::Shortlisted => Some(2),
            ApplicationStatus::Interviewing => Some(3),
            ApplicationStatus::Offered => Some(4),
            ApplicationStatus::Accepted => Some(5),
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => None,
        }
    }

    /// Forward moves along the pipeline one step at a time; rejected/withdrawn
    /// are reachable from any non-terminal state.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.stage(), next.stage()) {
            (Some(from), Some(to)) => to == from + 1,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: String,
    pub job_id: String,
    pub applicant_user_id: String,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn range(min: i64, max: i64) -> SalaryRange {
        SalaryRange {
            min: dec(min),
            max: dec(max),
            currency: "USD".into(),
            period: SalaryPeriod::Yearly,
        }
    }

    #[test]
    fn experience_levels_are_ordered() {
        assert!(ExperienceLevel::Internship < ExperienceLevel::Entry);
        assert!(ExperienceLevel::MidSenior < ExperienceLevel::Executive);
    }

    #[test]
    fn salary_overlap_is_inclusive() {
        let r = range(80_000, 120_000);
        assert!(r.overlaps(None, None));
        assert!(r.overlaps(Some(dec(120_000)), None));
        assert!(!r.overlaps(Some(dec(120_001)), None));
        assert!(r.overlaps(None, Some(dec(80_000))));
        assert!(!r.overlaps(None, Some(dec(79_999))));
        assert_eq!(r.midpoint(), dec(100_000));
    }

    #[test]
    fn application_pipeline_moves_one_step() {
        use ApplicationStatus::*;
        assert!(Submitted.can_transition_to(Reviewing));
        assert!(!Submitted.can_transition_to(Interviewing));
        assert!(Interviewing.can_transition_to(Rejected));
        assert!(Offered.can_transition_to(Accepted));
        assert!(!Accepted.can_transition_to(Withdrawn));
        assert!(!Withdrawn.can_transition_to(Reviewing));
    }
}
