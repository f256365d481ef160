use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dto::job_dto::{JobFilterCriteria, JobMutation};
use crate::error::{Error, Result};
use crate::models::job::{ApplicationStatus, JobApplication, JobPosting, SalaryPeriod, WorkType};
use crate::models::user::Session;
use crate::services::filter::search_jobs;
use crate::services::pagination::PaginationCursor;
use crate::services::store::{
    lock, simulate_latency, top_counts, CachedCollection, MutationOutcome, Publisher, RankedCount,
};
use crate::utils::time::Clock;

const TOP_N: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobAnalytics {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: u64,
    pub total_views: u64,
    /// Mean salary midpoint over yearly-paid postings.
    pub average_salary: Decimal,
    pub average_applicants: f64,
    pub saved_count: usize,
    pub my_application_count: usize,
    pub jobs_by_work_type: BTreeMap<WorkType, usize>,
    pub top_companies: Vec<RankedCount>,
    pub top_skills: Vec<RankedCount>,
}

impl JobAnalytics {
    pub fn compute(jobs: &[JobPosting], applications: &[JobApplication], user_id: &str) -> Self {
        let total_jobs = jobs.len();
        let total_applications: u64 = jobs.iter().map(|j| u64::from(j.applicant_count)).sum();

        let yearly: Vec<Decimal> = jobs
            .iter()
            .filter(|j| j.salary_range.period == SalaryPeriod::Yearly)
            .map(|j| j.salary_range.midpoint())
            .collect();
        let average_salary = if yearly.is_empty() {
            Decimal::ZERO
        } else {
            (yearly.iter().copied().sum::<Decimal>() / Decimal::from(yearly.len())).round_dp(2)
        };

        let mut jobs_by_work_type = BTreeMap::new();
        for job in jobs {
            *jobs_by_work_type.entry(job.work_type).or_insert(0) += 1;
        }

        Self {
            total_jobs,
            active_jobs: jobs.iter().filter(|j| j.is_active).count(),
            total_applications,
            total_views: jobs.iter().map(|j| u64::from(j.view_count)).sum(),
            average_salary,
            average_applicants: if total_jobs == 0 {
                0.0
            } else {
                total_applications as f64 / total_jobs as f64
            },
            saved_count: jobs.iter().filter(|j| j.is_saved_by(user_id)).count(),
            my_application_count: applications
                .iter()
                .filter(|a| a.applicant_user_id == user_id)
                .count(),
            jobs_by_work_type,
            top_companies: top_counts(jobs.iter().map(|j| j.company.as_str()), TOP_N),
            top_skills: top_counts(
                jobs.iter().flat_map(|j| j.skills.iter().map(String::as_str)),
                TOP_N,
            ),
        }
    }
}

/// What subscribers see after every publish.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStoreSnapshot {
    pub results: Vec<JobPosting>,
    pub criteria: JobFilterCriteria,
    pub current_page: usize,
    pub has_more: bool,
    pub is_loading: bool,
    pub total_matches: usize,
    pub analytics: JobAnalytics,
}

struct JobState {
    catalog: Vec<JobPosting>,
    /// Ids of the current search results, in result order.
    matches: Vec<String>,
    collection: CachedCollection<JobPosting>,
    cursor: PaginationCursor,
    criteria: JobFilterCriteria,
    applications: Vec<JobApplication>,
    analytics: JobAnalytics,
    is_loading: bool,
    generation: u64,
}

impl JobState {
    fn find(&self, id: &str) -> Option<&JobPosting> {
        self.catalog.iter().find(|j| j.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut JobPosting> {
        self.catalog.iter_mut().find(|j| j.id == id)
    }

    fn next_page(&mut self) -> Vec<JobPosting> {
        let ids = self.cursor.next_page(&self.matches).to_vec();
        ids.iter().filter_map(|id| self.find(id).cloned()).collect()
    }

    fn run_search(&mut self, criteria: JobFilterCriteria, now: chrono::DateTime<Utc>) {
        self.matches = search_jobs(&self.catalog, &criteria, now)
            .into_iter()
            .map(|j| j.id)
            .collect();
        self.criteria = criteria;
        self.cursor.reset();
        let page = self.next_page();
        self.collection.replace_visible(page);
    }

    fn application_index(&self, job_id: &str, user_id: &str) -> Option<usize> {
        self.applications
            .iter()
            .position(|a| a.job_id == job_id && a.applicant_user_id == user_id)
    }

    fn snapshot(&self) -> JobStoreSnapshot {
        JobStoreSnapshot {
            results: self.collection.visible().to_vec(),
            criteria: self.criteria.clone(),
            current_page: self.cursor.current_page(),
            has_more: self.cursor.has_more(),
            is_loading: self.is_loading,
            total_matches: self.matches.len(),
            analytics: self.analytics.clone(),
        }
    }
}

/// Job search results with paging, saved/applied state and analytics.
#[derive(Clone)]
pub struct JobStore {
    state: Arc<Mutex<JobState>>,
    publisher: Arc<Publisher<JobStoreSnapshot>>,
    clock: Arc<dyn Clock>,
    session: Session,
    latency: Duration,
}

impl JobStore {
    /// Builds the store over `jobs` and publishes the unfiltered first page.
    pub fn new(
        jobs: Vec<JobPosting>,
        session: Session,
        page_size: usize,
        clock: Arc<dyn Clock>,
        latency: Duration,
    ) -> Self {
        let analytics = JobAnalytics::compute(&jobs, &[], &session.user_id);
        let mut state = JobState {
            catalog: jobs,
            matches: Vec::new(),
            collection: CachedCollection::default(),
            cursor: PaginationCursor::new(page_size),
            criteria: JobFilterCriteria::default(),
            applications: Vec::new(),
            analytics,
            is_loading: false,
            generation: 0,
        };
        state.run_search(JobFilterCriteria::default(), clock.now());
        let publisher = Publisher::new(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            publisher: Arc::new(publisher),
            clock,
            session,
            latency,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobStoreSnapshot> {
        self.publisher.subscribe()
    }

    pub fn snapshot(&self) -> JobStoreSnapshot {
        self.publisher.current()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn publish(&self, state: &JobState) {
        self.publisher.publish(state.snapshot());
    }

    /// Replaces the visible results with the first page for `criteria`. A
    /// search started while this one was waiting wins; this completion is
    /// then dropped.
    pub async fn search(&self, criteria: JobFilterCriteria) -> JobStoreSnapshot {
        let generation = {
            let mut state = lock(&self.state, "jobs");
            state.generation += 1;
            state.is_loading = true;
            self.publish(&state);
            state.generation
        };

        simulate_latency(self.latency).await;

        let mut state = lock(&self.state, "jobs");
        if state.generation != generation {
            debug!(generation, latest = state.generation, "discarding stale job search");
            return state.snapshot();
        }

        let active_filters = criteria.active_filter_count();
        state.run_search(criteria, self.clock.now());
        state.is_loading = false;
        info!(
            generation,
            active_filters,
            matches = state.matches.len(),
            "job search completed"
        );
        self.publish(&state);
        state.snapshot()
    }

    /// Appends the next page. Does nothing while a fetch is in flight or when
    /// the results are exhausted.
    pub async fn load_more(&self) -> JobStoreSnapshot {
        let generation = {
            let mut state = lock(&self.state, "jobs");
            if state.is_loading || !state.cursor.has_more() {
                return state.snapshot();
            }
            state.is_loading = true;
            self.publish(&state);
            state.generation
        };

        simulate_latency(self.latency).await;

        let mut state = lock(&self.state, "jobs");
        if state.generation != generation {
            return state.snapshot();
        }
        let page = state.next_page();
        debug!(page = state.cursor.current_page(), items = page.len(), "loaded more jobs");
        state.collection.append(page);
        state.is_loading = false;
        self.publish(&state);
        state.snapshot()
    }

    pub fn get_by_id(&self, id: &str) -> Option<JobPosting> {
        let state = lock(&self.state, "jobs");
        state.collection.get(id).cloned()
    }

    pub fn mutate(&self, id: &str, mutation: JobMutation) -> MutationOutcome {
        let mut state = lock(&self.state, "jobs");
        if !state.collection.contains(id) {
            debug!(job_id = id, "mutation on unknown job ignored");
            return MutationOutcome::Ignored;
        }

        let now = self.clock.now();
        let user_id = self.session.user_id.as_str();
        let existing = state.application_index(id, user_id);

        let Some(job) = state.find_mut(id) else {
            return MutationOutcome::Ignored;
        };
        let mut new_application = None;
        let mut withdraw = false;

        let changed = match mutation {
            JobMutation::Apply { cover_letter } => {
                if existing.is_some() {
                    false
                } else {
                    job.applicant_count += 1;
                    job.view_count = job.view_count.max(job.applicant_count);
                    new_application = Some(JobApplication {
                        id: Uuid::new_v4().to_string(),
                        job_id: job.id.clone(),
                        applicant_user_id: user_id.to_string(),
                        status: ApplicationStatus::Submitted,
                        cover_letter: cover_letter.filter(|c| !c.trim().is_empty()),
                        submitted_at: now,
                        updated_at: now,
                    });
                    true
                }
            }
            JobMutation::Save => job.saved_by_user_ids.insert(user_id.to_string()),
            JobMutation::Unsave => job.saved_by_user_ids.remove(user_id),
            JobMutation::View => {
                job.view_count += 1;
                true
            }
            JobMutation::Withdraw => {
                if existing.is_some() {
                    job.applicant_count = job.applicant_count.saturating_sub(1);
                    withdraw = true;
                    true
                } else {
                    false
                }
            }
        };

        if !changed {
            debug!(job_id = id, "job mutation was a no-op");
            return MutationOutcome::Ignored;
        }

        let updated = job.clone();
        state.collection.refresh(&updated);
        if let Some(application) = new_application {
            info!(job_id = id, application_id = %application.id, "application submitted");
            state.applications.push(application);
        }
        if withdraw {
            if let Some(index) = existing {
                let removed = state.applications.remove(index);
                info!(job_id = id, application_id = %removed.id, "application withdrawn");
            }
        }

        state.analytics = JobAnalytics::compute(&state.catalog, &state.applications, user_id);
        self.publish(&state);
        MutationOutcome::Applied
    }

    pub fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<JobApplication> {
        if status == ApplicationStatus::Withdrawn {
            return Err(Error::BadRequest(
                "Applications are withdrawn through the job's withdraw action".to_string(),
            ));
        }

        let mut state = lock(&self.state, "jobs");
        let now = self.clock.now();
        let application = state
            .applications
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| Error::NotFound(format!("Application {} not found", application_id)))?;

        if !application.status.can_transition_to(status) {
            return Err(Error::BadRequest(format!(
                "Cannot move application from {:?} to {:?}",
                application.status, status
            )));
        }
        application.status = status;
        application.updated_at = now;
        let updated = application.clone();
        info!(application_id, ?status, "application status updated");

        self.publish(&state);
        Ok(updated)
    }

    pub fn my_applications(&self) -> Vec<JobApplication> {
        let state = lock(&self.state, "jobs");
        state
            .applications
            .iter()
            .filter(|a| a.applicant_user_id == self.session.user_id)
            .cloned()
            .collect()
    }

    pub fn saved_jobs(&self) -> Vec<JobPosting> {
        let state = lock(&self.state, "jobs");
        state
            .catalog
            .iter()
            .filter(|j| j.is_saved_by(&self.session.user_id))
            .cloned()
            .collect()
    }

    pub fn analytics(&self) -> JobAnalytics {
        lock(&self.state, "jobs").analytics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{
        CompanySize, EmploymentType, ExperienceLevel, SalaryPeriod, SalaryRange,
    };
    use crate::services::generator::DemoDataGenerator;
    use crate::utils::time::MockClock;
    use chrono::{DateTime, TimeZone};
    use std::collections::BTreeSet;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock.expect_now().returning(fixed_now);
        Arc::new(clock)
    }

    fn session() -> Session {
        Session::new("me", "Me")
    }

    fn job(id: &str, applicants: u32) -> JobPosting {
        JobPosting {
            id: id.into(),
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            company_size: CompanySize::Medium,
            location: "Berlin".into(),
            work_type: WorkType::Hybrid,
            employment_type: EmploymentType::FullTime,
            experience_level: ExperienceLevel::MidSenior,
            description: String::new(),
            requirements: vec![],
            responsibilities: vec![],
            benefits: vec![],
            skills: vec!["Rust".into()],
            salary_range: SalaryRange {
                min: Decimal::from(90_000),
                max: Decimal::from(110_000),
                currency: "USD".into(),
                period: SalaryPeriod::Yearly,
            },
            posted_date: fixed_now(),
            applicant_count: applicants,
            view_count: applicants * 3,
            is_active: true,
            is_easy_apply: true,
            saved_by_user_ids: BTreeSet::new(),
        }
    }

    fn store(jobs: Vec<JobPosting>, page_size: usize) -> JobStore {
        JobStore::new(jobs, session(), page_size, clock(), Duration::ZERO)
    }

    fn generated(count: usize) -> Vec<JobPosting> {
        DemoDataGenerator::from_seed(Some(42), fixed_now()).generate_jobs(count)
    }

    #[test]
    fn apply_increments_count_and_records_application() {
        let store = store(vec![job("j1", 5), job("j2", 0)], 10);
        let before = store.snapshot().analytics.total_applications;

        let outcome = store.mutate("j1", JobMutation::Apply { cover_letter: None });

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(store.get_by_id("j1").unwrap().applicant_count, 6);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.analytics.total_applications, before + 1);
        assert_eq!(snapshot.analytics.my_application_count, 1);
        assert_eq!(store.my_applications().len(), 1);
    }

    #[test]
    fn apply_to_closed_posting_still_counts() {
        let mut closed = job("j1", 5);
        closed.is_active = false;
        let store = store(vec![closed], 10);
        let before = store.snapshot().analytics.total_applications;

        let outcome = store.mutate("j1", JobMutation::Apply { cover_letter: None });

        assert_eq!(outcome, MutationOutcome::Applied);
        assert_eq!(store.get_by_id("j1").unwrap().applicant_count, 6);
        assert_eq!(store.snapshot().analytics.total_applications, before + 1);
    }

    #[test]
    fn second_apply_is_ignored() {
        let store = store(vec![job("j1", 5)], 10);
        store.mutate("j1", JobMutation::Apply { cover_letter: None });
        let outcome = store.mutate(
            "j1",
            JobMutation::Apply {
                cover_letter: Some("again".into()),
            },
        );
        assert_eq!(outcome, MutationOutcome::Ignored);
        assert_eq!(store.get_by_id("j1").unwrap().applicant_count, 6);
    }

    #[test]
    fn withdraw_removes_application_and_decrements() {
        let store = store(vec![job("j1", 0)], 10);
        assert_eq!(store.mutate("j1", JobMutation::Withdraw), MutationOutcome::Ignored);

        store.mutate("j1", JobMutation::Apply { cover_letter: None });
        assert_eq!(store.mutate("j1", JobMutation::Withdraw), MutationOutcome::Applied);
        assert_eq!(store.get_by_id("j1").unwrap().applicant_count, 0);
        assert!(store.my_applications().is_empty());
    }

    #[test]
    fn unknown_id_leaves_results_unchanged() {
        let store = store(generated(30), 10);
        let before = store.snapshot();

        let outcome = store.mutate("does-not-exist", JobMutation::Save);

        let after = store.snapshot();
        assert_eq!(outcome, MutationOutcome::Ignored);
        assert_eq!(
            before.results.iter().map(|j| &j.id).collect::<Vec<_>>(),
            after.results.iter().map(|j| &j.id).collect::<Vec<_>>()
        );
        assert_eq!(before.analytics, after.analytics);
        assert!(store.get_by_id("does-not-exist").is_none());
    }

    #[test]
    fn save_and_unsave_track_the_session_user() {
        let store = store(vec![job("j1", 1)], 10);
        assert!(store.mutate("j1", JobMutation::Save).applied());
        assert_eq!(store.mutate("j1", JobMutation::Save), MutationOutcome::Ignored);
        assert_eq!(store.saved_jobs().len(), 1);
        assert_eq!(store.analytics().saved_count, 1);

        assert!(store.mutate("j1", JobMutation::Unsave).applied());
        assert!(store.saved_jobs().is_empty());
    }

    #[test]
    fn view_increments_view_count() {
        let store = store(vec![job("j1", 1)], 10);
        store.mutate("j1", JobMutation::View);
        assert_eq!(store.get_by_id("j1").unwrap().view_count, 4);
    }

    #[tokio::test]
    async fn remote_easy_apply_search_returns_matching_first_page() {
        let store = store(generated(100), 20);
        let criteria = JobFilterCriteria {
            work_types: [WorkType::Remote].into_iter().collect(),
            easy_apply_only: true,
            ..JobFilterCriteria::default()
        };

        let snapshot = store.search(criteria).await;

        assert!(snapshot.results.len() <= 20);
        assert!(!snapshot.is_loading);
        assert!(snapshot
            .results
            .iter()
            .all(|j| j.work_type == WorkType::Remote && j.is_easy_apply));
    }

    #[tokio::test]
    async fn load_more_appends_until_exhausted() {
        let store = store(generated(45), 20);
        let first = store.search(JobFilterCriteria::default()).await;
        assert_eq!(first.results.len(), 20);
        assert!(first.has_more);

        let second = store.load_more().await;
        assert_eq!(second.results.len(), 40);
        let ids = |results: &[JobPosting]| results.iter().map(|j| j.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&second.results[..20]), ids(&first.results));

        let third = store.load_more().await;
        assert_eq!(third.results.len(), 45);
        assert!(!third.has_more);

        let fourth = store.load_more().await;
        assert_eq!(fourth.results.len(), 45);
        assert_eq!(fourth.current_page, third.current_page);
    }

    #[tokio::test]
    async fn mutations_survive_a_new_search() {
        let store = store(vec![job("j1", 2), job("j2", 2)], 1);
        store.mutate("j1", JobMutation::Save);

        let snapshot = store.search(JobFilterCriteria::keyword("backend")).await;
        assert_eq!(snapshot.results[0].id, "j1");
        assert!(snapshot.results[0].is_saved_by("me"));
    }

    #[tokio::test]
    async fn cached_jobs_stay_reachable_after_the_page_changes() {
        let store = store(generated(10), 5);
        let first_id = store.snapshot().results[0].id.clone();

        store.search(JobFilterCriteria::keyword("no such job anywhere")).await;
        assert!(store.snapshot().results.is_empty());
        assert!(store.get_by_id(&first_id).is_some());
        assert!(store.mutate(&first_id, JobMutation::View).applied());
    }

    #[tokio::test]
    async fn stale_search_completion_is_discarded() {
        let store = JobStore::new(
            generated(30),
            session(),
            10,
            clock(),
            Duration::from_millis(50),
        );

        let slow = store.search(JobFilterCriteria::keyword("zzz-never-matches"));
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            store.search(JobFilterCriteria::default()).await
        };
        let (_, latest) = tokio::join!(slow, fast);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.criteria, JobFilterCriteria::default());
        assert_eq!(snapshot.total_matches, 30);
        assert_eq!(latest.total_matches, 30);
        assert!(!snapshot.is_loading);
    }

    #[test]
    fn application_status_follows_the_pipeline() {
        let store = store(vec![job("j1", 0)], 10);
        store.mutate("j1", JobMutation::Apply { cover_letter: None });
        let id = store.my_applications()[0].id.clone();

        let updated = store
            .update_application_status(&id, ApplicationStatus::Reviewing)
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Reviewing);

        let err = store
            .update_application_status(&id, ApplicationStatus::Offered)
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let err = store
            .update_application_status("missing", ApplicationStatus::Reviewing)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn subscribers_receive_mutations() {
        let store = store(vec![job("j1", 0)], 10);
        let mut rx = store.subscribe();
        store.mutate("j1", JobMutation::Save);
        tokio_test::block_on(rx.changed()).unwrap();
        assert_eq!(rx.borrow().analytics.saved_count, 1);
    }

    #[test]
    fn analytics_rank_companies_and_skills() {
        let mut jobs = vec![job("a", 1), job("b", 3), job("c", 2)];
        jobs[2].company = "Beta".into();
        jobs[2].skills = vec!["Go".into(), "Rust".into()];
        jobs[2].work_type = WorkType::Remote;

        let analytics = JobAnalytics::compute(&jobs, &[], "me");
        assert_eq!(analytics.total_applications, 6);
        assert_eq!(analytics.average_applicants, 2.0);
        assert_eq!(analytics.average_salary, Decimal::from(100_000));
        assert_eq!(analytics.top_companies[0].name, "Acme");
        assert_eq!(analytics.top_companies[0].count, 2);
        assert_eq!(analytics.top_skills[0].name, "Rust");
        assert_eq!(analytics.jobs_by_work_type.get(&WorkType::Remote), Some(&1));
    }
}
