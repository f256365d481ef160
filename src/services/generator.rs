//! Synthetic demo data.
//!
//! Template fields are picked by `index % pool.len()`, so asking for more
//! entities than a pool holds simply cycles it. Counts, salaries and date
//! offsets come from the injected RNG; seed it for reproducible output.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::models::connection::{Connection, ConnectionRequest, RequestStatus};
use crate::models::job::{
    CompanySize, EmploymentType, ExperienceLevel, JobPosting, SalaryPeriod, SalaryRange, WorkType,
};
use crate::models::message::{ChatMessage, Conversation};
use crate::models::notification::{Notification, NotificationKind};
use crate::models::post::{Comment, Post};
use crate::models::user::User;

const TITLES: &[&str] = &[
    "Software Engineer",
    "Senior Software Engineer",
    "Product Manager",
    "Data Scientist",
    "UX Designer",
    "DevOps Engineer",
    "Frontend Developer",
    "Backend Engineer",
    "Engineering Manager",
    "Machine Learning Engineer",
    "Marketing Manager",
    "Sales Representative",
    "Business Analyst",
    "iOS Developer",
    "Android Developer",
    "Technical Writer",
    "Security Engineer",
    "Site Reliability Engineer",
    "Product Designer",
    "Customer Success Manager",
];

const COMPANIES: &[(&str, CompanySize)] = &[
    ("Apple", CompanySize::Enterprise),
    ("Google", CompanySize::Enterprise),
    ("Microsoft", CompanySize::Enterprise),
    ("Stripe", CompanySize::Large),
    ("Airbnb", CompanySize::Large),
    ("Shopify", CompanySize::Large),
    ("Figma", CompanySize::Medium),
    ("Notion", CompanySize::Medium),
    ("Linear", CompanySize::Small),
    ("Vercel", CompanySize::Medium),
    ("Datadog", CompanySize::Large),
    ("Ramp", CompanySize::Medium),
    ("Retool", CompanySize::Small),
    ("Tidewave Labs", CompanySize::Startup),
    ("Northwind Analytics", CompanySize::Startup),
];

const LOCATIONS: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "Chicago, IL",
    "Denver, CO",
    "Los Angeles, CA",
    "Toronto, ON",
    "London, UK",
    "Berlin, Germany",
];

const SKILLS: &[&str] = &[
    "Rust",
    "Swift",
    "Kotlin",
    "TypeScript",
    "React",
    "Python",
    "Go",
    "Java",
    "SQL",
    "PostgreSQL",
    "Kubernetes",
    "Docker",
    "AWS",
    "GCP",
    "Terraform",
    "GraphQL",
    "Machine Learning",
    "Figma",
    "Product Strategy",
    "A/B Testing",
    "Data Analysis",
    "Leadership",
    "Agile",
    "CI/CD",
    "Security",
    "Communication",
    "Public Speaking",
];

const RESPONSIBILITIES: &[&str] = &[
    "Design, build and maintain scalable systems",
    "Collaborate with cross-functional partners",
    "Mentor teammates and review their work",
    "Own features from concept to launch",
    "Drive technical and product decisions",
    "Improve quality through testing and monitoring",
    "Write clear documentation",
    "Participate in the on-call rotation",
];

const BENEFITS: &[&str] = &[
    "Health, dental and vision insurance",
    "401(k) matching",
    "Flexible working hours",
    "Unlimited PTO",
    "Learning and development budget",
    "Home office stipend",
    "Parental leave",
    "Equity package",
];

const FIRST_NAMES: &[&str] = &[
    "Sarah", "Michael", "Priya", "James", "Aisha", "Daniel", "Mei", "Carlos", "Olivia", "Tomás",
    "Fatima", "Ethan", "Yuki", "Noah", "Amara", "Lucas",
];

const LAST_NAMES: &[&str] = &[
    "Chen", "Johnson", "Patel", "Williams", "Okafor", "Garcia", "Kim", "Rossi", "Nguyen",
    "Müller", "Hassan", "Brown", "Tanaka", "Silva",
];

const POST_TEMPLATES: &[&str] = &[
    "Excited to share that I've started a new position! Grateful to everyone who helped along the way. #NewJob #CareerGrowth",
    "Five lessons from shipping our biggest release this year. Thread below, thanks to @sarah_chen for the push. #Engineering #Leadership",
    "We're hiring! Looking for curious engineers who love hard problems. DM me or apply directly. #Hiring #Rust #RemoteWork",
    "Just wrapped up a fantastic panel on inclusive product design. Thank you @priya_patel and the whole team. #Design #Accessibility",
    "Hot take: the best code review comment is a question, not a command. #CodeReview #SoftwareEngineering",
    "Proud of our team for hitting 99.99% uptime this quarter. #SRE #DevOps",
    "Reflecting on ten years in tech: keep learning, stay kind, ask for help. #CareerAdvice",
    "Our new open source library is live! Feedback welcome. #OpenSource #TypeScript",
    "Great conversation with @james_williams about data-driven roadmaps. #ProductManagement #Data",
    "Mentorship changed my career. If you're early on, find people who will tell you the truth. #Mentorship",
    "Attending the AI summit next week, who else is going? #MachineLearning #AI",
    "Small habits compound. Ship something every week. #Productivity",
];

const COMMENT_TEMPLATES: &[&str] = &[
    "Congratulations! Well deserved.",
    "Great insights, thanks for sharing.",
    "This resonates with me a lot.",
    "Couldn't agree more!",
    "Would love to hear more about this.",
    "Saving this for later.",
    "So inspiring, keep it up!",
    "Interesting perspective, thanks.",
];

const MESSAGE_TEMPLATES: &[&str] = &[
    "Hi! Thanks for connecting.",
    "Are you open to a quick chat this week?",
    "I saw your post about the new role, congrats!",
    "Sure, Thursday afternoon works for me.",
    "Could you share more details about the team?",
    "Happy to refer you if you're interested.",
    "Thanks, talk soon!",
];

pub struct DemoDataGenerator<R: Rng = StdRng> {
    rng: R,
    now: DateTime<Utc>,
}

impl DemoDataGenerator<StdRng> {
    /// Seeded when `seed` is set, otherwise drawn from OS entropy.
    pub fn from_seed(seed: Option<u64>, now: DateTime<Utc>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, now)
    }
}

impl<R: Rng> DemoDataGenerator<R> {
    pub fn new(rng: R, now: DateTime<Utc>) -> Self {
        Self { rng, now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn next_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.gen())
            .into_uuid()
            .to_string()
    }

    fn minutes_ago(&mut self, max_minutes: i64) -> DateTime<Utc> {
        let minutes = self.rng.gen_range(1..=max_minutes.max(1));
        self.now - Duration::minutes(minutes)
    }

    // --- Jobs ---

    pub fn generate_jobs(&mut self, count: usize) -> Vec<JobPosting> {
        let mut jobs: Vec<JobPosting> = (0..count).map(|i| self.job(i)).collect();
        jobs.sort_by_key(|j| std::cmp::Reverse(j.posted_date));
        jobs
    }

    fn job(&mut self, index: usize) -> JobPosting {
        let title = TITLES[index % TITLES.len()];
        let (company, company_size) = COMPANIES[index % COMPANIES.len()];
        let work_type = WorkType::ALL[index % WorkType::ALL.len()];
        let employment_type = EmploymentType::ALL[(index / 2) % EmploymentType::ALL.len()];
        let experience_level = ExperienceLevel::ALL[index % ExperienceLevel::ALL.len()];
        let location = if work_type == WorkType::Remote {
            format!("Remote ({})", LOCATIONS[index % LOCATIONS.len()])
        } else {
            LOCATIONS[index % LOCATIONS.len()].to_string()
        };

        let skills = cycle(SKILLS, index * 3, 4);
        let applicant_count = self.rng.gen_range(0..=250);
        let view_count = applicant_count + self.rng.gen_range(10..=2_000);

        JobPosting {
            id: self.next_id(),
            title: title.to_string(),
            company: company.to_string(),
            company_size,
            location,
            work_type,
            employment_type,
            experience_level,
            description: format!(
                "{company} is looking for a {title} to join a team building products used by millions. \
                 You will work closely with engineering, design and product to deliver great experiences."
            ),
            requirements: requirements_for(experience_level, &skills),
            responsibilities: cycle(RESPONSIBILITIES, index, 4),
            benefits: cycle(BENEFITS, index * 2, 3),
            salary_range: self.salary(experience_level, employment_type),
            skills,
            posted_date: self.minutes_ago(30 * 24 * 60),
            applicant_count,
            view_count,
            is_active: self.rng.gen_bool(0.9),
            is_easy_apply: self.rng.gen_bool(0.5),
            saved_by_user_ids: BTreeSet::new(),
        }
    }

    fn salary(&mut self, level: ExperienceLevel, employment: EmploymentType) -> SalaryRange {
        let base: i64 = match level {
            ExperienceLevel::Internship => 45_000,
            ExperienceLevel::Entry => 70_000,
            ExperienceLevel::Associate => 90_000,
            ExperienceLevel::MidSenior => 125_000,
            ExperienceLevel::Director => 175_000,
            ExperienceLevel::Executive => 240_000,
        };
        let min = base + self.rng.gen_range(-10..=15) * 1_000;
        let max = min + self.rng.gen_range(20..=60) * 1_000;

        match employment {
            EmploymentType::Contract | EmploymentType::Freelance => SalaryRange {
                min: Decimal::from(min / 2_000),
                max: Decimal::from(max / 2_000),
                currency: "USD".to_string(),
                period: SalaryPeriod::Hourly,
            },
            _ => SalaryRange {
                min: Decimal::from(min),
                max: Decimal::from(max),
                currency: "USD".to_string(),
                period: SalaryPeriod::Yearly,
            },
        }
    }

    // --- People ---

    pub fn generate_users(&mut self, count: usize) -> Vec<User> {
        (0..count).map(|i| self.user(i)).collect()
    }

    fn user(&mut self, index: usize) -> User {
        let first = FIRST_NAMES[index % FIRST_NAMES.len()];
        let last = LAST_NAMES[(index * 5 + index / FIRST_NAMES.len()) % LAST_NAMES.len()];
        let title = TITLES[(index * 3) % TITLES.len()];
        let (company, _) = COMPANIES[(index * 7) % COMPANIES.len()];

        User {
            id: self.next_id(),
            name: format!("{first} {last}"),
            headline: format!("{title} at {company}"),
            company: company.to_string(),
            location: LOCATIONS[(index * 2) % LOCATIONS.len()].to_string(),
            skills: cycle(SKILLS, index * 4, 5),
            connection_count: self.rng.gen_range(50..=1_500),
            profile_views: self.rng.gen_range(0..=400),
        }
    }

    /// Accepted connections with every user in `users`.
    pub fn generate_connections(&mut self, users: &[User]) -> Vec<Connection> {
        let mut connections: Vec<Connection> = users
            .iter()
            .map(|user| Connection {
                user: user.clone(),
                connected_at: self.minutes_ago(365 * 24 * 60),
                mutual_connections: self.rng.gen_range(0..=user.connection_count.min(120)),
            })
            .collect();
        connections.sort_by_key(|c| std::cmp::Reverse(c.connected_at));
        connections
    }

    /// Pending requests sent by each of `senders` to `to_user_id`.
    pub fn generate_connection_requests(
        &mut self,
        senders: &[User],
        to_user_id: &str,
    ) -> Vec<ConnectionRequest> {
        senders
            .iter()
            .map(|from| ConnectionRequest {
                id: self.next_id(),
                from_user_id: from.id.clone(),
                to_user_id: to_user_id.to_string(),
                message: Some(format!("Hi, I'd like to join your network. - {}", from.name)),
                status: RequestStatus::Pending,
                sent_at: self.minutes_ago(14 * 24 * 60),
            })
            .collect()
    }

    // --- Feed ---

    pub fn generate_posts(&mut self, count: usize, authors: &[User]) -> Vec<Post> {
        if authors.is_empty() {
            return Vec::new();
        }
        let mut posts: Vec<Post> = (0..count).map(|i| self.post(i, authors)).collect();
        posts.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        posts
    }

    fn post(&mut self, index: usize, authors: &[User]) -> Post {
        let author = &authors[index % authors.len()];
        let created_at = self.minutes_ago(14 * 24 * 60);

        let like_count = self.rng.gen_range(0..=authors.len().min(25));
        let liked_by_user_ids = authors
            .choose_multiple(&mut self.rng, like_count)
            .map(|u| u.id.clone())
            .collect();

        let comment_count = self.rng.gen_range(0..=4);
        let comments = (0..comment_count)
            .map(|c| self.comment(index + c, authors, created_at, true))
            .collect();

        let media_urls = if index % 4 == 0 {
            vec![format!("https://picsum.photos/seed/post{index}/800/600")]
        } else {
            Vec::new()
        };

        let mut post = Post {
            id: self.next_id(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            author_headline: author.headline.clone(),
            content: String::new(),
            media_urls,
            liked_by_user_ids,
            comments,
            share_count: self.rng.gen_range(0..=30),
            hashtags: Vec::new(),
            mentions: Vec::new(),
            created_at,
            updated_at: created_at,
            is_edited: false,
        };
        post.set_content(POST_TEMPLATES[index % POST_TEMPLATES.len()]);
        post
    }

    fn comment(
        &mut self,
        index: usize,
        authors: &[User],
        after: DateTime<Utc>,
        allow_replies: bool,
    ) -> Comment {
        let author = &authors[(index * 3 + 1) % authors.len()];
        let elapsed = (self.now - after).num_minutes().max(1);
        let offset = self.rng.gen_range(0..elapsed);
        let created_at = after + Duration::minutes(offset);
        let replies = if allow_replies && self.rng.gen_bool(0.3) {
            vec![self.comment(index + 1, authors, created_at, false)]
        } else {
            Vec::new()
        };

        Comment {
            id: self.next_id(),
            author_id: author.id.clone(),
            author_name: author.name.clone(),
            text: COMMENT_TEMPLATES[index % COMMENT_TEMPLATES.len()].to_string(),
            created_at,
            liked_by_user_ids: BTreeSet::new(),
            replies,
        }
    }

    // --- Notifications ---

    pub fn generate_notifications(&mut self, count: usize, actors: &[User]) -> Vec<Notification> {
        let mut notifications: Vec<Notification> =
            (0..count).map(|i| self.notification(i, actors)).collect();
        notifications.sort_by_key(|n| std::cmp::Reverse(n.created_at));
        notifications
    }

    fn notification(&mut self, index: usize, actors: &[User]) -> Notification {
        let kind = NotificationKind::ALL[index % NotificationKind::ALL.len()];
        let actor = actors
            .get(index % actors.len().max(1))
            .map(|u| u.name.as_str())
            .unwrap_or("Someone");
        let title = TITLES[index % TITLES.len()];
        let (company, _) = COMPANIES[index % COMPANIES.len()];

        let (heading, body) = match kind {
            NotificationKind::Like => ("New reaction", format!("{actor} liked your post")),
            NotificationKind::Comment => ("New comment", format!("{actor} commented on your post")),
            NotificationKind::ConnectionRequest => {
                ("Invitation", format!("{actor} wants to connect with you"))
            }
            NotificationKind::ConnectionAccepted => {
                ("New connection", format!("{actor} accepted your invitation"))
            }
            NotificationKind::JobAlert => (
                "Job alert",
                format!("New {title} role at {company} matches your preferences"),
            ),
            NotificationKind::Mention => ("Mention", format!("{actor} mentioned you in a post")),
            NotificationKind::ProfileView => {
                ("Profile views", format!("{actor} viewed your profile"))
            }
            NotificationKind::ApplicationUpdate => (
                "Application update",
                format!("Your application for {title} at {company} was viewed"),
            ),
        };

        Notification {
            id: self.next_id(),
            kind,
            title: heading.to_string(),
            body,
            related_id: None,
            created_at: self.minutes_ago(7 * 24 * 60),
            is_read: self.rng.gen_bool(0.4),
        }
    }

    // --- Messaging ---

    pub fn generate_conversations(
        &mut self,
        count: usize,
        partners: &[User],
        me: &str,
    ) -> Vec<Conversation> {
        let count = count.min(partners.len());
        let mut conversations: Vec<Conversation> = partners[..count]
            .iter()
            .enumerate()
            .map(|(i, partner)| self.conversation(i, partner, me))
            .collect();
        conversations.sort_by_key(|c| std::cmp::Reverse(c.last_activity));
        conversations
    }

    fn conversation(&mut self, index: usize, partner: &User, me: &str) -> Conversation {
        let message_count = self.rng.gen_range(2..=6);
        let mut sent_at = self.minutes_ago(10 * 24 * 60);
        let mut messages = Vec::with_capacity(message_count);
        for m in 0..message_count {
            let sender_id = if m % 2 == 0 { partner.id.clone() } else { me.to_string() };
            messages.push(ChatMessage {
                id: self.next_id(),
                sender_id,
                body: MESSAGE_TEMPLATES[(index + m) % MESSAGE_TEMPLATES.len()].to_string(),
                sent_at,
                is_read: true,
            });
            let remaining = (self.now - sent_at).num_minutes().max(2);
            let gap = self.rng.gen_range(1..remaining.min(600));
            sent_at += Duration::minutes(gap);
        }

        if let Some(last) = messages.last_mut() {
            if last.sender_id != me {
                last.is_read = self.rng.gen_bool(0.5);
            }
        }

        let last_activity = messages.last().map(|m| m.sent_at).unwrap_or(self.now);
        Conversation {
            id: self.next_id(),
            participant_ids: vec![me.to_string(), partner.id.clone()],
            participant_names: vec!["You".to_string(), partner.name.clone()],
            messages,
            last_activity,
        }
    }
}

/// `take` consecutive entries of `pool` starting at `start`, wrapping around.
fn cycle(pool: &[&str], start: usize, take: usize) -> Vec<String> {
    (0..take.min(pool.len()))
        .map(|k| pool[(start + k) % pool.len()].to_string())
        .collect()
}

fn requirements_for(level: ExperienceLevel, skills: &[String]) -> Vec<String> {
    let years = match level {
        ExperienceLevel::Internship => "Currently pursuing a degree in a related field".to_string(),
        ExperienceLevel::Entry => "0-2 years of professional experience".to_string(),
        ExperienceLevel::Associate => "2-4 years of professional experience".to_string(),
        ExperienceLevel::MidSenior => "5+ years of professional experience".to_string(),
        ExperienceLevel::Director => "8+ years of experience, 3+ leading teams".to_string(),
        ExperienceLevel::Executive => "12+ years of experience in senior leadership".to_string(),
    };
    let mut requirements = vec![years];
    requirements.extend(skills.iter().take(2).map(|s| format!("Strong experience with {s}")));
    requirements.push("Excellent written and verbal communication".to_string());
    requirements
}
