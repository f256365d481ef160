use chrono::{DateTime, Utc};

/// Source of "now" for anything that compares against relative dates.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Short relative label ("3h", "2d", "1w") as shown next to feed items.
pub fn relative_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_minutes() < 1 {
        "now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_weeks() < 1 {
        format!("{}d", elapsed.num_days())
    } else {
        format!("{}w", elapsed.num_weeks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn relative_labels() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_label(now, now), "now");
        assert_eq!(relative_label(now - Duration::minutes(5), now), "5m");
        assert_eq!(relative_label(now - Duration::hours(3), now), "3h");
        assert_eq!(relative_label(now - Duration::days(2), now), "2d");
        assert_eq!(relative_label(now - Duration::days(15), now), "2w");
    }
}
