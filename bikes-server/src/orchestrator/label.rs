//! "Last updated" display text.
//!
//! Computed from the fetch time on every render rather than kept in state,
//! so nothing has to tick in the background.

use chrono::{DateTime, Utc};

/// Describe how long ago `fetched_at` was, relative to `now`.
///
/// Clock skew (a fetch time in the future) reads as "just now".
pub fn last_updated_label(fetched_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = now.signed_duration_since(fetched_at).num_seconds();

    match secs {
        s if s < 5 => "Updated just now".to_string(),
        s if s < 60 => format!("Updated {s}s ago"),
        s if s < 60 * 60 => format!("Updated {}m ago", s / 60),
        s if s < 24 * 60 * 60 => format!("Updated {}h ago", s / (60 * 60)),
        s => format!("Updated {}d ago", s / (24 * 60 * 60)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs_after: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let fetched = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        (fetched, fetched + Duration::seconds(secs_after))
    }

    #[test]
    fn labels_by_magnitude() {
        let cases = [
            (0, "Updated just now"),
            (4, "Updated just now"),
            (5, "Updated 5s ago"),
            (59, "Updated 59s ago"),
            (60, "Updated 1m ago"),
            (3599, "Updated 59m ago"),
            (3600, "Updated 1h ago"),
            (86_399, "Updated 23h ago"),
            (86_400, "Updated 1d ago"),
            (3 * 86_400 + 5, "Updated 3d ago"),
        ];

        for (secs, expected) in cases {
            let (fetched, now) = at(secs);
            assert_eq!(last_updated_label(fetched, now), expected, "at {secs}s");
        }
    }

    #[test]
    fn future_fetch_time_is_just_now() {
        let (fetched, now) = at(-30);
        assert_eq!(last_updated_label(fetched, now), "Updated just now");
    }
}
