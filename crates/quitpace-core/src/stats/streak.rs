//! Calendar-day streaks.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::usage::LogEntry;

/// Longest streak the backward walk will count.
pub const MAX_STREAK_DAYS: u32 = 365;

fn local_days<Tz: TimeZone>(logs: &[LogEntry], tz: &Tz) -> HashSet<NaiveDate> {
    logs.iter()
        .map(|l| l.timestamp.with_timezone(tz).date_naive())
        .collect()
}

/// Consecutive local days, ending today, with at least one logged use.
///
/// A day without logs today means a streak of 0, even if yesterday had logs.
pub fn current_streak<Tz: TimeZone>(logs: &[LogEntry], now: &DateTime<Tz>) -> u32 {
    let days = local_days(logs, &now.timezone());
    let mut day = now.date_naive();
    let mut streak = 0;

    while streak < MAX_STREAK_DAYS && days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Uses logged on the local calendar day containing `now`.
pub fn today_count<Tz: TimeZone>(logs: &[LogEntry], now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let today = now.date_naive();
    logs.iter()
        .filter(|l| l.timestamp.with_timezone(&tz).date_naive() == today)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::UsageKind;
    use chrono::{Duration, FixedOffset, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_log_has_no_streak() {
        assert_eq!(current_streak(&[], &at(2024, 6, 10, 12)), 0);
    }

    #[test]
    fn counts_back_until_gap() {
        let logs = vec![
            LogEntry::new(UsageKind::Cigarette, at(2024, 6, 10, 9)),
            LogEntry::new(UsageKind::Vape, at(2024, 6, 9, 22)),
            LogEntry::new(UsageKind::Cigarette, at(2024, 6, 8, 7)),
            // 7th missing
            LogEntry::new(UsageKind::Cigarette, at(2024, 6, 6, 7)),
        ];
        assert_eq!(current_streak(&logs, &at(2024, 6, 10, 18)), 3);
    }

    #[test]
    fn streak_needs_a_log_today() {
        let logs = vec![LogEntry::new(UsageKind::Cigarette, at(2024, 6, 9, 9))];
        assert_eq!(current_streak(&logs, &at(2024, 6, 10, 18)), 0);
    }

    #[test]
    fn streak_uses_local_calendar_days() {
        // 23:30 UTC on the 9th is already the 10th at UTC+2.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let logs = vec![
            LogEntry::new(UsageKind::Vape, Utc.with_ymd_and_hms(2024, 6, 9, 23, 30, 0).unwrap()),
            LogEntry::new(UsageKind::Vape, at(2024, 6, 9, 8)),
        ];
        let now = at(2024, 6, 10, 12).with_timezone(&tz);
        assert_eq!(current_streak(&logs, &now), 2);
        assert_eq!(today_count(&logs, &now), 1);
    }

    #[test]
    fn streak_is_capped() {
        let now = at(2024, 6, 10, 12);
        let logs: Vec<_> = (0..400)
            .map(|d| LogEntry::new(UsageKind::Cigarette, now - Duration::days(d)))
            .collect();
        assert_eq!(current_streak(&logs, &now), MAX_STREAK_DAYS);
    }
}
