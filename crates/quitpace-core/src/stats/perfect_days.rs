//! Days kept within the prorated allowance.
//!
//! Days here are 24h windows aligned to the plan epoch, so day `i` always
//! belongs to week `i / 7` of the schedule.

use chrono::{DateTime, Duration, Utc};

use crate::plan::{QuitPlan, WeekAllowance};
use crate::usage::{LogEntry, UsageKind};

/// Whole uses of `kind` allowed on one day of `week`.
pub fn daily_allowance(week: &WeekAllowance, kind: UsageKind) -> u32 {
    week.allowed(kind).div_ceil(7)
}

/// Count completed plan days on which no kind exceeded its daily allowance.
///
/// Only days that have fully elapsed by `now` are considered.
pub fn perfect_days(logs: &[LogEntry], plan: &QuitPlan, now: DateTime<Utc>) -> u32 {
    let day_ms = Duration::days(1).num_milliseconds();
    let elapsed_ms = (now - plan.start_date).num_milliseconds();
    if elapsed_ms < day_ms {
        return 0;
    }
    let completed_days = (elapsed_ms / day_ms) as usize;

    let mut counts = vec![[0u32; 2]; completed_days];
    for log in logs {
        let offset_ms = (log.timestamp - plan.start_date).num_milliseconds();
        if offset_ms < 0 {
            continue;
        }
        let day = (offset_ms / day_ms) as usize;
        if let Some(slot) = counts.get_mut(day) {
            slot[kind_index(log.kind)] += 1;
        }
    }

    counts
        .iter()
        .enumerate()
        .filter(|(day, used)| {
            let week_number = (*day / 7) as u32;
            let Some(week) = plan.week(week_number).or_else(|| plan.final_week()) else {
                return false;
            };
            UsageKind::ALL
                .iter()
                .all(|&kind| used[kind_index(kind)] <= daily_allowance(week, kind))
        })
        .count() as u32
}

fn kind_index(kind: UsageKind) -> usize {
    match kind {
        UsageKind::Cigarette => 0,
        UsageKind::Vape => 1,
    }
}
