//! Statistics & streak engine.
//!
//! [`Stats`] is recomputed on demand from the full log and the plan; it is
//! never persisted.

mod perfect_days;
mod pricing;
mod streak;

pub use perfect_days::{daily_allowance, perfect_days};
pub use pricing::{
    round_cents, Pricing, CIGARETTES_PER_PACK, DEFAULT_PACK_PRICE, DEFAULT_VAPE_PRICE,
};
pub use streak::{current_streak, today_count, MAX_STREAK_DAYS};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::QuitPlan;
use crate::usage::{count_of_kind, LogEntry, UsageKind};

/// Snapshot of progress metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub days_active: u32,
    pub total_logged: u32,
    pub cigarettes_logged: u32,
    pub vapes_logged: u32,
    /// 0..=100
    pub reduction_percentage: u32,
    pub money_saved: f64,
    pub current_streak: u32,
    pub perfect_days: u32,
    pub weeks_since_start: u32,
}

/// Whole days elapsed since the plan epoch, never negative.
pub fn days_active(plan: &QuitPlan, now: DateTime<Utc>) -> u32 {
    let elapsed_ms = (now - plan.start_date).num_milliseconds().max(0);
    u32::try_from(elapsed_ms / Duration::days(1).num_milliseconds()).unwrap_or(u32::MAX)
}

/// Compute statistics for `logs` against `plan` at `now`.
///
/// Calendar-day metrics (the streak) use the time zone carried by `now`.
/// Without a plan every metric is zero.
pub fn compute_stats<Tz: TimeZone>(
    logs: &[LogEntry],
    plan: Option<&QuitPlan>,
    pricing: &Pricing,
    now: &DateTime<Tz>,
) -> Stats {
    let Some(plan) = plan else {
        return Stats::default();
    };
    let now_utc = now.with_timezone(&Utc);

    let days_active = days_active(plan, now_utc);
    let cigarettes_logged = count_of_kind(logs, UsageKind::Cigarette);
    let vapes_logged = count_of_kind(logs, UsageKind::Vape);
    let total_logged = logs.len();

    // Consumption rates are averaged over at least one week.
    let rate_weeks = (f64::from(days_active) / 7.0).max(1.0);
    let current_total = (cigarettes_logged + vapes_logged) as f64 / rate_weeks;
    let original_total = f64::from(plan.original_total_per_week());

    let nothing_observed = logs.is_empty() && days_active == 0;
    let reduction_percentage = if original_total <= 0.0 || nothing_observed {
        0
    } else {
        (((original_total - current_total) / original_total) * 100.0)
            .round()
            .clamp(0.0, 100.0) as u32
    };

    let elapsed_weeks = f64::from(days_active) / 7.0;
    let money_saved = round_cents(
        UsageKind::ALL
            .iter()
            .map(|&kind| {
                let expected = f64::from(plan.original_per_week(kind)) * elapsed_weeks;
                let avoided = (expected - count_of_kind(logs, kind) as f64).max(0.0);
                avoided * pricing.unit_price(kind)
            })
            .sum(),
    );

    Stats {
        days_active,
        total_logged: total_logged as u32,
        cigarettes_logged: cigarettes_logged as u32,
        vapes_logged: vapes_logged as u32,
        reduction_percentage,
        money_saved,
        current_streak: current_streak(logs, now),
        perfect_days: perfect_days(logs, plan, now_utc),
        weeks_since_start: rate_weeks.floor() as u32,
    }
}
