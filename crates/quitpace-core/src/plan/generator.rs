use chrono::{DateTime, Duration, Utc};

use super::{PlanSpeed, QuitPlan, WeekAllowance};
use crate::error::ValidationError;

/// Usable minutes per week: 16 waking hours a day, 7 days.
pub const WAKING_MINUTES_PER_WEEK: u32 = 16 * 60 * 7;

/// Upper bound on emitted (non-terminal) weeks.
pub const MAX_PLANNED_WEEKS: u32 = 100;

/// The decaying weekly total must stay above this to emit another week.
pub const STOP_THRESHOLD: f64 = 0.5;

/// Minutes to wait between uses so that `weekly_allowance` uses are spread
/// evenly over the waking week. An allowance of 0 yields the 0 sentinel;
/// any positive allowance waits at least one minute so it never collides
/// with the sentinel.
pub fn wait_time_minutes(weekly_allowance: u32) -> u32 {
    if weekly_allowance == 0 {
        0
    } else {
        (WAKING_MINUTES_PER_WEEK / weekly_allowance).max(1)
    }
}

fn week_record(
    start_date: DateTime<Utc>,
    week_number: u32,
    total_allowed: u32,
    cigarettes_allowed: u32,
    vapes_allowed: u32,
) -> WeekAllowance {
    WeekAllowance {
        week_number,
        week_start: start_date + Duration::weeks(i64::from(week_number)),
        total_allowed,
        cigarettes_allowed,
        vapes_allowed,
        wait_time_cigs: wait_time_minutes(cigarettes_allowed),
        wait_time_vapes: wait_time_minutes(vapes_allowed),
    }
}

fn round_units(value: f64) -> u32 {
    // `as` saturates, so absurd inputs clamp to u32::MAX instead of wrapping.
    value.round().max(0.0) as u32
}

/// Build a tapering schedule from a weekly baseline.
///
/// The weekly total decays by the speed's reduction rate every week and is
/// split between cigarettes and vapes by the baseline proportions, each side
/// rounded on its own. Generation stops once the total falls to
/// [`STOP_THRESHOLD`] or [`MAX_PLANNED_WEEKS`] weeks have been emitted, and a
/// final all-zero week is appended in the next slot.
///
/// Rounding can repeat the previous week's whole-unit total late in the
/// taper; in that case the week's total is lowered to one below the previous
/// week and the per-kind split is taken from the lowered total, so the
/// schedule always steps down.
///
/// # Errors
/// Returns [`ValidationError::InvalidValue`] when both baselines are zero.
pub fn generate_quit_plan(
    cigarettes_per_week: u32,
    vapes_per_week: u32,
    plan_speed: PlanSpeed,
    start_date: DateTime<Utc>,
) -> Result<QuitPlan, ValidationError> {
    let total_per_week = u64::from(cigarettes_per_week) + u64::from(vapes_per_week);
    if total_per_week == 0 {
        return Err(ValidationError::InvalidValue {
            field: "cigarettes_per_week + vapes_per_week".into(),
            message: "at least one weekly baseline must be positive".into(),
        });
    }

    let cig_percentage = f64::from(cigarettes_per_week) / total_per_week as f64;
    let vape_percentage = f64::from(vapes_per_week) / total_per_week as f64;
    let reduction_rate = plan_speed.reduction_rate();

    let mut weeks = Vec::new();
    let mut current_total = total_per_week as f64;
    let mut previous_allowed: Option<u32> = None;
    let mut week_number = 0u32;

    while current_total > STOP_THRESHOLD && week_number < MAX_PLANNED_WEEKS {
        let rounded = round_units(current_total);
        let (total_allowed, split_basis) = match previous_allowed {
            Some(prev) if rounded >= prev => {
                let lowered = prev.saturating_sub(1);
                (lowered, f64::from(lowered))
            }
            _ => (rounded, current_total),
        };
        if total_allowed == 0 {
            break;
        }

        weeks.push(week_record(
            start_date,
            week_number,
            total_allowed,
            round_units(split_basis * cig_percentage),
            round_units(split_basis * vape_percentage),
        ));

        previous_allowed = Some(total_allowed);
        current_total *= 1.0 - reduction_rate;
        week_number += 1;
    }

    let terminal = week_record(start_date, week_number, 0, 0, 0);
    let estimated_quit_date = terminal.week_start;
    weeks.push(terminal);

    tracing::debug!(
        speed = %plan_speed,
        baseline = total_per_week,
        weeks = weeks.len(),
        "generated quit plan"
    );

    Ok(QuitPlan {
        start_date,
        plan_speed,
        original_cigarettes_per_week: cigarettes_per_week,
        original_vapes_per_week: vapes_per_week,
        cig_percentage,
        vape_percentage,
        reduction_rate,
        total_weeks: week_number + 1,
        weeks,
        estimated_quit_date,
    })
}
