//! Eligibility engine: may a use be logged right now, and if not, when?
//!
//! Every answer is derived from a single [`check`] call against one sampled
//! `now`, so "can log" and "time until next" can never disagree.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::{QuitPlan, WeekAllowance};
use crate::usage::{LogEntry, UsageKind};

/// Outcome of an eligibility check for one usage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextUse {
    /// A use may be logged now.
    Ready,
    /// The minimum wait has not elapsed; the remaining time is attached.
    Wait(Duration),
    /// No further uses of this kind are permitted in the current week.
    Exhausted,
}

impl NextUse {
    pub fn is_ready(&self) -> bool {
        matches!(self, NextUse::Ready)
    }

    /// Remaining wait; `None` stands for "unbounded" (exhausted).
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            NextUse::Ready => Some(Duration::zero()),
            NextUse::Wait(left) => Some(*left),
            NextUse::Exhausted => None,
        }
    }

    pub fn remaining_ms(&self) -> Option<i64> {
        self.remaining().map(|d| d.num_milliseconds())
    }
}

/// Week of the plan in force at `now`.
///
/// Instants past the end of the schedule, or before its start, resolve to
/// the final (all-zero) week. Returns `None` only for a plan without weeks.
pub fn current_week(plan: &QuitPlan, now: DateTime<Utc>) -> Option<&WeekAllowance> {
    let elapsed_ms = (now - plan.start_date).num_milliseconds();
    let weeks_passed = elapsed_ms.div_euclid(Duration::weeks(1).num_milliseconds());

    u32::try_from(weeks_passed)
        .ok()
        .and_then(|n| plan.week(n))
        .or_else(|| plan.final_week())
}

/// Most recent log of `kind`, by timestamp. Ties go to the later insertion.
pub fn last_log_of_kind(logs: &[LogEntry], kind: UsageKind) -> Option<&LogEntry> {
    logs.iter()
        .filter(|l| l.kind == kind)
        .max_by_key(|l| l.timestamp)
}

/// Evaluate eligibility for `kind` at `now`.
pub fn check(
    kind: UsageKind,
    last_log: Option<&LogEntry>,
    week: Option<&WeekAllowance>,
    now: DateTime<Utc>,
) -> NextUse {
    let Some(week) = week else {
        return NextUse::Exhausted;
    };

    let wait_minutes = week.wait_minutes(kind);
    if wait_minutes == 0 {
        return NextUse::Exhausted;
    }

    let Some(last) = last_log else {
        return NextUse::Ready;
    };

    let wait = Duration::minutes(i64::from(wait_minutes));
    let elapsed = now - last.timestamp;
    if elapsed >= wait {
        NextUse::Ready
    } else {
        NextUse::Wait(wait - elapsed)
    }
}

pub fn can_log_now(
    kind: UsageKind,
    last_log: Option<&LogEntry>,
    week: Option<&WeekAllowance>,
    now: DateTime<Utc>,
) -> bool {
    check(kind, last_log, week, now).is_ready()
}

pub fn time_until_next(
    kind: UsageKind,
    last_log: Option<&LogEntry>,
    week: Option<&WeekAllowance>,
    now: DateTime<Utc>,
) -> NextUse {
    check(kind, last_log, week, now)
}

/// Delay to hand to the reminder collaborator, if a reminder makes sense.
pub fn reminder_delay(
    kind: UsageKind,
    last_log: Option<&LogEntry>,
    week: Option<&WeekAllowance>,
    now: DateTime<Utc>,
) -> Option<Duration> {
    match check(kind, last_log, week, now) {
        NextUse::Wait(left) => Some(left),
        NextUse::Ready | NextUse::Exhausted => None,
    }
}

/// Per-kind dashboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStatus {
    pub kind: UsageKind,
    pub allowed_this_week: u32,
    pub wait_minutes: u32,
    pub can_log: bool,
    /// Milliseconds until the next permitted use; `None` when exhausted.
    pub remaining_ms: Option<i64>,
    pub last_logged_at: Option<DateTime<Utc>>,
}

impl KindStatus {
    pub fn evaluate(
        kind: UsageKind,
        logs: &[LogEntry],
        week: Option<&WeekAllowance>,
        now: DateTime<Utc>,
    ) -> Self {
        let last = last_log_of_kind(logs, kind);
        let next = check(kind, last, week, now);
        Self {
            kind,
            allowed_this_week: week.map(|w| w.allowed(kind)).unwrap_or(0),
            wait_minutes: week.map(|w| w.wait_minutes(kind)).unwrap_or(0),
            can_log: next.is_ready(),
            remaining_ms: next.remaining_ms(),
            last_logged_at: last.map(|l| l.timestamp),
        }
    }
}
