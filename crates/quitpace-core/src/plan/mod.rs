//! Tapering plan model and generator.
//!
//! A [`QuitPlan`] is produced once, at onboarding, and is never edited
//! afterwards; re-onboarding replaces it wholesale.

mod generator;

pub use generator::{
    generate_quit_plan, wait_time_minutes, MAX_PLANNED_WEEKS, STOP_THRESHOLD,
    WAKING_MINUTES_PER_WEEK,
};

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::usage::UsageKind;

/// Reduction pace chosen at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanSpeed {
    Slow,
    #[default]
    Medium,
    Quick,
}

impl PlanSpeed {
    /// Weekly compounding reduction applied to the total allowance.
    pub fn reduction_rate(self) -> f64 {
        match self {
            PlanSpeed::Slow => 0.05,
            PlanSpeed::Medium => 0.10,
            PlanSpeed::Quick => 0.15,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanSpeed::Slow => "slow",
            PlanSpeed::Medium => "medium",
            PlanSpeed::Quick => "quick",
        }
    }

    /// Parse a speed name. Anything unrecognised falls back to `Medium`.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "slow" => PlanSpeed::Slow,
            "quick" => PlanSpeed::Quick,
            _ => PlanSpeed::Medium,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PlanSpeed::Slow => "Gentle: 5% less every week",
            PlanSpeed::Medium => "Balanced: 10% less every week",
            PlanSpeed::Quick => "Aggressive: 15% less every week",
        }
    }
}

impl From<String> for PlanSpeed {
    fn from(value: String) -> Self {
        PlanSpeed::parse_lenient(&value)
    }
}

impl From<PlanSpeed> for String {
    fn from(speed: PlanSpeed) -> Self {
        speed.as_str().to_string()
    }
}

impl fmt::Display for PlanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allowance for one week of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAllowance {
    pub week_number: u32,
    pub week_start: DateTime<Utc>,
    pub total_allowed: u32,
    pub cigarettes_allowed: u32,
    pub vapes_allowed: u32,
    /// Minutes between cigarettes. 0 means none are left this week.
    pub wait_time_cigs: u32,
    /// Minutes between vapes. 0 means none are left this week.
    pub wait_time_vapes: u32,
}

impl WeekAllowance {
    pub fn allowed(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::Cigarette => self.cigarettes_allowed,
            UsageKind::Vape => self.vapes_allowed,
        }
    }

    /// Wait time for `kind` in minutes; 0 is the "none left" sentinel.
    pub fn wait_minutes(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::Cigarette => self.wait_time_cigs,
            UsageKind::Vape => self.wait_time_vapes,
        }
    }

    pub fn week_end(&self) -> DateTime<Utc> {
        self.week_start + Duration::weeks(1)
    }

    pub fn is_terminal(&self) -> bool {
        self.total_allowed == 0 && self.cigarettes_allowed == 0 && self.vapes_allowed == 0
    }
}

/// A complete tapering schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitPlan {
    pub start_date: DateTime<Utc>,
    pub plan_speed: PlanSpeed,
    pub original_cigarettes_per_week: u32,
    pub original_vapes_per_week: u32,
    pub cig_percentage: f64,
    pub vape_percentage: f64,
    pub reduction_rate: f64,
    pub weeks: Vec<WeekAllowance>,
    pub estimated_quit_date: DateTime<Utc>,
    pub total_weeks: u32,
}

impl QuitPlan {
    pub fn original_total_per_week(&self) -> u32 {
        self.original_cigarettes_per_week
            .saturating_add(self.original_vapes_per_week)
    }

    pub fn original_per_week(&self, kind: UsageKind) -> u32 {
        match kind {
            UsageKind::Cigarette => self.original_cigarettes_per_week,
            UsageKind::Vape => self.original_vapes_per_week,
        }
    }

    pub fn week(&self, week_number: u32) -> Option<&WeekAllowance> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    pub fn final_week(&self) -> Option<&WeekAllowance> {
        self.weeks.last()
    }
}
