//! # Quitpace Core Library
//!
//! This library provides the core logic for the Quitpace habit-reduction
//! tracker. A user records how much they smoke or vape per week, picks a
//! pace, and gets a tapering weekly schedule down to zero. Each use is then
//! gated by a minimum wait derived from the current week's allowance.
//!
//! ## Architecture
//!
//! - **Plan**: pure generator for the tapering schedule
//! - **Eligibility**: decides whether a use may be logged now, and when next
//! - **Stats / Achievements**: metrics recomputed on demand from the log
//! - **Reminder**: cancellable one-shot "you may use again" reminders
//! - **Storage**: `Repository` trait with SQLite and in-memory backends,
//!   plus TOML configuration
//! - **Tracker**: the read-compute-persist cycle a front end drives
//!
//! All engines take the current instant as an argument; nothing in the core
//! reads the clock.

pub mod achievements;
pub mod eligibility;
pub mod error;
pub mod onboarding;
pub mod plan;
pub mod reminder;
pub mod stats;
pub mod storage;
pub mod tracker;
pub mod usage;

pub use achievements::{evaluate_achievements, Achievement, UnlockedAchievement, CATALOG};
pub use eligibility::{can_log_now, current_week, time_until_next, KindStatus, NextUse};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use onboarding::{complete_onboarding, OnboardingInput, UserProfile};
pub use plan::{generate_quit_plan, PlanSpeed, QuitPlan, WeekAllowance};
pub use reminder::{Notifier, Reminder, ReminderHandle, ReminderScheduler};
pub use stats::{compute_stats, Pricing, Stats};
pub use storage::{Config, Database, MemoryRepository, Repository};
pub use tracker::{AchievementView, Dashboard, LogOutcome, Tracker};
pub use usage::{LogEntry, UsageKind};
