//! Achievement catalog and unlock evaluation.
//!
//! The catalog is static. Unlocks are append-only: once an id is in the
//! unlocked set it is never evaluated again, so a regressing statistic
//! (a broken streak, say) cannot take a badge away.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::stats::Stats;

/// A catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: fn(&Stats) -> bool,
}

/// An achievement the user has earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl Achievement {
    pub fn is_met(&self, stats: &Stats) -> bool {
        (self.condition)(stats)
    }

    fn unlock(&self, at: DateTime<Utc>) -> UnlockedAchievement {
        UnlockedAchievement {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            unlocked_at: at,
        }
    }
}

pub static CATALOG: &[Achievement] = &[
    Achievement {
        id: "first_day",
        title: "First Day",
        description: "Complete your first day",
        icon: "🌟",
        condition: |s| s.days_active >= 1,
    },
    Achievement {
        id: "first_week",
        title: "One Week Strong",
        description: "Complete your first week",
        icon: "💪",
        condition: |s| s.days_active >= 7,
    },
    Achievement {
        id: "two_weeks",
        title: "Two Weeks",
        description: "Complete two weeks on the plan",
        icon: "🔥",
        condition: |s| s.days_active >= 14,
    },
    Achievement {
        id: "one_month",
        title: "One Month Warrior",
        description: "A full month of progress",
        icon: "🏆",
        condition: |s| s.days_active >= 30,
    },
    Achievement {
        id: "reducer_10",
        title: "Reducer",
        description: "Reduce consumption by 10%",
        icon: "📉",
        condition: |s| s.reduction_percentage >= 10,
    },
    Achievement {
        id: "reducer_25",
        title: "Quarter Master",
        description: "Reduce consumption by 25%",
        icon: "🎯",
        condition: |s| s.reduction_percentage >= 25,
    },
    Achievement {
        id: "reducer_50",
        title: "Half Way Hero",
        description: "Reduce consumption by 50%",
        icon: "⭐",
        condition: |s| s.reduction_percentage >= 50,
    },
    Achievement {
        id: "reducer_75",
        title: "Almost There",
        description: "Reduce consumption by 75%",
        icon: "💎",
        condition: |s| s.reduction_percentage >= 75,
    },
    Achievement {
        id: "perfect_day",
        title: "Perfect Day",
        description: "Stay within limits for a full day",
        icon: "✨",
        condition: |s| s.perfect_days >= 1,
    },
    Achievement {
        id: "perfect_week",
        title: "Perfect Week",
        description: "Stay within limits for 7 days",
        icon: "🌈",
        condition: |s| s.perfect_days >= 7,
    },
    Achievement {
        id: "money_saver_50",
        title: "Penny Saver",
        description: "Save $50 by reducing",
        icon: "💰",
        condition: |s| s.money_saved >= 50.0,
    },
    Achievement {
        id: "money_saver_100",
        title: "Money Master",
        description: "Save $100 by reducing",
        icon: "💵",
        condition: |s| s.money_saved >= 100.0,
    },
    Achievement {
        id: "money_saver_500",
        title: "Financial Freedom",
        description: "Save $500 by reducing",
        icon: "🏦",
        condition: |s| s.money_saved >= 500.0,
    },
    Achievement {
        id: "streak_3",
        title: "On a Roll",
        description: "Log for 3 days in a row",
        icon: "🔄",
        condition: |s| s.current_streak >= 3,
    },
    Achievement {
        id: "streak_7",
        title: "Week Streaker",
        description: "Log for 7 days in a row",
        icon: "⚡",
        condition: |s| s.current_streak >= 7,
    },
    Achievement {
        id: "streak_30",
        title: "Unstoppable",
        description: "Log for 30 days in a row",
        icon: "🚀",
        condition: |s| s.current_streak >= 30,
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|a| a.id == id)
}

/// Catalog entries newly satisfied by `stats`, stamped with `now`.
///
/// Entries whose id is already in `already_unlocked` are skipped without
/// evaluating their condition.
pub fn evaluate_achievements(
    stats: &Stats,
    already_unlocked: &[UnlockedAchievement],
    now: DateTime<Utc>,
) -> Vec<UnlockedAchievement> {
    let unlocked: HashSet<&str> = already_unlocked.iter().map(|a| a.id.as_str()).collect();

    CATALOG
        .iter()
        .filter(|a| !unlocked.contains(a.id))
        .filter(|a| a.is_met(stats))
        .map(|a| a.unlock(now))
        .collect()
}
