//! Read-compute-persist cycle over a [`Repository`].
//!
//! The tracker is what a front end talks to. Every call samples nothing on
//! its own: the caller passes `now`, and calendar-day metrics use the time
//! zone carried by it.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::{evaluate_achievements, UnlockedAchievement, CATALOG};
use crate::eligibility::{check, current_week, last_log_of_kind, KindStatus, NextUse};
use crate::error::{CoreError, Result};
use crate::onboarding::{complete_onboarding, OnboardingInput, UserProfile};
use crate::plan::{QuitPlan, WeekAllowance};
use crate::reminder::ReminderScheduler;
use crate::stats::{compute_stats, today_count, Pricing, Stats};
use crate::storage::{OnboardingConfig, Repository};
use crate::usage::{LogEntry, UsageKind};

/// Snapshot shown on the home screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub week: Option<WeekAllowance>,
    pub total_weeks: u32,
    pub kinds: Vec<KindStatus>,
    pub today_count: usize,
    pub estimated_quit_date: DateTime<Utc>,
}

/// Result of asking to log a use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LogOutcome {
    Logged {
        entry: LogEntry,
        unlocked: Vec<UnlockedAchievement>,
    },
    TooSoon {
        remaining_ms: i64,
    },
    Exhausted,
}

/// A catalog entry together with its unlock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: Option<DateTime<Utc>>,
}

pub struct Tracker<R: Repository> {
    repo: R,
}

impl<R: Repository> Tracker<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    pub fn is_onboarded(&self) -> Result<bool> {
        Ok(self.repo.load_plan()?.is_some())
    }

    /// Store the profile and a freshly generated plan, replacing any previous one.
    ///
    /// The event log and unlocked achievements are kept.
    pub fn onboard(
        &mut self,
        input: &OnboardingInput,
        defaults: &OnboardingConfig,
        now: DateTime<Utc>,
    ) -> Result<QuitPlan> {
        let (profile, plan) = complete_onboarding(input, defaults, now)?;
        self.repo.save_profile(&profile)?;
        self.repo.save_plan(&plan)?;
        Ok(plan)
    }

    /// # Errors
    /// [`CoreError::NotOnboarded`] when no plan has been stored.
    pub fn plan(&self) -> Result<QuitPlan> {
        self.repo.load_plan()?.ok_or(CoreError::NotOnboarded)
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.repo.load_profile()
    }

    /// Unit prices from the profile, or the defaults without one.
    pub fn pricing(&self) -> Result<Pricing> {
        Ok(self
            .repo
            .load_profile()?
            .map(|p| p.pricing())
            .unwrap_or_default())
    }

    pub fn logs(&self) -> Result<Vec<LogEntry>> {
        self.repo.load_logs()
    }

    pub fn status<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Dashboard> {
        let plan = self.plan()?;
        let logs = self.repo.load_logs()?;
        let now_utc = now.with_timezone(&Utc);
        let week = current_week(&plan, now_utc);

        Ok(Dashboard {
            week: week.cloned(),
            total_weeks: plan.total_weeks,
            kinds: UsageKind::ALL
                .iter()
                .map(|&kind| KindStatus::evaluate(kind, &logs, week, now_utc))
                .collect(),
            today_count: today_count(&logs, now),
            estimated_quit_date: plan.estimated_quit_date,
        })
    }

    /// Log a use if the plan currently permits it.
    ///
    /// Nothing is written when the wait has not elapsed or the week's
    /// allowance for `kind` is used up.
    pub fn log_use<Tz: TimeZone>(&mut self, kind: UsageKind, now: &DateTime<Tz>) -> Result<LogOutcome> {
        let plan = self.plan()?;
        let logs = self.repo.load_logs()?;
        let now_utc = now.with_timezone(&Utc);
        let week = current_week(&plan, now_utc);

        match check(kind, last_log_of_kind(&logs, kind), week, now_utc) {
            NextUse::Ready => {
                let (entry, unlocked) = self.record_use(kind, now)?;
                Ok(LogOutcome::Logged { entry, unlocked })
            }
            NextUse::Wait(left) => {
                tracing::debug!(%kind, remaining_ms = left.num_milliseconds(), "log refused: too soon");
                Ok(LogOutcome::TooSoon {
                    remaining_ms: left.num_milliseconds(),
                })
            }
            NextUse::Exhausted => {
                tracing::debug!(%kind, "log refused: allowance exhausted");
                Ok(LogOutcome::Exhausted)
            }
        }
    }

    /// Append a use unconditionally and evaluate achievements.
    ///
    /// Returns the stored entry and any achievements it unlocked.
    pub fn record_use<Tz: TimeZone>(
        &mut self,
        kind: UsageKind,
        now: &DateTime<Tz>,
    ) -> Result<(LogEntry, Vec<UnlockedAchievement>)> {
        // Require a plan before touching the log.
        self.plan()?;
        let entry = LogEntry::new(kind, now.with_timezone(&Utc));
        self.repo.append_log(&entry)?;
        tracing::info!(%kind, at = %entry.timestamp, "use logged");

        // The use is stored at this point; unlock failures are not fatal.
        let unlocked = match self.refresh_achievements(now) {
            Ok(unlocked) => unlocked,
            Err(e) => {
                tracing::warn!(error = %e, "achievement refresh failed after logging");
                Vec::new()
            }
        };
        Ok((entry, unlocked))
    }

    pub fn stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<Stats> {
        let plan = self.repo.load_plan()?;
        let logs = self.repo.load_logs()?;
        let pricing = self.pricing()?;
        Ok(compute_stats(&logs, plan.as_ref(), &pricing, now))
    }

    /// Evaluate the catalog and persist anything newly unlocked.
    pub fn refresh_achievements<Tz: TimeZone>(
        &mut self,
        now: &DateTime<Tz>,
    ) -> Result<Vec<UnlockedAchievement>> {
        let stats = self.stats(now)?;
        let mut unlocked = self.repo.load_unlocked_achievements()?;
        let fresh = evaluate_achievements(&stats, &unlocked, now.with_timezone(&Utc));

        if !fresh.is_empty() {
            for a in &fresh {
                tracing::info!(id = %a.id, "achievement unlocked");
            }
            unlocked.extend(fresh.iter().cloned());
            self.repo.save_unlocked_achievements(&unlocked)?;
        }
        Ok(fresh)
    }

    /// Every catalog entry, in catalog order, with its unlock instant if any.
    pub fn achievements(&self) -> Result<Vec<AchievementView>> {
        let unlocked: HashMap<String, DateTime<Utc>> = self
            .repo
            .load_unlocked_achievements()?
            .into_iter()
            .map(|a| (a.id, a.unlocked_at))
            .collect();

        Ok(CATALOG
            .iter()
            .map(|a| AchievementView {
                id: a.id.to_string(),
                title: a.title.to_string(),
                description: a.description.to_string(),
                icon: a.icon.to_string(),
                unlocked_at: unlocked.get(a.id).copied(),
            })
            .collect())
    }

    /// Re-derive pending reminders from the stored log.
    pub fn rearm_reminders(&self, scheduler: &mut ReminderScheduler, now: DateTime<Utc>) -> Result<()> {
        let plan = self.plan()?;
        let logs = self.repo.load_logs()?;
        scheduler.rearm(&logs, current_week(&plan, now), now);
        Ok(())
    }

    /// Forget the plan, profile, log and achievements.
    pub fn reset(&mut self) -> Result<()> {
        self.repo.clear_all()?;
        tracing::info!("tracker data reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::storage::MemoryRepository;
    use chrono::{Duration, FixedOffset};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
    }

    fn onboarded(cigs: u32, vapes: u32) -> Tracker<MemoryRepository> {
        let mut tracker = Tracker::new(MemoryRepository::new());
        let input = OnboardingInput {
            cigarettes_per_week: cigs,
            vapes_per_week: vapes,
            ..OnboardingInput::default()
        };
        tracker
            .onboard(&input, &OnboardingConfig::default(), start())
            .unwrap();
        tracker
    }

    #[test]
    fn requires_onboarding() {
        let mut tracker = Tracker::new(MemoryRepository::new());
        assert!(!tracker.is_onboarded().unwrap());
        assert!(matches!(tracker.plan(), Err(CoreError::NotOnboarded)));
        assert!(matches!(
            tracker.log_use(UsageKind::Cigarette, &start()),
            Err(CoreError::NotOnboarded)
        ));
        assert!(tracker.logs().unwrap().is_empty());
        assert_eq!(tracker.stats(&start()).unwrap(), Stats::default());
    }

    #[test]
    fn log_use_enforces_wait() {
        let mut tracker = onboarded(70, 0);

        let first = tracker.log_use(UsageKind::Cigarette, &start()).unwrap();
        assert!(matches!(first, LogOutcome::Logged { .. }));

        let early = start() + Duration::minutes(30);
        assert_eq!(
            tracker.log_use(UsageKind::Cigarette, &early).unwrap(),
            LogOutcome::TooSoon {
                remaining_ms: Duration::minutes(66).num_milliseconds()
            }
        );
        assert_eq!(
            tracker.log_use(UsageKind::Vape, &early).unwrap(),
            LogOutcome::Exhausted
        );
        assert_eq!(tracker.logs().unwrap().len(), 1);

        let later = start() + Duration::minutes(96);
        assert!(matches!(
            tracker.log_use(UsageKind::Cigarette, &later).unwrap(),
            LogOutcome::Logged { .. }
        ));
        assert_eq!(tracker.logs().unwrap().len(), 2);
    }

    #[test]
    fn record_use_bypasses_eligibility() {
        let mut tracker = onboarded(70, 0);
        tracker.record_use(UsageKind::Vape, &start()).unwrap();
        tracker.record_use(UsageKind::Vape, &start()).unwrap();
        let kinds: Vec<_> = tracker.logs().unwrap().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![UsageKind::Vape, UsageKind::Vape]);
    }

    /// Memory repository whose achievement table cannot be read.
    struct UnreadableAchievements(MemoryRepository);

    impl Repository for UnreadableAchievements {
        fn load_plan(&self) -> Result<Option<QuitPlan>> {
            self.0.load_plan()
        }
        fn save_plan(&mut self, plan: &QuitPlan) -> Result<()> {
            self.0.save_plan(plan)
        }
        fn load_profile(&self) -> Result<Option<UserProfile>> {
            self.0.load_profile()
        }
        fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
            self.0.save_profile(profile)
        }
        fn load_logs(&self) -> Result<Vec<LogEntry>> {
            self.0.load_logs()
        }
        fn append_log(&mut self, entry: &LogEntry) -> Result<()> {
            self.0.append_log(entry)
        }
        fn load_unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>> {
            Err(DatabaseError::CorruptRecord {
                table: "unlocked_achievements".to_string(),
                message: "bad timestamp".to_string(),
            }
            .into())
        }
        fn save_unlocked_achievements(&mut self, unlocked: &[UnlockedAchievement]) -> Result<()> {
            self.0.save_unlocked_achievements(unlocked)
        }
        fn clear_all(&mut self) -> Result<()> {
            self.0.clear_all()
        }
    }

    #[test]
    fn logged_use_survives_achievement_failure() {
        let mut tracker = Tracker::new(UnreadableAchievements(MemoryRepository::new()));
        let input = OnboardingInput {
            cigarettes_per_week: 70,
            ..OnboardingInput::default()
        };
        tracker
            .onboard(&input, &OnboardingConfig::default(), start())
            .unwrap();

        let outcome = tracker.log_use(UsageKind::Cigarette, &start()).unwrap();
        match outcome {
            LogOutcome::Logged { unlocked, .. } => assert!(unlocked.is_empty()),
            other => panic!("expected a logged use, got {other:?}"),
        }
        assert_eq!(tracker.logs().unwrap().len(), 1);
    }

    #[test]
    fn status_reports_current_week() {
        let mut tracker = onboarded(70, 14);
        let local = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = (start() + Duration::days(8)).with_timezone(&local);
        tracker.record_use(UsageKind::Cigarette, &now).unwrap();

        let dash = tracker.status(&now).unwrap();
        let week = dash.week.unwrap();
        assert_eq!(week.week_number, 1);
        assert_eq!(dash.kinds.len(), 2);
        assert_eq!(dash.kinds[0].kind, UsageKind::Cigarette);
        assert!(!dash.kinds[0].can_log);
        assert!(dash.kinds[1].can_log);
        assert_eq!(dash.today_count, 1);
        assert_eq!(dash.total_weeks as usize, tracker.plan().unwrap().weeks.len());
    }

    #[test]
    fn achievements_unlock_once_and_persist() {
        let mut tracker = onboarded(70, 0);
        let day_two = start() + Duration::days(1) + Duration::hours(1);

        let (_, unlocked) = tracker.record_use(UsageKind::Cigarette, &day_two).unwrap();
        let ids: Vec<_> = unlocked.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"first_day"));

        assert!(tracker.refresh_achievements(&day_two).unwrap().is_empty());
        let views = tracker.achievements().unwrap();
        assert_eq!(views.len(), CATALOG.len());
        let first_day = views.iter().find(|v| v.id == "first_day").unwrap();
        assert_eq!(first_day.unlocked_at, Some(day_two));
        assert!(views.iter().any(|v| v.unlocked_at.is_none()));
    }

    #[test]
    fn onboarding_again_replaces_plan_keeps_log() {
        let mut tracker = onboarded(70, 0);
        tracker.record_use(UsageKind::Cigarette, &start()).unwrap();

        let input = OnboardingInput {
            vapes_per_week: 10,
            ..OnboardingInput::default()
        };
        let later = start() + Duration::days(3);
        tracker
            .onboard(&input, &OnboardingConfig::default(), later)
            .unwrap();
        let plan = tracker.plan().unwrap();
        assert_eq!(plan.start_date, later);
        assert_eq!(plan.original_cigarettes_per_week, 0);
        assert_eq!(tracker.logs().unwrap().len(), 1);
    }

    #[test]
    fn rearm_reminders_from_log() {
        let mut tracker = onboarded(70, 0);
        tracker.record_use(UsageKind::Cigarette, &start()).unwrap();
        let mut scheduler = ReminderScheduler::new();
        tracker
            .rearm_reminders(&mut scheduler, start() + Duration::minutes(10))
            .unwrap();
        assert_eq!(scheduler.next_due(), Some(start() + Duration::minutes(96)));
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = onboarded(20, 0);
        tracker.record_use(UsageKind::Cigarette, &start()).unwrap();
        tracker.reset().unwrap();
        assert!(!tracker.is_onboarded().unwrap());
        assert!(tracker.logs().unwrap().is_empty());
        assert!(tracker.profile().unwrap().is_none());
        assert!(tracker
            .achievements()
            .unwrap()
            .iter()
            .all(|v| v.unlocked_at.is_none()));
    }
}
