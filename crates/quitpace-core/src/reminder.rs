//! One-shot "you may use again" reminders.
//!
//! The scheduler is a plain wall-clock queue: callers arm reminders, poll
//! with the current instant, and deliver whatever fired through a
//! [`Notifier`]. Scheduling a kind supersedes that kind's pending reminder,
//! and every reminder can be cancelled through its handle.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::eligibility::{last_log_of_kind, reminder_delay};
use crate::error::Result;
use crate::plan::WeekAllowance;
use crate::usage::{LogEntry, UsageKind};

/// Identifies a scheduled reminder for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderHandle(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub handle: ReminderHandle,
    pub kind: UsageKind,
    pub due_at: DateTime<Utc>,
}

impl Reminder {
    pub fn title(&self) -> String {
        format!("Ready for your {}", self.kind)
    }

    pub fn body(&self) -> String {
        format!("You can now have a {}. Log it when you do.", self.kind)
    }
}

/// Delivers fired reminders. Permission handling belongs to the implementor.
pub trait Notifier {
    fn notify(&mut self, reminder: &Reminder) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct ReminderScheduler {
    next_id: u64,
    pending: Vec<Reminder>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a reminder for `kind` after `delay`, replacing any pending one.
    pub fn schedule(
        &mut self,
        kind: UsageKind,
        delay: Duration,
        now: DateTime<Utc>,
    ) -> ReminderHandle {
        self.cancel_kind(kind);
        self.next_id += 1;
        let handle = ReminderHandle(self.next_id);
        let due_at = now + delay.max(Duration::zero());
        tracing::debug!(%kind, %due_at, "reminder scheduled");
        self.pending.push(Reminder {
            handle,
            kind,
            due_at,
        });
        handle
    }

    /// Returns false if the reminder already fired or was cancelled.
    pub fn cancel(&mut self, handle: ReminderHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|r| r.handle != handle);
        before != self.pending.len()
    }

    pub fn cancel_kind(&mut self, kind: UsageKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|r| r.kind != kind);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[Reminder] {
        &self.pending
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.pending.iter().map(|r| r.due_at).min()
    }

    /// Remove and return every reminder due at or before `now`, earliest first.
    pub fn poll_due(&mut self, now: DateTime<Utc>) -> Vec<Reminder> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|r| r.due_at <= now);
        self.pending = rest;
        due.sort_by_key(|r| r.due_at);
        due
    }

    /// Re-derive reminders from the current log and week.
    ///
    /// Kinds that are waiting get a fresh reminder; kinds that are ready or
    /// exhausted have theirs cancelled. Call after every log or replan.
    pub fn rearm(&mut self, logs: &[LogEntry], week: Option<&WeekAllowance>, now: DateTime<Utc>) {
        for kind in UsageKind::ALL {
            let last = last_log_of_kind(logs, kind);
            match reminder_delay(kind, last, week, now) {
                Some(delay) => {
                    self.schedule(kind, delay, now);
                }
                None => {
                    self.cancel_kind(kind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{generate_quit_plan, PlanSpeed};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 1, 10, 0, 0).unwrap()
    }

    #[derive(Default)]
    struct Collect(Vec<Reminder>);

    impl Notifier for Collect {
        fn notify(&mut self, reminder: &Reminder) -> Result<()> {
            self.0.push(reminder.clone());
            Ok(())
        }
    }

    #[test]
    fn fires_once_when_due() {
        let mut scheduler = ReminderScheduler::new();
        scheduler.schedule(UsageKind::Cigarette, Duration::minutes(30), now());

        assert!(scheduler.poll_due(now() + Duration::minutes(29)).is_empty());
        let fired = scheduler.poll_due(now() + Duration::minutes(30));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, UsageKind::Cigarette);
        assert!(scheduler.poll_due(now() + Duration::hours(5)).is_empty());

        let mut sink = Collect::default();
        for r in &fired {
            sink.notify(r).unwrap();
        }
        assert_eq!(sink.0[0].title(), "Ready for your cigarette");
    }

    #[test]
    fn rescheduling_supersedes_same_kind() {
        let mut scheduler = ReminderScheduler::new();
        let stale = scheduler.schedule(UsageKind::Vape, Duration::minutes(10), now());
        let fresh = scheduler.schedule(UsageKind::Vape, Duration::minutes(60), now());
        assert_ne!(stale, fresh);
        assert_eq!(scheduler.pending().len(), 1);
        assert!(!scheduler.cancel(stale));
        assert_eq!(scheduler.next_due(), Some(now() + Duration::minutes(60)));
    }

    #[test]
    fn cancel_by_handle() {
        let mut scheduler = ReminderScheduler::new();
        let cig = scheduler.schedule(UsageKind::Cigarette, Duration::minutes(5), now());
        scheduler.schedule(UsageKind::Vape, Duration::minutes(15), now());
        assert!(scheduler.cancel(cig));
        assert!(!scheduler.cancel(cig));
        let fired = scheduler.poll_due(now() + Duration::hours(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, UsageKind::Vape);
    }

    #[test]
    fn rearm_follows_eligibility() {
        let plan = generate_quit_plan(70, 0, PlanSpeed::Medium, now()).unwrap();
        let week = plan.weeks.first();
        let logs = vec![
            LogEntry::new(UsageKind::Cigarette, now()),
            LogEntry::new(UsageKind::Vape, now()),
        ];

        let mut scheduler = ReminderScheduler::new();
        scheduler.schedule(UsageKind::Vape, Duration::minutes(1), now());
        scheduler.rearm(&logs, week, now() + Duration::minutes(6));

        // Vapes are exhausted, so only the cigarette reminder survives.
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(scheduler.pending()[0].kind, UsageKind::Cigarette);
        assert_eq!(scheduler.next_due(), Some(now() + Duration::minutes(96)));

        scheduler.rearm(&logs, week, now() + Duration::minutes(200));
        assert!(scheduler.pending().is_empty());
    }
}
