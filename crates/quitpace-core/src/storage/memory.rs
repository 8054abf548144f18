//! In-memory repository for tests and embedding.

use super::Repository;
use crate::achievements::UnlockedAchievement;
use crate::error::Result;
use crate::onboarding::UserProfile;
use crate::plan::QuitPlan;
use crate::usage::LogEntry;

#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    plan: Option<QuitPlan>,
    profile: Option<UserProfile>,
    logs: Vec<LogEntry>,
    unlocked: Vec<UnlockedAchievement>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Repository for MemoryRepository {
    fn load_plan(&self) -> Result<Option<QuitPlan>> {
        Ok(self.plan.clone())
    }

    fn save_plan(&mut self, plan: &QuitPlan) -> Result<()> {
        self.plan = Some(plan.clone());
        Ok(())
    }

    fn load_profile(&self) -> Result<Option<UserProfile>> {
        Ok(self.profile.clone())
    }

    fn save_profile(&mut self, profile: &UserProfile) -> Result<()> {
        self.profile = Some(profile.clone());
        Ok(())
    }

    fn load_logs(&self) -> Result<Vec<LogEntry>> {
        Ok(self.logs.clone())
    }

    fn append_log(&mut self, entry: &LogEntry) -> Result<()> {
        self.logs.push(entry.clone());
        Ok(())
    }

    fn load_unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>> {
        Ok(self.unlocked.clone())
    }

    fn save_unlocked_achievements(&mut self, unlocked: &[UnlockedAchievement]) -> Result<()> {
        self.unlocked = unlocked.to_vec();
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }
}
