mod config;
pub mod database;
pub mod memory;
pub mod migrations;

pub use config::{Config, DisplayConfig, NotificationsConfig, OnboardingConfig};
pub use database::Database;
pub use memory::MemoryRepository;

use std::path::PathBuf;

use crate::achievements::UnlockedAchievement;
use crate::error::{ConfigError, Result};
use crate::onboarding::UserProfile;
use crate::plan::QuitPlan;
use crate::usage::LogEntry;

/// Persistence boundary for everything the tracker owns.
///
/// Implementations hold the plan, the onboarding profile, the append-only
/// event log and the unlocked achievements. Writers are expected to be
/// serialized by the caller; the last write wins.
pub trait Repository {
    fn load_plan(&self) -> Result<Option<QuitPlan>>;
    fn save_plan(&mut self, plan: &QuitPlan) -> Result<()>;

    fn load_profile(&self) -> Result<Option<UserProfile>>;
    fn save_profile(&mut self, profile: &UserProfile) -> Result<()>;

    /// Entries in insertion order.
    fn load_logs(&self) -> Result<Vec<LogEntry>>;
    fn append_log(&mut self, entry: &LogEntry) -> Result<()>;

    fn load_unlocked_achievements(&self) -> Result<Vec<UnlockedAchievement>>;
    fn save_unlocked_achievements(&mut self, unlocked: &[UnlockedAchievement]) -> Result<()>;

    /// Drop every stored record.
    fn clear_all(&mut self) -> Result<()>;
}

/// Returns the data directory, creating it if needed.
///
/// `QUITPACE_DATA_DIR` overrides the location outright. Otherwise the
/// directory is `~/.config/quitpace/`, or `~/.config/quitpace-dev/` when
/// `QUITPACE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("QUITPACE_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("QUITPACE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("quitpace-dev")
            } else {
                base_dir.join("quitpace")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}
