//! Logged consumption events.
//!
//! The event log is an append-only sequence of [`LogEntry`] values. Entries
//! carry no identifier; they are distinguished by timestamp and insertion
//! order, and are never edited once recorded.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// What was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageKind {
    Cigarette,
    Vape,
}

impl UsageKind {
    pub const ALL: [UsageKind; 2] = [UsageKind::Cigarette, UsageKind::Vape];

    pub fn as_str(self) -> &'static str {
        match self {
            UsageKind::Cigarette => "cigarette",
            UsageKind::Vape => "vape",
        }
    }
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cigarette" | "cig" | "cigarettes" => Ok(UsageKind::Cigarette),
            "vape" | "vapes" => Ok(UsageKind::Vape),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

/// A single logged use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "type")]
    pub kind: UsageKind,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(kind: UsageKind, timestamp: DateTime<Utc>) -> Self {
        Self { kind, timestamp }
    }
}

/// Count entries of one kind.
pub fn count_of_kind(logs: &[LogEntry], kind: UsageKind) -> usize {
    logs.iter().filter(|l| l.kind == kind).count()
}
