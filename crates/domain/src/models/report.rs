//! Admin reporting types: dashboard stats, activity feed, exports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Dashboard counters shown on the admin overview page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_matches: i64,
    pub today_matches: i64,
    pub total_bracelets: i64,
    pub active_bracelets: i64,
}

/// Kind of entry in the admin activity feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    UserRegistration,
    MatchSuccess,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::UserRegistration => "user_registration",
            ActivityKind::MatchSuccess => "match_success",
        }
    }

    /// Human-readable label shown in the admin feed.
    pub fn description(&self) -> &'static str {
        match self {
            ActivityKind::UserRegistration => "新用户注册",
            ActivityKind::MatchSuccess => "成功匹配",
        }
    }
}

/// One row of the merged recent-activity feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub kind: ActivityKind,
    pub description: String,
    pub details: String,
    pub occurred_at: DateTime<Utc>,
}

/// Which tables an export request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Users,
    Matches,
    Bracelets,
    #[default]
    All,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Users => "users",
            ExportKind::Matches => "matches",
            ExportKind::Bracelets => "bracelets",
            ExportKind::All => "all",
        }
    }

    pub fn includes_users(&self) -> bool {
        matches!(self, ExportKind::Users | ExportKind::All)
    }

    pub fn includes_matches(&self) -> bool {
        matches!(self, ExportKind::Matches | ExportKind::All)
    }

    pub fn includes_bracelets(&self) -> bool {
        matches!(self, ExportKind::Bracelets | ExportKind::All)
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "users" => Ok(ExportKind::Users),
            "matches" => Ok(ExportKind::Matches),
            "bracelets" => Ok(ExportKind::Bracelets),
            "all" => Ok(ExportKind::All),
            _ => Err(format!("Unknown export kind: {}", s)),
        }
    }
}

/// Serialization format of an export download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}
