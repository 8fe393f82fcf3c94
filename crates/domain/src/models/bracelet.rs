//! Bracelet registry domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an NFC bracelet.
///
/// - `Available`: seeded, waiting for a registration to claim it
/// - `Active`: claimed at least once; a freed bracelet keeps this status
///   and can be claimed again while no user is bound to it
/// - `Inactive`: retired by an admin, rejects all taps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceletStatus {
    Available,
    Active,
    Inactive,
}

impl BraceletStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BraceletStatus::Available => "available",
            BraceletStatus::Active => "active",
            BraceletStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for BraceletStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BraceletStatus::Available),
            "active" => Ok(BraceletStatus::Active),
            "inactive" => Ok(BraceletStatus::Inactive),
            _ => Err(format!("Invalid bracelet status: {}", s)),
        }
    }
}

impl fmt::Display for BraceletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A physical NFC bracelet known to the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bracelet {
    pub uid: String,
    pub status: BraceletStatus,
    pub created_at: DateTime<Utc>,
}
