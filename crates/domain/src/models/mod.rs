//! Domain models for Autopia.

pub mod bracelet;
pub mod matching;
pub mod report;
pub mod user;

pub use bracelet::{Bracelet, BraceletStatus};
pub use matching::{canonical_pair, cooldown_start, MatchCandidate, MatchRecord, MATCH_COOLDOWN_DAYS};
pub use report::{ActivityItem, ActivityKind, EventStats, ExportFormat, ExportKind};
pub use user::{RegisterRequest, UpdateUserRequest, User, UserStatus};
