//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod bracelet;
pub mod match_record;
pub mod user;

pub use bracelet::{BraceletEntity, BraceletStatusDb, BraceletWithUserEntity};
pub use match_record::{MatchCandidateEntity, MatchRecordEntity, MatchWithUsersEntity};
pub use user::{UserEntity, UserStatusDb};
