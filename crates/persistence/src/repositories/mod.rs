//! Repository implementations for database operations.

pub mod bracelet;
pub mod matches;
pub mod user;

pub use bracelet::BraceletRepository;
pub use matches::MatchRepository;
pub use user::{RegistrationOutcome, UserRepository};
