//! Domain services for Autopia.
//!
//! Services contain business logic that operates on domain models.

pub mod fortune_schedule;

pub use fortune_schedule::{day_start, needs_refresh, refresh_boundary, REFRESH_HOUR};
