//! Domain layer for the Autopia backend.
//!
//! This crate contains:
//! - Domain models (Bracelet, User, MatchRecord)
//! - The fortune refresh schedule logic
//! - Admin reporting types

pub mod models;
pub mod services;
