//! Shared utilities and common types for the Autopia backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (hashing, bracelet UID generation)
//! - CSV assembly for admin data exports
//! - Page/limit pagination helpers
//! - Common validation logic

pub mod crypto;
pub mod csv;
pub mod pagination;
pub mod validation;
