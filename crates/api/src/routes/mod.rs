//! HTTP route handlers.

pub mod activation;
pub mod admin_bracelets;
pub mod admin_matches;
pub mod admin_reports;
pub mod admin_users;
pub mod health;
