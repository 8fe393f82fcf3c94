//! Attendee domain model and registration/admin request payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Account state of a registered attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(format!("Invalid user status: {}", s)),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered event attendee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub bracelet_uid: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub wechat_id: String,
    pub mbti: Option<String>,
    pub favorite_song: Option<String>,
    pub bio: Option<String>,
    pub status: UserStatus,
    pub is_matchable: bool,
    pub last_fortune_at: Option<DateTime<Utc>>,
    pub last_fortune_message: Option<String>,
    pub last_matched_as_target_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload submitted from the on-site sign-up form.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(custom(function = "shared::validation::validate_bracelet_uid"))]
    pub bracelet_uid: String,

    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: String,

    #[validate(length(min = 1, max = 16, message = "Gender must be 1-16 characters"))]
    pub gender: String,

    /// Checked against the calendar in the handler, see
    /// `shared::validation::validate_birthdate`.
    pub birthdate: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_wechat_id"))]
    pub wechat_id: String,

    #[validate(custom(function = "shared::validation::validate_mbti"))]
    pub mbti: Option<String>,

    #[validate(length(max = 100, message = "Favorite song must be at most 100 characters"))]
    pub favorite_song: Option<String>,

    #[validate(custom(function = "shared::validation::validate_bio"))]
    pub bio: Option<String>,

    #[serde(default = "default_is_matchable")]
    pub is_matchable: bool,
}

fn default_is_matchable() -> bool {
    true
}

impl RegisterRequest {
    /// Normalizes form input ahead of validation: trims whitespace,
    /// uppercases the MBTI code, and drops empty optional fields.
    pub fn normalized(self) -> Self {
        let non_blank =
            |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            bracelet_uid: self.bracelet_uid.trim().to_string(),
            name: self.name.trim().to_string(),
            gender: self.gender.trim().to_string(),
            birthdate: self.birthdate,
            wechat_id: self.wechat_id.trim().to_string(),
            mbti: non_blank(self.mbti).map(|m| m.to_uppercase()),
            favorite_song: non_blank(self.favorite_song),
            bio: non_blank(self.bio),
            is_matchable: self.is_matchable,
        }
    }
}

/// Partial update applied by an admin. Absent fields keep their value.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(custom(function = "shared::validation::validate_display_name"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 16, message = "Gender must be 1-16 characters"))]
    pub gender: Option<String>,

    pub birthdate: Option<NaiveDate>,

    #[validate(custom(function = "shared::validation::validate_wechat_id"))]
    pub wechat_id: Option<String>,

    #[validate(custom(function = "shared::validation::validate_bracelet_uid"))]
    pub bracelet_uid: Option<String>,

    #[validate(custom(function = "shared::validation::validate_mbti"))]
    pub mbti: Option<String>,

    #[validate(length(max = 100, message = "Favorite song must be at most 100 characters"))]
    pub favorite_song: Option<String>,

    #[validate(custom(function = "shared::validation::validate_bio"))]
    pub bio: Option<String>,

    pub status: Option<UserStatus>,
    pub is_matchable: Option<bool>,
}
