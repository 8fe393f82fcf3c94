//! Common validation utilities for registration and admin input.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of a display name in characters.
pub const MAX_NAME_CHARS: usize = 50;

/// Maximum length of a profile bio in characters.
pub const MAX_BIO_CHARS: usize = 500;

/// Maximum length of a WeChat ID.
pub const MAX_WECHAT_ID_CHARS: usize = 64;

/// Earliest accepted birth year.
const MIN_BIRTH_YEAR: i32 = 1900;

lazy_static! {
    // Covers seeded UIDs like "prod-A1B2C3D4", "test-uid-001" and raw or
    // colon-separated NFC serials. Must start alphanumeric.
    static ref BRACELET_UID_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9:_-]{2,63}$").unwrap();
    static ref MBTI_REGEX: Regex = Regex::new(r"^[EI][SN][TF][JP]$").unwrap();
}

/// Validates a bracelet UID as written to the NFC tags.
pub fn validate_bracelet_uid(uid: &str) -> Result<(), ValidationError> {
    if BRACELET_UID_REGEX.is_match(uid) {
        Ok(())
    } else {
        let mut err = ValidationError::new("bracelet_uid_format");
        err.message = Some("Bracelet UID must be 3-64 alphanumeric, colon, dash or underscore characters".into());
        Err(err)
    }
}

/// Validates a WeChat ID: non-empty, no whitespace, at most 64 characters.
pub fn validate_wechat_id(wechat_id: &str) -> Result<(), ValidationError> {
    if wechat_id.is_empty()
        || wechat_id.chars().count() > MAX_WECHAT_ID_CHARS
        || wechat_id.chars().any(char::is_whitespace)
    {
        let mut err = ValidationError::new("wechat_id_format");
        err.message = Some("WeChat ID must be 1-64 characters without whitespace".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a display name: non-blank after trimming, at most 50 characters.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_NAME_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message = Some("Name must be 1-50 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Validates an MBTI type code (uppercase, e.g. "INFP").
pub fn validate_mbti(mbti: &str) -> Result<(), ValidationError> {
    if MBTI_REGEX.is_match(mbti) {
        Ok(())
    } else {
        let mut err = ValidationError::new("mbti_format");
        err.message = Some("MBTI must be a four-letter type code such as INFP".into());
        Err(err)
    }
}

/// Validates a birthdate: not in the future, not before 1900.
pub fn validate_birthdate(birthdate: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *birthdate > today {
        let mut err = ValidationError::new("birthdate_future");
        err.message = Some("Birthdate cannot be in the future".into());
        return Err(err);
    }
    if birthdate.year() < MIN_BIRTH_YEAR {
        let mut err = ValidationError::new("birthdate_too_old");
        err.message = Some("Birthdate must be after 1900".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a profile bio length.
pub fn validate_bio(bio: &str) -> Result<(), ValidationError> {
    if bio.chars().count() > MAX_BIO_CHARS {
        let mut err = ValidationError::new("bio_length");
        err.message = Some("Bio must be at most 500 characters".into());
        return Err(err);
    }
    Ok(())
}
