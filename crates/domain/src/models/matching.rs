//! Match records and candidate selection types.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Days a pair stays excluded from being matched again.
pub const MATCH_COOLDOWN_DAYS: i64 = 14;

/// A recorded pairing between two attendees.
///
/// Pairs are stored canonically with `user1_id < user2_id` so that the same
/// two people can never occupy two rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: i64,
    pub user1_id: i64,
    pub user2_id: i64,
    pub matched_at: DateTime<Utc>,
}

/// Profile of the attendee selected as today's recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub wechat_id: String,
    pub mbti: Option<String>,
    pub favorite_song: Option<String>,
    pub bio: Option<String>,
}

/// Orders a pair of user ids so the smaller id comes first.
pub fn canonical_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Oldest `matched_at` still inside the cooldown window at `now`.
pub fn cooldown_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(MATCH_COOLDOWN_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_pair_orders_ids() {
        assert_eq!(canonical_pair(5, 3), (3, 5));
        assert_eq!(canonical_pair(3, 5), (3, 5));
    }

    #[test]
    fn test_canonical_pair_equal_ids() {
        assert_eq!(canonical_pair(7, 7), (7, 7));
    }

    #[test]
    fn test_cooldown_start() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(cooldown_start(now), expected);
    }

    #[test]
    fn test_match_record_serializes_camel_case() {
        let record = MatchRecord {
            id: 1,
            user1_id: 2,
            user2_id: 9,
            matched_at: Utc.with_ymd_and_hms(2024, 6, 1, 0, 30, 0).unwrap(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("user1Id").is_some());
        assert!(json.get("matchedAt").is_some());
    }
}
