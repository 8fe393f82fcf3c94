//! Daily fortune refresh schedule.
//!
//! Fortunes refresh once per day at 08:00 event time. The event runs in
//! Asia/Shanghai (UTC+8, no daylight saving), so all boundary math uses a
//! fixed offset regardless of where the server is deployed.
//!
//! A fortune generated at any point before today's 08:00 boundary is stale
//! once the boundary has passed. Before the boundary, yesterday's message
//! keeps serving no matter how old it is.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

/// Event timezone offset from UTC, in seconds.
const EVENT_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Hour of day (event time) at which fortunes refresh.
pub const REFRESH_HOUR: u32 = 8;

fn event_tz() -> FixedOffset {
    // 8 hours is always a valid offset
    FixedOffset::east_opt(EVENT_UTC_OFFSET_SECS).expect("valid UTC offset")
}

/// Today's 08:00 event-time refresh boundary for the instant `now`, in UTC.
pub fn refresh_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    at_event_hour(now, REFRESH_HOUR)
}

/// Midnight event time on the calendar day containing `now`, in UTC.
///
/// Used for "has X already happened today" checks such as the daily
/// recommendation cap.
pub fn day_start(now: DateTime<Utc>) -> DateTime<Utc> {
    at_event_hour(now, 0)
}

/// Whether a fortune generated at `last` must be regenerated at `now`.
///
/// `last == None` means the user has never had a fortune; the boundary rule
/// still applies, so even a brand-new profile does not refresh before 08:00.
pub fn needs_refresh(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> bool {
    let boundary = refresh_boundary(now);
    if now < boundary {
        return false;
    }
    match last {
        None => true,
        Some(last) => last < boundary,
    }
}

fn at_event_hour(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let tz = event_tz();
    let local_day = now.with_timezone(&tz).date_naive();
    let wall_clock = local_day
        .and_hms_opt(hour, 0, 0)
        .expect("valid wall-clock time");
    tz.from_local_datetime(&wall_clock)
        .single()
        .expect("fixed offsets are unambiguous")
        .with_timezone(&Utc)
}
