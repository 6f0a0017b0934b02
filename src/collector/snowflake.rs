//! Snowflake ID decoding
//!
//! Tweet IDs carry their creation time in the top 42 bits as milliseconds
//! since the platform epoch (2010-11-04T01:42:54.657Z).

use chrono::{DateTime, Utc};

/// Platform epoch in Unix milliseconds
pub const TWITTER_EPOCH_MS: i64 = 1_288_834_974_657;

/// Decode the creation time of a tweet from its status ID.
///
/// Returns `None` for empty or non-numeric IDs.
pub fn snowflake_to_time(tweet_id: &str) -> Option<DateTime<Utc>> {
    let id: u64 = tweet_id.trim().parse().ok()?;
    let timestamp_ms = (id >> 22) as i64 + TWITTER_EPOCH_MS;
    DateTime::from_timestamp_millis(timestamp_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decodes_known_id() {
        // 1212092628029698048 >> 22 == 288985402114
        let dt = snowflake_to_time("1212092628029698048").unwrap();
        assert_eq!(dt.timestamp_millis(), 288_985_402_114 + TWITTER_EPOCH_MS);
        let expected = Utc.with_ymd_and_hms(2019, 12, 31, 19, 26, 16).unwrap()
            + chrono::Duration::milliseconds(771);
        assert_eq!(dt, expected);
    }

    #[test]
    fn test_zero_is_epoch() {
        let dt = snowflake_to_time("0").unwrap();
        assert_eq!(dt.timestamp_millis(), TWITTER_EPOCH_MS);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(snowflake_to_time("").is_none());
        assert!(snowflake_to_time("abc").is_none());
        assert!(snowflake_to_time("-5").is_none());
    }

    #[test]
    fn test_ids_are_ordered_in_time() {
        let older = snowflake_to_time("2023880206721970544").unwrap();
        let newer = snowflake_to_time("2024727442427171118").unwrap();
        assert!(older < newer);
    }
}
