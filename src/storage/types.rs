//! Core data types for the tweet store
//!
//! This module defines the documents persisted on disk and served to the
//! dashboard:
//! - `TweetRecord`: one collected tweet in `all_tweets.json`
//! - `StatsSnapshot`: the aggregated statistics in `stats.json`
//! - `DailyRecord`, `WeeklyRecord`, `MonthlyRecord`: per-period aggregates
//!
//! Every field of the snapshot is read leniently: missing or `null` values
//! fall back to their defaults so that a partially written or hand-edited
//! document still renders.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::collector::snowflake::snowflake_to_time;
use crate::storage::error::PayloadError;

/// Date key format used throughout the snapshot
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Week key format (`2026-W08`, Monday-based week of year)
pub const WEEK_FORMAT: &str = "%Y-W%W";
/// Month key format
pub const MONTH_FORMAT: &str = "%Y-%m";
/// Local timestamp format for stored times (no offset suffix)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A tweet as returned by a collector source, before it is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedTweet {
    /// Status ID extracted from the tweet link, if any
    pub tweet_id: Option<String>,
    /// Tweet text
    pub content: String,
    /// Absolute link to the tweet
    pub link: String,
}

/// A collected tweet, persisted in `all_tweets.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TweetRecord {
    pub tweet_id: String,
    pub content: String,
    pub link: String,
    /// Publication time derived from the snowflake ID
    pub full_time: Option<String>,
    pub date: Option<String>,
    pub hour: Option<u32>,
    pub week: Option<String>,
    pub month: Option<String>,
    pub fetched_at: String,
}

impl TweetRecord {
    /// Build a record from a scraped tweet, deriving its time fields from the
    /// snowflake ID in the given offset.
    pub fn from_scraped(
        tweet: ScrapedTweet,
        fetched_at: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        let tweet_id = tweet.tweet_id.unwrap_or_default();
        let published = snowflake_to_time(&tweet_id).map(|dt| dt.with_timezone(&offset));

        Self {
            content: tweet.content,
            link: tweet.link,
            full_time: published.map(|dt| dt.format(TIMESTAMP_FORMAT).to_string()),
            date: published.map(|dt| dt.format(DATE_FORMAT).to_string()),
            hour: published.map(|dt| chrono::Timelike::hour(&dt)),
            week: published.map(|dt| dt.format(WEEK_FORMAT).to_string()),
            month: published.map(|dt| dt.format(MONTH_FORMAT).to_string()),
            fetched_at: fetched_at
                .with_timezone(&offset)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            tweet_id,
        }
    }
}

/// A raw tweet entry inside a daily record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TweetEntry {
    /// Local ISO-8601 timestamp, e.g. `2026-02-23T14:05:03`
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
}

/// Per-date aggregate: `{count, hourly, tweets}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    /// Hour of day ("0".."23") to tweet count
    #[serde(default, deserialize_with = "lenient_counts")]
    pub hourly: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub tweets: Vec<TweetEntry>,
}

impl DailyRecord {
    /// Aggregate the given tweets (all from the same date) into a daily record.
    ///
    /// Entry content is cut to `preview_chars` characters. The hourly map
    /// always carries all 24 hours.
    pub fn from_tweets<'a>(
        tweets: impl IntoIterator<Item = &'a TweetRecord>,
        preview_chars: usize,
    ) -> Self {
        let mut record = DailyRecord {
            hourly: (0..24).map(|h| (h.to_string(), 0)).collect(),
            ..Default::default()
        };

        for tweet in tweets {
            record.count += 1;
            record.tweets.push(TweetEntry {
                time: tweet.full_time.clone(),
                content: tweet.content.chars().take(preview_chars).collect(),
            });
            if let Some(hour) = tweet.hour.filter(|h| *h < 24) {
                *record.hourly.entry(hour.to_string()).or_insert(0) += 1;
            }
        }

        record
    }
}

/// Per-week aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeeklyRecord {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
    #[serde(default, deserialize_with = "lenient_counts")]
    pub daily_breakdown: BTreeMap<String, u64>,
}

/// Per-month aggregate
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRecord {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: u64,
}

/// The statistics document served at `GET /api`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsSnapshot {
    #[serde(default, deserialize_with = "lenient_records")]
    pub daily: BTreeMap<String, DailyRecord>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub weekly: BTreeMap<String, WeeklyRecord>,
    #[serde(default, deserialize_with = "lenient_records")]
    pub monthly: BTreeMap<String, MonthlyRecord>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_tweets: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub new_today: u64,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub last_updated: Option<String>,
}

impl StatsSnapshot {
    /// Parse a statistics payload.
    ///
    /// Only the top level is strict: the text must be JSON and the value an
    /// object. Everything below it is read with defaults.
    pub fn parse(text: &str) -> Result<Self, PayloadError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| PayloadError::NotJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Interpret an already decoded JSON value as a snapshot
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        match value {
            Value::Object(_) => serde_json::from_value(value)
                .map_err(|e| PayloadError::NotJson(e.to_string())),
            other => Err(PayloadError::NotAnObject(json_kind(&other))),
        }
    }

    /// The most recent date key, if any
    pub fn latest_date(&self) -> Option<&str> {
        self.daily.keys().next_back().map(String::as_str)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read a count from any JSON value: non-negative integers as-is, floats
/// truncated, numeric strings parsed, everything else 0.
pub(crate) fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(count_from_value).unwrap_or(0))
}

fn lenient_counts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), count_from_value(v)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_records<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter(|(_, v)| v.is_object())
            .filter_map(|(k, v)| serde_json::from_value(v).ok().map(|record| (k, record)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

fn lenient_entries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<TweetEntry>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_full_payload() {
        let text = r#"{
            "daily": {
                "2026-02-23": {
                    "count": 2,
                    "hourly": {"9": 1, "14": 1},
                    "tweets": [
                        {"time": "2026-02-23T09:12:44", "content": "first"},
                        {"time": "2026-02-23T14:01:02", "content": "second"}
                    ]
                }
            },
            "total_tweets": 120,
            "last_updated": "2026-02-23T15:00:00.123456"
        }"#;

        let snapshot = StatsSnapshot::parse(text).unwrap();
        assert_eq!(snapshot.total_tweets, 120);
        let day = &snapshot.daily["2026-02-23"];
        assert_eq!(day.count, 2);
        assert_eq!(day.hourly["14"], 1);
        assert_eq!(day.tweets[1].content, "second");
        assert_eq!(
            snapshot.last_updated.as_deref(),
            Some("2026-02-23T15:00:00.123456")
        );
    }

    #[test]
    fn test_parse_missing_and_null_fields() {
        let snapshot = StatsSnapshot::parse(r#"{"daily": null, "last_updated": null}"#).unwrap();
        assert!(snapshot.daily.is_empty());
        assert_eq!(snapshot.total_tweets, 0);
        assert_eq!(snapshot.last_updated, None);

        let snapshot = StatsSnapshot::parse("{}").unwrap();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_parse_malformed_inner_values() {
        let text = r#"{
            "daily": {
                "2026-02-20": {"count": -3, "hourly": "oops", "tweets": [1, {"time": 5}]},
                "2026-02-21": {"count": 4.9, "hourly": {"3": "2", "4": null}},
                "2026-02-22": 17
            },
            "total_tweets": "41"
        }"#;

        let snapshot = StatsSnapshot::parse(text).unwrap();
        assert_eq!(snapshot.total_tweets, 41);
        assert_eq!(snapshot.daily.len(), 2);

        let first = &snapshot.daily["2026-02-20"];
        assert_eq!(first.count, 0);
        assert!(first.hourly.is_empty());
        assert_eq!(first.tweets.len(), 1);
        assert_eq!(first.tweets[0].time, None);
        assert_eq!(first.tweets[0].content, "");

        let second = &snapshot.daily["2026-02-21"];
        assert_eq!(second.count, 4);
        assert_eq!(second.hourly["3"], 2);
        assert_eq!(second.hourly["4"], 0);
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            StatsSnapshot::parse("[1, 2]"),
            Err(PayloadError::NotAnObject("array"))
        ));
        assert!(matches!(
            StatsSnapshot::parse("not json"),
            Err(PayloadError::NotJson(_))
        ));
    }

    #[test]
    fn test_latest_date() {
        let mut snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.latest_date(), None);

        snapshot.daily.insert("2026-02-23".into(), DailyRecord::default());
        snapshot.daily.insert("2026-02-01".into(), DailyRecord::default());
        assert_eq!(snapshot.latest_date(), Some("2026-02-23"));
    }

    #[test]
    fn test_record_from_scraped() {
        let tweet = ScrapedTweet {
            tweet_id: Some("2024727442427171118".into()),
            content: "hello".into(),
            link: "https://xcancel.com/elonmusk/status/2024727442427171118#m".into(),
        };
        let fetched = Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();

        let record = TweetRecord::from_scraped(tweet, fetched, offset);
        let published = snowflake_to_time("2024727442427171118")
            .unwrap()
            .with_timezone(&offset);

        assert_eq!(record.tweet_id, "2024727442427171118");
        assert_eq!(record.date, Some(published.format(DATE_FORMAT).to_string()));
        assert_eq!(record.hour, Some(chrono::Timelike::hour(&published)));
        assert_eq!(record.fetched_at, "2026-02-20T20:00:00");
    }

    #[test]
    fn test_record_without_id_has_no_time() {
        let tweet = ScrapedTweet {
            tweet_id: None,
            content: "pinned".into(),
            link: String::new(),
        };
        let utc = FixedOffset::east_opt(0).unwrap();
        let record = TweetRecord::from_scraped(tweet, Utc::now(), utc);
        assert_eq!(record.tweet_id, "");
        assert_eq!(record.full_time, None);
        assert_eq!(record.hour, None);
    }

    #[test]
    fn test_daily_record_from_tweets() {
        let tweets = vec![
            TweetRecord {
                tweet_id: "1".into(),
                content: "x".repeat(80),
                full_time: Some("2026-02-23T09:00:00".into()),
                hour: Some(9),
                ..Default::default()
            },
            TweetRecord {
                tweet_id: "2".into(),
                content: "short".into(),
                full_time: Some("2026-02-23T09:30:00".into()),
                hour: Some(9),
                ..Default::default()
            },
        ];

        let record = DailyRecord::from_tweets(&tweets, 50);
        assert_eq!(record.count, 2);
        assert_eq!(record.hourly.len(), 24);
        assert_eq!(record.hourly["9"], 2);
        assert_eq!(record.hourly["10"], 0);
        assert_eq!(record.tweets[0].content.chars().count(), 50);
    }
}
