//! Raw record flattening for the records table

use serde::Serialize;

use crate::storage::StatsSnapshot;

/// One row of the raw-record table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    pub date: String,
    /// Characters 11..19 of the entry time (`HH:MM:SS`, or shorter when the
    /// timestamp has no seconds); empty when the entry has no time
    pub time: String,
    pub hour: Option<u32>,
    pub content: String,
}

/// Flatten every tweet entry of every date, dates ascending, entries in
/// stored order.
pub fn flatten_records(snapshot: &StatsSnapshot) -> Vec<RawRecord> {
    snapshot
        .daily
        .iter()
        .flat_map(|(date, record)| {
            record.tweets.iter().map(move |entry| {
                let time = entry.time.as_deref().unwrap_or("");
                RawRecord {
                    date: date.clone(),
                    time: time.chars().skip(11).take(8).collect(),
                    hour: time
                        .get(11..13)
                        .and_then(|h| h.parse().ok())
                        .filter(|h| *h < 24),
                    content: entry.content.clone(),
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DailyRecord, TweetEntry};

    fn entry(time: Option<&str>, content: &str) -> TweetEntry {
        TweetEntry {
            time: time.map(str::to_string),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_flatten_orders_by_date() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.daily.insert(
            "2026-02-23".into(),
            DailyRecord {
                tweets: vec![entry(Some("2026-02-23T14:01:02"), "later day")],
                ..Default::default()
            },
        );
        snapshot.daily.insert(
            "2026-02-22".into(),
            DailyRecord {
                tweets: vec![
                    entry(Some("2026-02-22T09:12:44.123"), "first"),
                    entry(Some("2026-02-22T08:00:00"), "second"),
                ],
                ..Default::default()
            },
        );

        let records = flatten_records(&snapshot);
        let contents: Vec<&str> = records.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "later day"]);
        assert_eq!(records[0].date, "2026-02-22");
        assert_eq!(records[0].time, "09:12:44");
        assert_eq!(records[0].hour, Some(9));
    }

    #[test]
    fn test_flatten_handles_missing_times() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.daily.insert(
            "2026-02-22".into(),
            DailyRecord {
                tweets: vec![entry(None, "no time"), entry(Some("garbage"), "bad time")],
                ..Default::default()
            },
        );

        let records = flatten_records(&snapshot);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.time.is_empty() && r.hour.is_none()));
    }

    #[test]
    fn test_flatten_keeps_short_times() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.daily.insert(
            "2026-02-23".into(),
            DailyRecord {
                tweets: vec![entry(Some("2026-02-23T09:12"), "no seconds")],
                ..Default::default()
            },
        );

        let records = flatten_records(&snapshot);
        assert_eq!(records[0].time, "09:12");
        assert_eq!(records[0].hour, Some(9));
    }
}
