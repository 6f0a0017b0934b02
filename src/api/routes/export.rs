//! Export Routes
//!
//! Data export endpoint for backup and analysis.
//!
//! - GET /api/export - Stored tweets as JSON or CSV

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;
use std::sync::{Arc, OnceLock};

use crate::api::dto::ExportParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::collector::snowflake_to_time;
use crate::storage::TweetRecord;

/// GET /api/export
///
/// Export stored tweets, optionally only those published since a given
/// time. Tweets without a usable status ID are skipped when `since` is set.
pub async fn export_tweets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::ServiceUnavailable(
            "Export feature is disabled".to_string(),
        ));
    }

    let format = ExportFormat::parse(&params.format)?;
    let since = params
        .since
        .as_deref()
        .map(|s| parse_since(s, Utc::now()))
        .transpose()?;

    let tweets: Vec<TweetRecord> = state
        .store
        .tweets()
        .await
        .into_iter()
        .filter(|tweet| match since {
            Some(since) => snowflake_to_time(&tweet.tweet_id).is_some_and(|t| t >= since),
            None => true,
        })
        .collect();

    tracing::debug!(count = tweets.len(), format = ?format, "Exporting tweets");

    let body = match format {
        ExportFormat::Json => format_json(&tweets)?,
        ExportFormat::Csv => format_csv(&tweets)?,
    };

    let filename = format!(
        "tweets_export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    fn parse(s: &str) -> ApiResult<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(ApiError::Validation(format!(
                "Unsupported export format: {}",
                other
            ))),
        }
    }

    fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Parse `now`, `now-<n><h|d|w|m>`, RFC 3339 or `YYYY-MM-DD`
fn parse_since(s: &str, now: DateTime<Utc>) -> ApiResult<DateTime<Utc>> {
    static RELATIVE_RE: OnceLock<Regex> = OnceLock::new();

    if s.starts_with("now") {
        if s == "now" {
            return Ok(now);
        }

        let re = RELATIVE_RE
            .get_or_init(|| Regex::new(r"^now-(\d+)([hdwm])$").expect("relative time regex"));

        if let Some(caps) = re.captures(s) {
            let amount: i64 = caps[1]
                .parse()
                .map_err(|_| ApiError::Validation("Invalid number".to_string()))?;

            let span = match &caps[2] {
                "h" => Duration::try_hours(amount),
                "d" => Duration::try_days(amount),
                "w" => Duration::try_weeks(amount),
                "m" => amount.checked_mul(30).and_then(Duration::try_days),
                _ => return Err(ApiError::Validation("Invalid time unit".to_string())),
            };

            return span
                .and_then(|span| now.checked_sub_signed(span))
                .ok_or_else(|| ApiError::Validation(format!("Time out of range: {}", s)));
        }

        return Err(ApiError::Validation(format!("Cannot parse time: {}", s)));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Some(dt) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(dt.and_utc());
    }

    Err(ApiError::Validation(format!("Cannot parse timestamp: {}", s)))
}

fn format_json(tweets: &[TweetRecord]) -> ApiResult<String> {
    serde_json::to_string_pretty(tweets).map_err(|e| ApiError::Internal(e.to_string()))
}

fn format_csv(tweets: &[TweetRecord]) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for tweet in tweets {
        writer
            .serialize(tweet)
            .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 23, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_since_relative() {
        let now = fixed_now();
        assert_eq!(parse_since("now", now).unwrap(), now);
        assert_eq!(parse_since("now-7d", now).unwrap(), now - Duration::days(7));
        assert_eq!(parse_since("now-3h", now).unwrap(), now - Duration::hours(3));
        assert_eq!(parse_since("now-2w", now).unwrap(), now - Duration::days(14));
        assert!(parse_since("now-7y", now).is_err());
    }

    #[test]
    fn test_parse_since_out_of_range() {
        let now = fixed_now();
        for since in [
            "now-999999999999d",
            "now-999999999999999h",
            "now-99999999999999w",
            "now-9223372036854775807m",
            "now-99999999999999999999d",
        ] {
            assert!(
                matches!(parse_since(since, now), Err(ApiError::Validation(_))),
                "{} should be rejected",
                since
            );
        }
        assert_eq!(parse_since("now-1m", now).unwrap(), now - Duration::days(30));
    }

    #[test]
    fn test_parse_since_absolute() {
        let now = fixed_now();
        assert_eq!(
            parse_since("2026-02-20", now).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_since("2026-02-20T08:00:00+08:00", now).unwrap(),
            Utc.with_ymd_and_hms(2026, 2, 20, 0, 0, 0).unwrap()
        );
        assert!(parse_since("last tuesday", now).is_err());
    }

    #[test]
    fn test_export_format() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("json").unwrap().content_type(), "application/json");
        assert!(ExportFormat::parse("ndjson").is_err());
    }

    #[test]
    fn test_format_csv() {
        let tweets = vec![TweetRecord {
            tweet_id: "1".into(),
            content: "hello, \"world\"".into(),
            link: "https://xcancel.com/elonmusk/status/1#m".into(),
            date: Some("2026-02-23".into()),
            hour: Some(9),
            ..Default::default()
        }];

        let csv = format_csv(&tweets).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "tweet_id,content,link,full_time,date,hour,week,month,fetched_at"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,\"hello, \"\"world\"\"\",https://xcancel.com/elonmusk/status/1#m,,2026-02-23,9,,,"
        );
    }
}
