//! Overview view-model
//!
//! Projects a statistics snapshot into what the overview page draws: the
//! 14-day trend, today's hourly breakdown and the headline numbers.

use serde::Serialize;

use crate::storage::StatsSnapshot;

/// Number of days shown in the trend chart
pub const TREND_DAYS: usize = 14;

/// One point of the daily trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    /// Axis label, `MM-DD`
    pub name: String,
    /// Full date key
    pub date: String,
    pub count: u64,
}

/// One bar of the hourly chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyPoint {
    pub hour: u32,
    pub count: u64,
}

/// Everything the overview page renders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// Last 14 dates, oldest first
    pub daily: Vec<DailyPoint>,
    /// 24 slots for the latest date
    pub hourly: Vec<HourlyPoint>,
    pub total: u64,
    pub today: u64,
    pub days_recorded: usize,
    pub last_update: String,
    pub peak_day: Option<DailyPoint>,
    pub average_daily: f64,
}

impl DashboardView {
    pub fn from_snapshot(snapshot: &StatsSnapshot) -> Self {
        // BTreeMap keys are already in ascending date order
        let skip = snapshot.daily.len().saturating_sub(TREND_DAYS);
        let daily: Vec<DailyPoint> = snapshot
            .daily
            .iter()
            .skip(skip)
            .map(|(date, record)| DailyPoint {
                name: axis_label(date),
                date: date.clone(),
                count: record.count,
            })
            .collect();

        let latest = snapshot
            .latest_date()
            .and_then(|date| snapshot.daily.get(date));

        let mut hourly: Vec<HourlyPoint> =
            (0..24).map(|hour| HourlyPoint { hour, count: 0 }).collect();
        if let Some(record) = latest {
            for (key, count) in &record.hourly {
                let slot = key.trim().parse::<usize>().ok();
                if let Some(slot) = slot.and_then(|h| hourly.get_mut(h)) {
                    slot.count = *count;
                }
            }
        }

        // Earliest date wins a tie
        let peak_day = daily
            .iter()
            .fold(None::<&DailyPoint>, |best, point| match best {
                Some(b) if b.count >= point.count => Some(b),
                _ => Some(point),
            })
            .cloned();

        let average_daily = if daily.is_empty() {
            0.0
        } else {
            daily.iter().map(|p| p.count as f64).sum::<f64>() / daily.len() as f64
        };

        Self {
            days_recorded: daily.len(),
            daily,
            hourly,
            total: snapshot.total_tweets,
            today: latest.map(|r| r.count).unwrap_or(0),
            last_update: snapshot
                .last_updated
                .as_deref()
                .map(|s| s.chars().take(19).collect())
                .unwrap_or_else(|| "N/A".to_string()),
            peak_day,
            average_daily,
        }
    }

    /// Highest hourly count, at least 1 so it can scale a chart
    pub fn max_hourly(&self) -> u64 {
        self.hourly.iter().map(|h| h.count).max().unwrap_or(0).max(1)
    }

    /// Highest daily count, at least 1 so it can scale a chart
    pub fn max_daily(&self) -> u64 {
        self.daily.iter().map(|d| d.count).max().unwrap_or(0).max(1)
    }
}

/// `2026-02-23` → `02-23`
fn axis_label(date: &str) -> String {
    match date.get(5..) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => date.to_string(),
    }
}
