//! Analytics for the legacy records view
//!
//! The legacy page derives all of its numbers from the raw entries rather
//! than from the stored counts: an hour-of-day heatmap, a 14-day bar chart
//! and five summary figures.

use serde::Serialize;
use std::collections::BTreeMap;

use super::records::RawRecord;
use super::view::TREND_DAYS;

/// Bar height of the busiest day, in pixels
pub const BAR_MAX_HEIGHT_PX: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyAnalytics {
    pub hourly_counts: [u64; 24],
    /// `max(hourly_counts, 1)`
    pub max_hour: u64,
    /// Records per date, whole data set
    pub daily_counts: BTreeMap<String, u64>,
    /// Last 14 entries of `daily_counts`, oldest first
    pub recent_daily: Vec<(String, u64)>,
    /// `max(recent_daily, 1)`
    pub max_daily: u64,
    pub total: usize,
    pub days: usize,
    pub average_daily: f64,
    pub peak_hour: usize,
    pub peak_day: Option<(String, u64)>,
}

impl LegacyAnalytics {
    pub fn compute(records: &[RawRecord]) -> Self {
        let mut hourly_counts = [0u64; 24];
        let mut daily_counts: BTreeMap<String, u64> = BTreeMap::new();

        for record in records {
            if let Some(hour) = record.hour.filter(|h| *h < 24) {
                hourly_counts[hour as usize] += 1;
            }
            *daily_counts.entry(record.date.clone()).or_insert(0) += 1;
        }

        let max_hour = hourly_counts.iter().copied().max().unwrap_or(0).max(1);

        let skip = daily_counts.len().saturating_sub(TREND_DAYS);
        let recent_daily: Vec<(String, u64)> = daily_counts
            .iter()
            .skip(skip)
            .map(|(date, count)| (date.clone(), *count))
            .collect();
        let max_daily = recent_daily.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);

        let total = records.len();
        let days = daily_counts.len();
        let average_daily = total as f64 / days.max(1) as f64;

        // First hour holding the maximum
        let peak_hour = hourly_counts
            .iter()
            .enumerate()
            .fold((0, 0), |(best_h, best_c), (h, c)| {
                if *c > best_c {
                    (h, *c)
                } else {
                    (best_h, best_c)
                }
            })
            .0;

        let peak_day = recent_daily
            .iter()
            .fold(None::<&(String, u64)>, |best, day| match best {
                Some(b) if b.1 >= day.1 => Some(b),
                _ => Some(day),
            })
            .cloned();

        Self {
            hourly_counts,
            max_hour,
            daily_counts,
            recent_daily,
            max_daily,
            total,
            days,
            average_daily,
            peak_hour,
            peak_day,
        }
    }

    /// Intensity of an hour cell in `[0, 1]`
    pub fn intensity(&self, hour: usize) -> f64 {
        self.hourly_counts.get(hour).copied().unwrap_or(0) as f64 / self.max_hour as f64
    }

    /// Background alpha of an hour cell: `0.1 + 0.9 × intensity`
    pub fn heat_alpha(&self, hour: usize) -> f64 {
        0.1 + 0.9 * self.intensity(hour)
    }

    /// Pixel height of a day's bar
    pub fn bar_height(&self, count: u64) -> f64 {
        count as f64 / self.max_daily as f64 * BAR_MAX_HEIGHT_PX
    }

    /// Average per day with one decimal, as displayed
    pub fn average_display(&self) -> String {
        format!("{:.1}", self.average_daily)
    }
}
