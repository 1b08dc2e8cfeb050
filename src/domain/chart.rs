// Line chart model for a normalized series
use super::series::NormalizedSeries;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub at: NaiveDateTime,
    pub label: String,
    pub minutes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub points: Vec<ChartPoint>,
    pub x_min: NaiveDateTime,
    pub x_max: NaiveDateTime,
    pub y_ticks: Vec<u32>,
}

impl ChartModel {
    /// `None` when there is nothing to plot
    pub fn from_series(series: &NormalizedSeries) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let first = series.points().first()?;
        let last = series.latest()?;

        let points = series
            .points()
            .iter()
            .map(|o| ChartPoint {
                at: o.observed_at,
                label: o.observed_at.format("%H:%M").to_string(),
                minutes: o.wait_minutes,
            })
            .collect();

        let max_minutes = series
            .points()
            .iter()
            .filter_map(|o| o.wait_minutes)
            .max()
            .unwrap_or(0);

        Some(Self {
            points,
            x_min: first.observed_at,
            x_max: last.observed_at,
            y_ticks: y_ticks(max_minutes),
        })
    }

    pub fn y_max(&self) -> u32 {
        self.y_ticks.last().copied().unwrap_or(0)
    }
}

/// Tick spacing is roughly a tenth of the peak, rounded to a multiple of 5
/// (half-even), never below 5.
pub fn tick_step(max_minutes: u32) -> u32 {
    let rounded = (f64::from(max_minutes) / 10.0 / 5.0).round_ties_even() as u32 * 5;
    rounded.max(5)
}

/// Ticks from 0 up to the first multiple of the step at or past `max + step`
pub fn y_ticks(max_minutes: u32) -> Vec<u32> {
    let step = tick_step(max_minutes);
    (0..max_minutes.saturating_add(step))
        .step_by(step as usize)
        .collect()
}
