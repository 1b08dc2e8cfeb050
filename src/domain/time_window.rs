// Time window constants shared by the series normalizer and the trend estimator
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Spacing of synthetic points inserted into gaps
pub const STEP_MINUTES: i64 = 5;

/// Gaps up to this length are plotted as-is
pub const GAP_THRESHOLD_MINUTES: i64 = 10;

/// Length of the trailing window used for the drop rate
pub const TRAILING_WINDOW_MINUTES: i64 = 60;

const OPENS_AT: (u32, u32) = (8, 30);
const CLOSES_AT: (u32, u32) = (21, 30);

/// Inclusive wall-clock range shown on the dashboard for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DisplayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            start: date.and_time(hm(OPENS_AT)),
            end: date.and_time(hm(CLOSES_AT)),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}

/// `[latest - 60min, latest]`, inclusive on both ends.
pub fn trailing_window(latest: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    (latest - Duration::minutes(TRAILING_WINDOW_MINUTES), latest)
}

fn hm((hour, minute): (u32, u32)) -> NaiveTime {
    // Constants above are valid clock times
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
