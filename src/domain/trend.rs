// Trend estimator - percentage drop over the trailing hour
use super::series::NormalizedSeries;
use super::time_window::trailing_window;

/// Percentage decrease between the first and last point of the hour ending at
/// the latest observation.
///
/// Positive values mean the wait got shorter, negative values mean it grew;
/// the sign is never clamped. Returns `None` when fewer than two points fall
/// in the window, when either endpoint has no wait time, or when the window
/// starts at zero and ends above zero. A window that is zero at both ends
/// reports `Some(0.0)`.
pub fn trailing_drop_rate(series: &NormalizedSeries) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }
    let points = series.points();
    let now = points.iter().map(|o| o.observed_at).max()?;
    let (from, to) = trailing_window(now);

    let mut in_window = points
        .iter()
        .filter(|o| o.observed_at >= from && o.observed_at <= to);
    let first = in_window.next()?;
    let last = in_window.last()?;

    drop_rate(first.wait_minutes?, last.wait_minutes?)
}

fn drop_rate(start: u32, end: u32) -> Option<f64> {
    match (start, end) {
        (0, 0) => Some(0.0),
        (0, _) => None,
        _ => {
            let start = f64::from(start);
            Some((start - f64::from(end)) * 100.0 / start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::{FacilityId, Observation};
    use crate::domain::series::normalize;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn series(points: &[(u32, u32, Option<u32>)]) -> NormalizedSeries {
        let observations: Vec<_> = points
            .iter()
            .map(|&(h, m, wait)| {
                Observation::new(
                    FacilityId::new("201"),
                    date().and_hms_opt(h, m, 0).unwrap(),
                    wait,
                )
            })
            .collect();
        normalize(&observations, date())
    }

    #[test]
    fn test_decrease() {
        let s = series(&[(12, 0, Some(100)), (12, 5, Some(70)), (12, 10, Some(40))]);
        assert_eq!(trailing_drop_rate(&s), Some(60.0));
    }

    #[test]
    fn test_increase_is_negative() {
        let s = series(&[(12, 0, Some(40)), (12, 10, Some(100))]);
        assert_eq!(trailing_drop_rate(&s), Some(-150.0));
    }

    #[test]
    fn test_fewer_than_two_points() {
        assert_eq!(trailing_drop_rate(&series(&[])), None);
        assert_eq!(trailing_drop_rate(&series(&[(12, 0, Some(50))])), None);
    }

    #[test]
    fn test_zero_start() {
        let s = series(&[(12, 0, Some(0)), (12, 5, Some(0))]);
        assert_eq!(trailing_drop_rate(&s), Some(0.0));

        let s = series(&[(12, 0, Some(0)), (12, 5, Some(20))]);
        assert_eq!(trailing_drop_rate(&s), None);
    }

    #[test]
    fn test_null_endpoints() {
        let s = series(&[(12, 0, None), (12, 5, Some(20))]);
        assert_eq!(trailing_drop_rate(&s), None);

        let s = series(&[(12, 0, Some(20)), (12, 5, None)]);
        assert_eq!(trailing_drop_rate(&s), None);
    }

    #[test]
    fn test_only_trailing_hour_counts() {
        // 10:00 is outside [11:05, 12:05]; the window starts at the 11:05 point
        let s = series(&[
            (10, 0, Some(90)),
            (11, 5, Some(50)),
            (11, 10, Some(50)),
            (12, 5, Some(25)),
        ]);
        assert_eq!(trailing_drop_rate(&s), Some(50.0));
    }

    #[test]
    fn test_window_start_is_inclusive() {
        let s = series(&[(11, 0, Some(80)), (11, 5, Some(60)), (12, 0, Some(20))]);
        assert_eq!(trailing_drop_rate(&s), Some(75.0));
    }

    #[test]
    fn test_samples_after_closing_are_ignored() {
        // 21:45 is clipped, the series ends with the 21:30 carry of 30
        let s = series(&[(20, 40, Some(60)), (21, 0, Some(30)), (21, 45, Some(5))]);
        assert_eq!(s.latest().unwrap().wait_minutes, Some(30));
        assert_eq!(trailing_drop_rate(&s), Some(50.0));
    }

    #[test]
    fn test_samples_before_opening_are_ignored() {
        let s = series(&[(8, 20, Some(5)), (8, 30, Some(40)), (9, 0, Some(20))]);
        assert_eq!(trailing_drop_rate(&s), Some(50.0));
    }

    #[test]
    fn test_synthetic_points_carry_start_value() {
        // the 10:30 sample is carried forward every 5 minutes through the gap
        let s = series(&[(10, 30, Some(60)), (11, 40, Some(30))]);
        assert_eq!(trailing_drop_rate(&s), Some(50.0));
    }
}
