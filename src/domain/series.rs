// Series normalizer - gap filling and display-window clipping for one facility
use super::observation::Observation;
use super::time_window::{DisplayWindow, GAP_THRESHOLD_MINUTES, STEP_MINUTES};
use chrono::{Duration, NaiveDate};

/// A facility's observations with no gap wider than the threshold and every
/// point inside the display window of `display_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    display_date: NaiveDate,
    points: Vec<Observation>,
}

impl NormalizedSeries {
    pub fn empty(display_date: NaiveDate) -> Self {
        Self {
            display_date,
            points: Vec::new(),
        }
    }

    pub fn display_date(&self) -> NaiveDate {
        self.display_date
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.points.last()
    }
}

/// Sort, fill gaps wider than 10 minutes with 5-minute carry-forward points,
/// then clip to 08:30..=21:30 on `display_date`.
pub fn normalize(series: &[Observation], display_date: NaiveDate) -> NormalizedSeries {
    let mut sorted = series.to_vec();
    sorted.sort_by_key(|o| o.observed_at);

    let step = Duration::minutes(STEP_MINUTES);
    let threshold = Duration::minutes(GAP_THRESHOLD_MINUTES);

    let mut expanded = Vec::with_capacity(sorted.len());
    for pair in sorted.windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        expanded.push(current.clone());

        let gap = next.observed_at - current.observed_at;
        if gap > threshold {
            let steps = gap.num_seconds() / step.num_seconds();
            for j in 1..steps {
                let at = current.observed_at + Duration::minutes(STEP_MINUTES * j);
                expanded.push(current.carried_to(at));
            }
        }
    }
    if let Some(last) = sorted.last() {
        expanded.push(last.clone());
    }

    let window = DisplayWindow::for_date(display_date);
    expanded.retain(|o| window.contains(o.observed_at));

    NormalizedSeries {
        display_date,
        points: expanded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::observation::FacilityId;
    use chrono::NaiveDateTime;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        date().and_hms_opt(h, m, 0).unwrap()
    }

    fn obs(h: u32, m: u32, wait: Option<u32>) -> Observation {
        Observation::new(FacilityId::new("101"), at(h, m), wait)
    }

    #[test]
    fn test_empty_series() {
        let normalized = normalize(&[], date());
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_single_observation_inside_window() {
        let input = vec![obs(12, 0, Some(30))];
        let normalized = normalize(&input, date());
        assert_eq!(normalized.points(), input.as_slice());
    }

    #[test]
    fn test_single_observation_outside_window() {
        let normalized = normalize(&[obs(7, 0, Some(30))], date());
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let normalized = normalize(
            &[obs(12, 10, Some(20)), obs(12, 0, Some(30)), obs(12, 5, Some(25))],
            date(),
        );
        let times: Vec<_> = normalized.points().iter().map(|o| o.observed_at).collect();
        assert_eq!(times, vec![at(12, 0), at(12, 5), at(12, 10)]);
    }

    #[test]
    fn test_gap_at_threshold_not_filled() {
        let normalized = normalize(&[obs(12, 0, Some(30)), obs(12, 10, Some(40))], date());
        assert_eq!(normalized.len(), 2);
    }

    #[test]
    fn test_gap_filled_with_carry_forward() {
        // 32 minute gap -> floor(32 / 5) - 1 = 5 synthetic points
        let first = obs(12, 0, Some(30));
        let last = obs(12, 32, Some(60));
        let normalized = normalize(&[first.clone(), last.clone()], date());

        assert_eq!(normalized.len(), 7);
        assert_eq!(normalized.points()[0], first);
        assert_eq!(normalized.points()[6], last);

        let synthetic = &normalized.points()[1..6];
        for (j, point) in synthetic.iter().enumerate() {
            assert_eq!(point.observed_at, at(12, 5 * (j as u32 + 1)));
            assert_eq!(point.wait_minutes, Some(30));
            assert_eq!(point.facility_id, first.facility_id);
        }
    }

    #[test]
    fn test_null_wait_is_carried_forward() {
        let normalized = normalize(&[obs(12, 0, None), obs(12, 20, Some(10))], date());
        let waits: Vec<_> = normalized.points().iter().map(|o| o.wait_minutes).collect();
        assert_eq!(waits, vec![None, None, None, None, Some(10)]);
    }

    #[test]
    fn test_clipped_to_display_window() {
        let normalized = normalize(
            &[obs(8, 0, Some(5)), obs(9, 0, Some(15)), obs(21, 45, Some(10))],
            date(),
        );
        let window = DisplayWindow::for_date(date());
        assert!(normalized.points().iter().all(|o| window.contains(o.observed_at)));
        // carry-forward from 08:00 reaches into the window starting at 08:30
        assert_eq!(normalized.points()[0].observed_at, at(8, 30));
        assert_eq!(normalized.points()[0].wait_minutes, Some(5));
        // last kept point is the final synthetic one before close
        assert_eq!(normalized.latest().unwrap().observed_at, at(21, 30));
        assert!(
            normalized
                .points()
                .windows(2)
                .all(|w| w[0].observed_at <= w[1].observed_at)
        );
    }

    #[test]
    fn test_other_day_is_dropped() {
        let tomorrow = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap();
        let normalized = normalize(&[obs(12, 0, Some(30))], tomorrow);
        assert!(normalized.is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let input = vec![
            obs(9, 0, Some(10)),
            obs(9, 3, Some(15)),
            obs(9, 47, Some(45)),
            obs(11, 12, Some(50)),
            obs(11, 13, Some(55)),
        ];
        let once = normalize(&input, date());
        let twice = normalize(once.points(), date());
        assert_eq!(once, twice);
    }
}
