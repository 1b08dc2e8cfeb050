// Per-facility summaries shown in the park tabs
use super::observation::{AttractionLog, FacilityId, Observation};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Latest backend row for one facility, joined with its short name and trend.
#[derive(Debug, Clone, PartialEq)]
pub struct FacilitySummary {
    pub park: String,
    pub latest: AttractionLog,
    pub short_name: Option<String>,
    pub drop_rate: Option<f64>,
}

impl FacilitySummary {
    pub fn facility_id(&self) -> &FacilityId {
        self.latest.facility_id()
    }

    pub fn wait_minutes(&self) -> Option<u32> {
        self.latest.observation.wait_minutes
    }

    /// Panel heading, e.g. `35 min: Soaring (42.9% decrease)`
    pub fn panel_label(&self) -> String {
        let name = self.short_name.as_deref().unwrap_or(self.facility_id().as_str());
        let wait = self
            .wait_minutes()
            .map(|w| w.to_string())
            .unwrap_or_else(|| "-".to_string());
        match format_drop_rate(self.drop_rate) {
            Some(drop) => format!("{wait} min: {name} ({drop})"),
            None => format!("{wait} min: {name}"),
        }
    }
}

pub fn format_drop_rate(drop_rate: Option<f64>) -> Option<String> {
    drop_rate.map(|rate| format!("{rate:.1}% decrease"))
}

/// Newest row per facility. Rows sharing a timestamp resolve to the one seen last.
pub fn latest_per_facility(logs: &[AttractionLog]) -> BTreeMap<FacilityId, &AttractionLog> {
    let mut latest: BTreeMap<FacilityId, &AttractionLog> = BTreeMap::new();
    for log in logs {
        match latest.get(log.facility_id()) {
            Some(current)
                if current.observation.observed_at > log.observation.observed_at => {}
            _ => {
                latest.insert(log.facility_id().clone(), log);
            }
        }
    }
    latest
}

/// Split a batch of rows into one series per facility
pub fn group_by_facility(logs: &[AttractionLog]) -> BTreeMap<FacilityId, Vec<Observation>> {
    let mut grouped: BTreeMap<FacilityId, Vec<Observation>> = BTreeMap::new();
    for log in logs {
        grouped
            .entry(log.facility_id().clone())
            .or_default()
            .push(log.observation.clone());
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    LongestWait,
    ShortestWait,
    HighestDropRate,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sort order '{0}' (expected wait_desc, wait_asc or drop_rate)")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wait_desc" => Ok(SortOrder::LongestWait),
            "wait_asc" => Ok(SortOrder::ShortestWait),
            "drop_rate" => Ok(SortOrder::HighestDropRate),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::LongestWait => "wait_desc",
            SortOrder::ShortestWait => "wait_asc",
            SortOrder::HighestDropRate => "drop_rate",
        }
    }

    pub fn all() -> [SortOrder; 3] {
        [
            SortOrder::LongestWait,
            SortOrder::ShortestWait,
            SortOrder::HighestDropRate,
        ]
    }
}

/// Facilities listed in a park tab: only those with a short name and a wait
/// time, in the requested order.
pub fn park_listing(summaries: &[FacilitySummary], order: SortOrder) -> Vec<&FacilitySummary> {
    let mut listed: Vec<&FacilitySummary> = summaries
        .iter()
        .filter(|s| s.short_name.is_some() && s.wait_minutes().is_some())
        .collect();

    listed.sort_by(|a, b| {
        let primary = match order {
            SortOrder::LongestWait => b.wait_minutes().cmp(&a.wait_minutes()),
            SortOrder::ShortestWait => a.wait_minutes().cmp(&b.wait_minutes()),
            SortOrder::HighestDropRate => compare_drop_rate_desc(a.drop_rate, b.drop_rate),
        };
        primary
            .then_with(|| a.short_name.cmp(&b.short_name))
            .then_with(|| a.facility_id().cmp(b.facility_id()))
    });
    listed
}

/// Descending, with missing rates after every known one
pub fn compare_drop_rate_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::observation::PassStatus;
    use chrono::NaiveDate;

    pub fn log(id: &str, h: u32, m: u32, wait: Option<u32>) -> AttractionLog {
        AttractionLog {
            observation: Observation::new(
                FacilityId::new(id),
                NaiveDate::from_ymd_opt(2025, 7, 1)
                    .unwrap()
                    .and_hms_opt(h, m, 0)
                    .unwrap(),
                wait,
            ),
            kana_name: Some(format!("facility-{id}")),
            operating_status: Some("operating".to_string()),
            operating_hours_from: Some("09:00".to_string()),
            operating_hours_to: Some("21:00".to_string()),
            update_time: Some(format!("{h:02}:{m:02}")),
            dpa_status: PassStatus::Absent,
            pp_status: PassStatus::Absent,
            operating_status_code: None,
        }
    }

    pub fn summary(
        park: &str,
        id: &str,
        short_name: Option<&str>,
        wait: Option<u32>,
        drop_rate: Option<f64>,
    ) -> FacilitySummary {
        FacilitySummary {
            park: park.to_string(),
            latest: log(id, 12, 0, wait),
            short_name: short_name.map(str::to_string),
            drop_rate,
        }
    }
}
