// Dashboard domain model - one refresh worth of derived views
use super::facility::{
    FacilitySummary, compare_drop_rate_desc, group_by_facility, latest_per_facility,
};
use super::observation::{AttractionLog, FacilityId, PassStatus};
use super::series::{NormalizedSeries, normalize};
use super::trend::trailing_drop_rate;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct ParkSnapshot {
    pub code: String,
    pub label: String,
    pub summaries: Vec<FacilitySummary>,
    pub series: BTreeMap<FacilityId, NormalizedSeries>,
}

impl ParkSnapshot {
    /// Normalize every facility's series, estimate its trend and join the
    /// latest row with its short name. Works purely on the fetched batch.
    pub fn build(
        code: String,
        label: String,
        logs: &[AttractionLog],
        short_names: &HashMap<FacilityId, String>,
        display_date: NaiveDate,
    ) -> Self {
        let series: BTreeMap<FacilityId, NormalizedSeries> = group_by_facility(logs)
            .into_iter()
            .map(|(id, observations)| {
                let normalized = normalize(&observations, display_date);
                (id, normalized)
            })
            .collect();

        let summaries = latest_per_facility(logs)
            .into_iter()
            .map(|(id, latest)| FacilitySummary {
                park: code.clone(),
                latest: latest.clone(),
                short_name: short_names.get(&id).cloned(),
                drop_rate: series.get(&id).and_then(trailing_drop_rate),
            })
            .collect();

        Self {
            code,
            label,
            summaries,
            series,
        }
    }

    pub fn summary(&self, id: &FacilityId) -> Option<&FacilitySummary> {
        self.summaries.iter().find(|s| s.facility_id() == id)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub display_date: NaiveDate,
    pub parks: Vec<ParkSnapshot>,
}

impl DashboardSnapshot {
    pub fn new(generated_at: DateTime<Utc>, display_date: NaiveDate, parks: Vec<ParkSnapshot>) -> Self {
        Self {
            generated_at,
            display_date,
            parks,
        }
    }

    pub fn park(&self, code: &str) -> Option<&ParkSnapshot> {
        self.parks.iter().find(|p| p.code.eq_ignore_ascii_case(code))
    }

    pub fn all_summaries(&self) -> impl Iterator<Item = &FacilitySummary> {
        self.parks.iter().flat_map(|p| p.summaries.iter())
    }

    /// The facility's summary and normalized series, searched across parks
    pub fn facility(&self, id: &FacilityId) -> Option<(&FacilitySummary, &NormalizedSeries)> {
        self.parks
            .iter()
            .find_map(|p| Some((p.summary(id)?, p.series.get(id)?)))
    }

    pub fn facility_count(&self) -> usize {
        self.parks.iter().map(|p| p.summaries.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParkFacility {
    pub park: String,
    pub name: String,
}

/// Facilities currently selling DPA, issuing Priority Pass, or with the line cut
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub dpa_on_sale: Vec<ParkFacility>,
    pub priority_pass_issuing: Vec<ParkFacility>,
    pub line_cut: Vec<ParkFacility>,
}

impl PassSummary {
    pub fn collect<'a>(summaries: impl IntoIterator<Item = &'a FacilitySummary>) -> Self {
        let mut dpa = BTreeSet::new();
        let mut pp = BTreeSet::new();
        let mut line_cut = BTreeSet::new();

        for summary in summaries {
            let Some(name) = summary.latest.kana_name.as_deref().filter(|n| !n.is_empty()) else {
                continue;
            };
            let entry = || ParkFacility {
                park: summary.park.clone(),
                name: name.to_string(),
            };
            if summary.latest.dpa_status.is_on_sale() {
                dpa.insert(entry());
            }
            if summary.latest.pp_status.is_on_sale() {
                pp.insert(entry());
            }
            if summary.latest.is_line_cut() {
                line_cut.insert(entry());
            }
        }

        Self {
            dpa_on_sale: dpa.into_iter().collect(),
            priority_pass_issuing: pp.into_iter().collect(),
            line_cut: line_cut.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    pub max_wait_minutes: u32,
    pub min_drop_rate: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_wait_minutes: 40,
            min_drop_rate: 30.0,
        }
    }
}

/// Short waits that have fallen sharply over the last hour, biggest drop first
pub fn alerts<'a>(
    summaries: impl IntoIterator<Item = &'a FacilitySummary>,
    thresholds: AlertThresholds,
) -> Vec<&'a FacilitySummary> {
    let mut matched: Vec<&FacilitySummary> = summaries
        .into_iter()
        .filter(|s| {
            s.wait_minutes()
                .is_some_and(|wait| wait <= thresholds.max_wait_minutes)
                && s
                    .drop_rate
                    .is_some_and(|rate| rate >= thresholds.min_drop_rate)
        })
        .collect();
    matched.sort_by(|a, b| compare_drop_rate_desc(a.drop_rate, b.drop_rate));
    matched
}

/// One line of the all-facilities table
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityRow {
    pub facility_id: FacilityId,
    pub park: String,
    pub short_name: Option<String>,
    pub wait_minutes: Option<u32>,
    pub drop_rate: Option<f64>,
    pub dpa: Option<String>,
    pub priority_pass: Option<String>,
    pub operating_status: Option<String>,
    pub update_time: Option<String>,
}

impl FacilityRow {
    pub fn from_summary(summary: &FacilitySummary) -> Self {
        Self {
            facility_id: summary.facility_id().clone(),
            park: summary.park.clone(),
            short_name: summary.short_name.clone(),
            wait_minutes: summary.wait_minutes(),
            drop_rate: summary.drop_rate,
            dpa: pass_label(&summary.latest.dpa_status, "on sale"),
            priority_pass: pass_label(&summary.latest.pp_status, "issuing"),
            operating_status: summary.latest.operating_status.clone(),
            update_time: summary.latest.update_time.clone(),
        }
    }
}

fn pass_label(status: &PassStatus, active: &str) -> Option<String> {
    match status {
        PassStatus::OnSale => Some(active.to_string()),
        PassStatus::Ended => Some("ended".to_string()),
        PassStatus::Other(code) => Some(code.clone()),
        PassStatus::Absent => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::facility::fixtures::{log, summary};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    #[test]
    fn test_park_snapshot_build() {
        let logs = vec![
            log("1", 11, 0, Some(100)),
            log("1", 11, 30, Some(70)),
            log("1", 12, 0, Some(40)),
            log("2", 12, 0, Some(15)),
        ];
        let mut short_names = HashMap::new();
        short_names.insert(FacilityId::new("1"), "Soaring".to_string());

        let park = ParkSnapshot::build("TDS".into(), "Tokyo DisneySea".into(), &logs, &short_names, date());

        assert_eq!(park.summaries.len(), 2);
        let soaring = park.summary(&FacilityId::new("1")).unwrap();
        assert_eq!(soaring.short_name.as_deref(), Some("Soaring"));
        assert_eq!(soaring.wait_minutes(), Some(40));
        assert_eq!(soaring.drop_rate, Some(60.0));
        assert_eq!(soaring.park, "TDS");

        let other = park.summary(&FacilityId::new("2")).unwrap();
        assert_eq!(other.short_name, None);
        assert_eq!(other.drop_rate, None);

        // 11:00 -> 11:30 is a 30 minute gap, five synthetic points in between
        assert_eq!(park.series[&FacilityId::new("1")].len(), 3 + 5 + 5);
    }

    #[test]
    fn test_snapshot_lookup() {
        let logs = vec![log("7", 12, 0, Some(10))];
        let park = ParkSnapshot::build("TDL".into(), "Tokyo Disneyland".into(), &logs, &HashMap::new(), date());
        let snapshot = DashboardSnapshot::new(Utc::now(), date(), vec![park]);

        assert!(snapshot.park("tdl").is_some());
        assert!(snapshot.park("TDS").is_none());
        assert!(snapshot.facility(&FacilityId::new("7")).is_some());
        assert!(snapshot.facility(&FacilityId::new("8")).is_none());
        assert_eq!(snapshot.facility_count(), 1);
    }

    #[test]
    fn test_pass_summary() {
        let mut a = summary("TDS", "1", Some("A"), Some(10), None);
        a.latest.dpa_status = PassStatus::OnSale;
        a.latest.kana_name = Some("b-name".to_string());
        let mut b = summary("TDL", "2", Some("B"), Some(10), None);
        b.latest.dpa_status = PassStatus::OnSale;
        b.latest.pp_status = PassStatus::OnSale;
        b.latest.kana_name = Some("a-name".to_string());
        let mut c = summary("TDS", "3", Some("C"), Some(10), None);
        c.latest.operating_status_code = Some("045".to_string());
        c.latest.kana_name = Some("c-name".to_string());
        let mut d = summary("TDS", "4", Some("D"), Some(10), None);
        d.latest.dpa_status = PassStatus::OnSale;
        d.latest.kana_name = None;
        let duplicate = a.clone();

        let passes = PassSummary::collect(&[a, b, c, d, duplicate]);

        let names = |list: &[ParkFacility]| {
            list.iter()
                .map(|f| format!("{}:{}", f.park, f.name))
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&passes.dpa_on_sale), ["TDL:a-name", "TDS:b-name"]);
        assert_eq!(names(&passes.priority_pass_issuing), ["TDL:a-name"]);
        assert_eq!(names(&passes.line_cut), ["TDS:c-name"]);
    }

    #[test]
    fn test_alerts() {
        let summaries = vec![
            summary("TDS", "1", Some("A"), Some(35), Some(31.0)),
            summary("TDS", "2", Some("B"), Some(45), Some(60.0)),
            summary("TDS", "3", Some("C"), Some(20), Some(29.9)),
            summary("TDL", "4", Some("D"), Some(40), Some(50.0)),
            summary("TDL", "5", Some("E"), None, Some(80.0)),
            summary("TDL", "6", Some("F"), Some(10), None),
        ];
        let matched: Vec<_> = alerts(&summaries, AlertThresholds::default())
            .iter()
            .map(|s| s.facility_id().to_string())
            .collect();
        assert_eq!(matched, ["4", "1"]);
    }

    #[test]
    fn test_alerts_need_a_drop_rate() {
        let summaries = vec![
            summary("TDS", "1", Some("A"), Some(10), None),
            summary("TDS", "2", Some("B"), Some(10), Some(0.0)),
        ];
        let thresholds = AlertThresholds {
            max_wait_minutes: 40,
            min_drop_rate: 0.0,
        };
        let matched: Vec<_> = alerts(&summaries, thresholds)
            .iter()
            .map(|s| s.facility_id().to_string())
            .collect();
        assert_eq!(matched, ["2"]);
    }

    #[test]
    fn test_late_sample_shows_in_panel_but_not_in_trend() {
        let logs = vec![
            log("1", 20, 40, Some(60)),
            log("1", 21, 0, Some(30)),
            log("1", 21, 45, Some(5)),
        ];
        let park = ParkSnapshot::build("TDS".into(), "Tokyo DisneySea".into(), &logs, &HashMap::new(), date());

        let summary = park.summary(&FacilityId::new("1")).unwrap();
        assert_eq!(summary.wait_minutes(), Some(5));
        // 20:40 (60) to the 21:30 carry of 30
        assert_eq!(summary.drop_rate, Some(50.0));
    }

    #[test]
    fn test_facility_row_labels() {
        let mut s = summary("TDS", "1", Some("A"), Some(35), Some(31.0));
        s.latest.dpa_status = PassStatus::OnSale;
        s.latest.pp_status = PassStatus::Ended;
        let row = FacilityRow::from_summary(&s);
        assert_eq!(row.dpa.as_deref(), Some("on sale"));
        assert_eq!(row.priority_pass.as_deref(), Some("ended"));
        assert_eq!(row.wait_minutes, Some(35));

        s.latest.pp_status = PassStatus::OnSale;
        assert_eq!(FacilityRow::from_summary(&s).priority_pass.as_deref(), Some("issuing"));
    }
}
