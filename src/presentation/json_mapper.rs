// Mapper to convert domain models to JSON response types
use crate::application::dashboard_service::{FacilityDetail, ParkListing};
use crate::domain::chart::ChartModel;
use crate::domain::dashboard::{
    AlertThresholds, DashboardSnapshot, FacilityRow, ParkFacility, PassSummary,
};
use crate::domain::facility::{FacilitySummary, format_drop_rate};
use crate::domain::observation::PassStatus;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FacilityDto {
    pub facility_id: String,
    pub park: String,
    pub label: String,
    pub short_name: Option<String>,
    pub kana_name: Option<String>,
    pub wait_minutes: Option<u32>,
    pub drop_rate: Option<f64>,
    pub drop_rate_label: Option<String>,
    pub observed_at: NaiveDateTime,
    pub operating_status: Option<String>,
    pub operating_hours_from: Option<String>,
    pub operating_hours_to: Option<String>,
    pub update_time: Option<String>,
    pub dpa_status: Option<String>,
    pub pp_status: Option<String>,
    pub line_cut: bool,
}

#[derive(Debug, Serialize)]
pub struct ParkListingDto {
    pub code: String,
    pub label: String,
    pub sort: &'static str,
    pub facilities: Vec<FacilityDto>,
}

#[derive(Debug, Serialize)]
pub struct ParkFacilityDto {
    pub park: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PassSummaryDto {
    pub dpa_on_sale: Vec<ParkFacilityDto>,
    pub priority_pass_issuing: Vec<ParkFacilityDto>,
    pub line_cut: Vec<ParkFacilityDto>,
}

#[derive(Debug, Serialize)]
pub struct AlertsDto {
    pub max_wait_minutes: u32,
    pub min_drop_rate: f64,
    pub facilities: Vec<FacilityDto>,
}

#[derive(Debug, Serialize)]
pub struct FacilityRowDto {
    pub facility_id: String,
    pub park: String,
    pub short_name: Option<String>,
    pub wait_minutes: Option<u32>,
    pub drop_rate: Option<f64>,
    pub dpa: Option<String>,
    pub priority_pass: Option<String>,
    pub operating_status: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SeriesPointDto {
    pub at: NaiveDateTime,
    pub time: String,
    pub minutes: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ChartDto {
    pub x_min: NaiveDateTime,
    pub x_max: NaiveDateTime,
    pub y_ticks: Vec<u32>,
    pub points: Vec<SeriesPointDto>,
}

#[derive(Debug, Serialize)]
pub struct FacilitySeriesDto {
    pub facility: FacilityDto,
    pub display_date: NaiveDate,
    pub drop_rate: Option<f64>,
    pub chart: Option<ChartDto>,
}

#[derive(Debug, Serialize)]
pub struct ParkMetaDto {
    pub code: String,
    pub label: String,
    pub facilities: usize,
}

#[derive(Debug, Serialize)]
pub struct SnapshotMetaDto {
    pub generated_at: DateTime<Utc>,
    pub display_date: NaiveDate,
    pub facilities: usize,
    pub parks: Vec<ParkMetaDto>,
}

pub fn facility_to_dto(summary: &FacilitySummary) -> FacilityDto {
    let latest = &summary.latest;
    FacilityDto {
        facility_id: summary.facility_id().to_string(),
        park: summary.park.clone(),
        label: summary.panel_label(),
        short_name: summary.short_name.clone(),
        kana_name: latest.kana_name.clone(),
        wait_minutes: summary.wait_minutes(),
        drop_rate: summary.drop_rate,
        drop_rate_label: format_drop_rate(summary.drop_rate),
        observed_at: latest.observation.observed_at,
        operating_status: latest.operating_status.clone(),
        operating_hours_from: latest.operating_hours_from.clone(),
        operating_hours_to: latest.operating_hours_to.clone(),
        update_time: latest.update_time.clone(),
        dpa_status: pass_status_to_dto(&latest.dpa_status),
        pp_status: pass_status_to_dto(&latest.pp_status),
        line_cut: latest.is_line_cut(),
    }
}

fn pass_status_to_dto(status: &PassStatus) -> Option<String> {
    match status {
        PassStatus::OnSale => Some("on_sale".to_string()),
        PassStatus::Ended => Some("ended".to_string()),
        PassStatus::Other(code) => Some(code.clone()),
        PassStatus::Absent => None,
    }
}

pub fn listing_to_dto(listing: &ParkListing) -> ParkListingDto {
    ParkListingDto {
        code: listing.code.clone(),
        label: listing.label.clone(),
        sort: listing.order.as_str(),
        facilities: listing.facilities.iter().map(facility_to_dto).collect(),
    }
}

fn park_facilities_to_dto(list: &[ParkFacility]) -> Vec<ParkFacilityDto> {
    list.iter()
        .map(|f| ParkFacilityDto {
            park: f.park.clone(),
            name: f.name.clone(),
        })
        .collect()
}

pub fn passes_to_dto(passes: &PassSummary) -> PassSummaryDto {
    PassSummaryDto {
        dpa_on_sale: park_facilities_to_dto(&passes.dpa_on_sale),
        priority_pass_issuing: park_facilities_to_dto(&passes.priority_pass_issuing),
        line_cut: park_facilities_to_dto(&passes.line_cut),
    }
}

pub fn alerts_to_dto(alerts: &[FacilitySummary], thresholds: AlertThresholds) -> AlertsDto {
    AlertsDto {
        max_wait_minutes: thresholds.max_wait_minutes,
        min_drop_rate: thresholds.min_drop_rate,
        facilities: alerts.iter().map(facility_to_dto).collect(),
    }
}

pub fn row_to_dto(row: FacilityRow) -> FacilityRowDto {
    FacilityRowDto {
        facility_id: row.facility_id.to_string(),
        park: row.park,
        short_name: row.short_name,
        wait_minutes: row.wait_minutes,
        drop_rate: row.drop_rate,
        dpa: row.dpa,
        priority_pass: row.priority_pass,
        operating_status: row.operating_status,
        update_time: row.update_time,
    }
}

fn chart_to_dto(chart: &ChartModel) -> ChartDto {
    ChartDto {
        x_min: chart.x_min,
        x_max: chart.x_max,
        y_ticks: chart.y_ticks.clone(),
        points: chart
            .points
            .iter()
            .map(|p| SeriesPointDto {
                at: p.at,
                time: p.label.clone(),
                minutes: p.minutes,
            })
            .collect(),
    }
}

pub fn detail_to_dto(detail: &FacilityDetail) -> FacilitySeriesDto {
    FacilitySeriesDto {
        facility: facility_to_dto(&detail.summary),
        display_date: detail.series.display_date(),
        drop_rate: detail.summary.drop_rate,
        chart: detail.chart.as_ref().map(chart_to_dto),
    }
}

pub fn snapshot_meta(snapshot: &DashboardSnapshot) -> SnapshotMetaDto {
    SnapshotMetaDto {
        generated_at: snapshot.generated_at,
        display_date: snapshot.display_date,
        facilities: snapshot.facility_count(),
        parks: snapshot
            .parks
            .iter()
            .map(|p| ParkMetaDto {
                code: p.code.clone(),
                label: p.label.clone(),
                facilities: p.summaries.len(),
            })
            .collect(),
    }
}
