// Dashboard service - Use cases reading the latest snapshot
use crate::application::refresh_service::{RefreshService, SnapshotReceiver};
use crate::domain::chart::ChartModel;
use crate::domain::dashboard::{AlertThresholds, DashboardSnapshot, FacilityRow, PassSummary, alerts};
use crate::domain::facility::{FacilitySummary, SortOrder, park_listing};
use crate::domain::observation::FacilityId;
use crate::domain::series::NormalizedSeries;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("wait times have not been loaded yet")]
    NotReady,
    #[error("unknown park '{0}'")]
    UnknownPark(String),
    #[error("unknown facility '{0}'")]
    UnknownFacility(String),
}

#[derive(Debug, Clone)]
pub struct ParkListing {
    pub code: String,
    pub label: String,
    pub order: SortOrder,
    pub facilities: Vec<FacilitySummary>,
}

/// Every view of the page, taken from a single snapshot
#[derive(Debug, Clone)]
pub struct Overview {
    pub snapshot: Arc<DashboardSnapshot>,
    pub listings: Vec<ParkListing>,
    pub passes: PassSummary,
    pub alerts: Vec<FacilitySummary>,
    pub table: Vec<FacilityRow>,
}

#[derive(Debug, Clone)]
pub struct FacilityDetail {
    pub summary: FacilitySummary,
    pub series: NormalizedSeries,
    pub chart: Option<ChartModel>,
}

#[derive(Clone)]
pub struct DashboardService {
    refresh: Arc<RefreshService>,
    thresholds: AlertThresholds,
}

impl DashboardService {
    pub fn new(refresh: Arc<RefreshService>, thresholds: AlertThresholds) -> Self {
        Self { refresh, thresholds }
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    pub fn snapshot(&self) -> Result<Arc<DashboardSnapshot>, DashboardError> {
        self.refresh.current().ok_or(DashboardError::NotReady)
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.refresh.subscribe()
    }

    pub async fn refresh(&self) -> anyhow::Result<Arc<DashboardSnapshot>> {
        self.refresh.refresh().await
    }

    pub fn overview(&self, order: SortOrder) -> Result<Overview, DashboardError> {
        let snapshot = self.snapshot()?;
        let listings = snapshot
            .parks
            .iter()
            .map(|park| listing_of(&snapshot, &park.code, order))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Overview {
            listings,
            passes: PassSummary::collect(snapshot.all_summaries()),
            alerts: self.alerts_of(&snapshot),
            table: table_of(&snapshot),
            snapshot,
        })
    }

    pub fn park_listing(&self, code: &str, order: SortOrder) -> Result<ParkListing, DashboardError> {
        let snapshot = self.snapshot()?;
        listing_of(&snapshot, code, order)
    }

    pub fn pass_summary(&self) -> Result<PassSummary, DashboardError> {
        let snapshot = self.snapshot()?;
        Ok(PassSummary::collect(snapshot.all_summaries()))
    }

    pub fn alerts(&self) -> Result<Vec<FacilitySummary>, DashboardError> {
        let snapshot = self.snapshot()?;
        Ok(self.alerts_of(&snapshot))
    }

    pub fn facility_table(&self) -> Result<Vec<FacilityRow>, DashboardError> {
        let snapshot = self.snapshot()?;
        Ok(table_of(&snapshot))
    }

    fn alerts_of(&self, snapshot: &DashboardSnapshot) -> Vec<FacilitySummary> {
        alerts(snapshot.all_summaries(), self.thresholds)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn facility_detail(&self, id: &str) -> Result<FacilityDetail, DashboardError> {
        let snapshot = self.snapshot()?;
        let (summary, series) = snapshot
            .facility(&FacilityId::new(id))
            .ok_or_else(|| DashboardError::UnknownFacility(id.to_string()))?;

        Ok(FacilityDetail {
            summary: summary.clone(),
            series: series.clone(),
            chart: ChartModel::from_series(series),
        })
    }
}

fn listing_of(
    snapshot: &DashboardSnapshot,
    code: &str,
    order: SortOrder,
) -> Result<ParkListing, DashboardError> {
    let park = snapshot
        .park(code)
        .ok_or_else(|| DashboardError::UnknownPark(code.to_string()))?;

    Ok(ParkListing {
        code: park.code.clone(),
        label: park.label.clone(),
        order,
        facilities: park_listing(&park.summaries, order)
            .into_iter()
            .cloned()
            .collect(),
    })
}

fn table_of(snapshot: &DashboardSnapshot) -> Vec<FacilityRow> {
    snapshot.all_summaries().map(FacilityRow::from_summary).collect()
}
