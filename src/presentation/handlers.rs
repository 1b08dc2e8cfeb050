// HTTP request handlers
use crate::application::dashboard_service::DashboardError;
use crate::domain::dashboard::DashboardSnapshot;
use crate::domain::facility::SortOrder;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::chart_svg::{render_chart_svg, render_empty_svg};
use crate::presentation::error::ApiError;
use crate::presentation::html::{DashboardPage, render_dashboard, render_not_ready};
use crate::presentation::json_mapper::{
    alerts_to_dto, detail_to_dto, listing_to_dto, passes_to_dto, row_to_dto, snapshot_meta,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct SortQuery {
    pub sort: Option<String>,
}

impl SortQuery {
    fn order(&self) -> Result<SortOrder, ApiError> {
        Ok(self
            .sort
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()?
            .unwrap_or_default())
    }
}

async fn respond_json<T: Serialize>(data: &T, headers: &HeaderMap) -> Result<Response, ApiError> {
    json_response(data, accepts_brotli(headers))
        .await
        .map_err(ApiError::Encoding)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Full dashboard page: park tabs, pass status, alerts and the facility table
pub async fn dashboard_page(
    Query(query): Query<SortQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let order = query.order()?;
    let overview = match state.dashboard_service.overview(order) {
        Ok(overview) => overview,
        Err(DashboardError::NotReady) => {
            return Ok((StatusCode::SERVICE_UNAVAILABLE, Html(render_not_ready())).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let html = render_dashboard(&DashboardPage {
        snapshot: &overview.snapshot,
        listings: &overview.listings,
        passes: &overview.passes,
        alerts: &overview.alerts,
        table: &overview.table,
        thresholds: state.dashboard_service.thresholds(),
        order,
        refresh_interval_secs: state.refresh_interval_secs,
    });
    Ok(Html(html).into_response())
}

/// Facilities of one park, sorted
pub async fn park_listing(
    Path(code): Path<String>,
    Query(query): Query<SortQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let listing = state.dashboard_service.park_listing(&code, query.order()?)?;
    respond_json(&listing_to_dto(&listing), &headers).await
}

pub async fn pass_summary(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let passes = state.dashboard_service.pass_summary()?;
    respond_json(&passes_to_dto(&passes), &headers).await
}

pub async fn alerts(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let service = &state.dashboard_service;
    let alerts = service.alerts()?;
    respond_json(&alerts_to_dto(&alerts, service.thresholds()), &headers).await
}

pub async fn facility_table(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let rows: Vec<_> = state
        .dashboard_service
        .facility_table()?
        .into_iter()
        .map(row_to_dto)
        .collect();
    respond_json(&rows, &headers).await
}

/// Normalized series, drop rate and chart model for one facility
pub async fn facility_series(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let detail = state.dashboard_service.facility_detail(&id)?;
    respond_json(&detail_to_dto(&detail), &headers).await
}

pub async fn facility_chart(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let detail = state.dashboard_service.facility_detail(&id)?;
    let title = detail
        .summary
        .short_name
        .clone()
        .unwrap_or_else(|| id.clone());

    let svg = match &detail.chart {
        Some(chart) => render_chart_svg(chart, &title),
        None => render_empty_svg(&title),
    };
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg,
    )
        .into_response())
}

/// Manual refresh trigger
pub async fn refresh(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let snapshot = state
        .dashboard_service
        .refresh()
        .await
        .map_err(ApiError::Refresh)?;
    respond_json(&snapshot_meta(&snapshot), &headers).await
}

/// One NDJSON line per published snapshot, starting with the current one
pub async fn stream_updates(State(state): State<Arc<AppState>>) -> Response {
    let rx = state.dashboard_service.subscribe();
    stream_from_watch(rx, |snapshot: &Option<Arc<DashboardSnapshot>>| {
        snapshot.as_deref().map(snapshot_meta)
    })
}
