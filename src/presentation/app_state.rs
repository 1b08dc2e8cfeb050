// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    /// Period the page's auto-refresh toggle reloads at
    pub refresh_interval_secs: u64,
}
