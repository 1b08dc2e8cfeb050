// Domain layer - wait-time series, trends and dashboard views
pub mod chart;
pub mod dashboard;
pub mod facility;
pub mod observation;
pub mod series;
pub mod time_window;
pub mod trend;
