// Application layer - use cases over the repository and snapshots
pub mod dashboard_service;
pub mod refresh_service;
pub mod wait_time_repository;
