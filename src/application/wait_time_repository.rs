// Repository trait for wait-time data access
use crate::domain::observation::{AttractionLog, FacilityId};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

#[async_trait]
pub trait WaitTimeRepository: Send + Sync {
    /// All rows of a park log table fetched on or after the start of `display_date`.
    /// One request per table; callers group by facility in memory.
    async fn fetch_attraction_logs(
        &self,
        table: &str,
        display_date: NaiveDate,
    ) -> anyhow::Result<Vec<AttractionLog>>;

    /// Display names keyed by facility id
    async fn fetch_short_names(&self) -> anyhow::Result<HashMap<FacilityId, String>>;
}
