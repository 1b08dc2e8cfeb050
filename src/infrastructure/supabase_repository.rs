// Supabase (PostgREST) repository implementation
use crate::application::wait_time_repository::WaitTimeRepository;
use crate::domain::observation::{AttractionLog, FacilityId, Observation, PassStatus};
use crate::infrastructure::config::BackendSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

const LOG_COLUMNS: &[&str] = &[
    "facilityid",
    "fetched_at",
    "standbytime",
    "facilitykananame",
    "operatingstatus",
    "operatinghoursfrom",
    "operatinghoursto",
    "updatetime",
    "dpastatuscd",
    "ppstatuscd",
    "operatingstatuscd",
];

/// Longer waits are treated as bad data
const MAX_WAIT_MINUTES: f64 = 24.0 * 60.0;

#[derive(Debug, Clone)]
pub struct SupabaseRepository {
    base_url: String,
    api_key: String,
    short_name_table: String,
    page_size: usize,
    utc_offset: FixedOffset,
    client: reqwest::Client,
}

/// Row shape of the park log tables. Loosely typed: the backend mixes
/// numbers and strings in several columns.
#[derive(Debug, Deserialize)]
struct AttractionLogRow {
    facilityid: Value,
    fetched_at: String,
    #[serde(default)]
    standbytime: Value,
    #[serde(default)]
    facilitykananame: Value,
    #[serde(default)]
    operatingstatus: Value,
    #[serde(default)]
    operatinghoursfrom: Value,
    #[serde(default)]
    operatinghoursto: Value,
    #[serde(default)]
    updatetime: Value,
    #[serde(default)]
    dpastatuscd: Value,
    #[serde(default)]
    ppstatuscd: Value,
    #[serde(default)]
    operatingstatuscd: Value,
}

#[derive(Debug, Deserialize)]
struct ShortNameRow {
    facilityid: Value,
    #[serde(default)]
    shortname: Value,
}

impl SupabaseRepository {
    pub fn new(settings: &BackendSettings, utc_offset: FixedOffset) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            short_name_table: settings.short_name_table.clone(),
            page_size: settings.page_size.max(1),
            utc_offset,
            client,
        })
    }

    fn build_table_url(&self, table: &str, params: &[(&str, String)]) -> String {
        let query: Vec<String> = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect();
        format!(
            "{}/rest/v1/{}?{}",
            self.base_url,
            urlencoding::encode(table),
            query.join("&")
        )
    }

    async fn execute_get<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend request failed with status {}: {}", status, body);
        }

        response
            .json::<Vec<T>>()
            .await
            .context("Failed to parse backend response")
    }

    /// Start of `display_date` in park-local time, as sent in the `gte.` filter
    fn day_start(&self, display_date: NaiveDate) -> Result<DateTime<FixedOffset>> {
        self.utc_offset
            .from_local_datetime(&display_date.and_time(NaiveTime::MIN))
            .single()
            .context("Ambiguous start of day")
    }
}

#[async_trait]
impl WaitTimeRepository for SupabaseRepository {
    async fn fetch_attraction_logs(
        &self,
        table: &str,
        display_date: NaiveDate,
    ) -> Result<Vec<AttractionLog>> {
        let since = self.day_start(display_date)?.to_rfc3339();
        let rows: Vec<AttractionLogRow> = fetch_all_pages(|offset| {
            let url = self.build_table_url(
                table,
                &[
                    ("select", LOG_COLUMNS.join(",")),
                    ("fetched_at", format!("gte.{}", since)),
                    ("order", "fetched_at.asc,facilityid.asc".to_string()),
                    ("limit", self.page_size.to_string()),
                    ("offset", offset.to_string()),
                ],
            );
            tracing::debug!("Fetching {} rows from offset {}", table, offset);
            async move { self.execute_get(&url).await }
        })
        .await?;

        let total = rows.len();
        let logs: Vec<AttractionLog> = rows
            .into_iter()
            .filter_map(|row| row_to_log(row, self.utc_offset))
            .collect();
        let skipped = total - logs.len();

        if skipped > 0 {
            tracing::warn!("Skipped {} rows of {} without facility id or timestamp", skipped, table);
        }
        Ok(logs)
    }

    async fn fetch_short_names(&self) -> Result<HashMap<FacilityId, String>> {
        let url = self.build_table_url(
            &self.short_name_table,
            &[("select", "facilityid,shortname".to_string())],
        );
        let rows: Vec<ShortNameRow> = self.execute_get(&url).await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = value_to_string(&row.facilityid)?;
                let name = value_to_string(&row.shortname)?;
                Some((FacilityId::new(id), name))
            })
            .collect())
    }
}

/// Request pages until one comes back empty. The backend's own row cap may
/// cut a page short of the requested limit.
async fn fetch_all_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut rows = Vec::new();
    loop {
        let page = fetch_page(rows.len()).await?;
        if page.is_empty() {
            return Ok(rows);
        }
        rows.extend(page);
    }
}

fn row_to_log(row: AttractionLogRow, utc_offset: FixedOffset) -> Option<AttractionLog> {
    let facility_id = FacilityId::new(value_to_string(&row.facilityid)?);
    let observed_at = parse_timestamp(&row.fetched_at, utc_offset)?;
    let wait_minutes = coerce_minutes(&row.standbytime);

    Some(AttractionLog {
        observation: Observation::new(facility_id, observed_at, wait_minutes),
        kana_name: value_to_string(&row.facilitykananame),
        operating_status: value_to_string(&row.operatingstatus),
        operating_hours_from: value_to_string(&row.operatinghoursfrom),
        operating_hours_to: value_to_string(&row.operatinghoursto),
        update_time: value_to_string(&row.updatetime),
        dpa_status: PassStatus::from_code(value_to_string(&row.dpastatuscd).as_deref()),
        pp_status: PassStatus::from_code(value_to_string(&row.ppstatuscd).as_deref()),
        operating_status_code: value_to_string(&row.operatingstatuscd),
    })
}

/// Non-empty text of a string or number cell
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Wait time in whole minutes; anything non-numeric, negative or longer
/// than a day becomes `None`
fn coerce_minutes(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (minutes.is_finite() && (0.0..=MAX_WAIT_MINUTES).contains(&minutes))
        .then(|| minutes.round() as u32)
}

/// Timestamps with an offset are converted to park-local time; naive ones
/// are taken as already local.
fn parse_timestamp(raw: &str, utc_offset: FixedOffset) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&utc_offset).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
