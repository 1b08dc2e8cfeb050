use crate::domain::dashboard::AlertThresholds;
use chrono::FixedOffset;
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "PARK_WAIT";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub parks: Vec<ParkConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendSettings {
    pub url: String,
    pub api_key: String,
    #[serde(default = "default_short_name_table")]
    pub short_name_table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Rows requested per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// One park tab and the log table backing it
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ParkConfig {
    pub code: String,
    pub label: String,
    pub table: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardSettings {
    pub listen_addr: String,
    /// Park-local time as a fixed offset from UTC
    pub utc_offset_hours: i32,
    pub auto_refresh: bool,
    pub refresh_interval_secs: u64,
    pub short_name_ttl_secs: u64,
    pub alert_max_wait_minutes: u32,
    pub alert_min_drop_rate: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            utc_offset_hours: 9,
            auto_refresh: true,
            refresh_interval_secs: 300,
            short_name_ttl_secs: 86_400,
            alert_max_wait_minutes: 40,
            alert_min_drop_rate: 30.0,
        }
    }
}

impl DashboardSettings {
    pub fn utc_offset(&self) -> anyhow::Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("utc_offset_hours out of range: {}", self.utc_offset_hours))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn short_name_ttl(&self) -> Duration {
        Duration::from_secs(self.short_name_ttl_secs)
    }

    pub fn alert_thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            max_wait_minutes: self.alert_max_wait_minutes,
            min_drop_rate: self.alert_min_drop_rate,
        }
    }
}

fn default_short_name_table() -> String {
    "attraction_short_name".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> usize {
    1000
}

/// `config/backend` overlaid with `PARK_WAIT__BACKEND__*` variables, so the
/// API key can come from the environment.
pub fn load_backend_config() -> anyhow::Result<BackendConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/backend"))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?;

    let backend: BackendConfig = settings.try_deserialize()?;
    if backend.parks.is_empty() {
        anyhow::bail!("config/backend lists no parks");
    }
    Ok(backend)
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
