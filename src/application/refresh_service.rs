// Refresh service - batch fetch per park and publish immutable snapshots
use crate::application::wait_time_repository::WaitTimeRepository;
use crate::domain::dashboard::{DashboardSnapshot, ParkSnapshot};
use crate::domain::observation::FacilityId;
use crate::infrastructure::config::ParkConfig;
use anyhow::Context;
use chrono::{DateTime, FixedOffset, Utc};
use futures::future::try_join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

pub type SnapshotReceiver = watch::Receiver<Option<Arc<DashboardSnapshot>>>;

struct CachedShortNames {
    fetched_at: Instant,
    names: Arc<HashMap<FacilityId, String>>,
}

pub struct RefreshService {
    repository: Arc<dyn WaitTimeRepository>,
    parks: Vec<ParkConfig>,
    utc_offset: FixedOffset,
    short_name_ttl: Duration,
    // Held for the whole refresh so manual and timed refreshes never overlap
    short_names: Mutex<Option<CachedShortNames>>,
    sender: watch::Sender<Option<Arc<DashboardSnapshot>>>,
}

impl RefreshService {
    pub fn new(
        repository: Arc<dyn WaitTimeRepository>,
        parks: Vec<ParkConfig>,
        utc_offset: FixedOffset,
        short_name_ttl: Duration,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            repository,
            parks,
            utc_offset,
            short_name_ttl,
            short_names: Mutex::new(None),
            sender,
        }
    }

    pub fn subscribe(&self) -> SnapshotReceiver {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Option<Arc<DashboardSnapshot>> {
        self.sender.borrow().clone()
    }

    pub async fn refresh(&self) -> anyhow::Result<Arc<DashboardSnapshot>> {
        self.refresh_at(Utc::now()).await
    }

    /// Fetch every park table once, rebuild all views and publish them.
    /// On failure the previously published snapshot stays in place.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> anyhow::Result<Arc<DashboardSnapshot>> {
        let started = Instant::now();
        let mut cache = self.short_names.lock().await;

        let display_date = now.with_timezone(&self.utc_offset).date_naive();
        let short_names = self.resolve_short_names(&mut cache).await?;

        let fetches = self.parks.iter().map(|park| async move {
            let logs = self
                .repository
                .fetch_attraction_logs(&park.table, display_date)
                .await
                .with_context(|| format!("Failed to fetch {} ({})", park.code, park.table))?;
            tracing::debug!("Fetched {} rows for {}", logs.len(), park.code);
            anyhow::Ok((park, logs))
        });
        let fetched = try_join_all(fetches).await?;

        let parks = fetched
            .into_iter()
            .map(|(park, logs)| {
                ParkSnapshot::build(
                    park.code.clone(),
                    park.label.clone(),
                    &logs,
                    &short_names,
                    display_date,
                )
            })
            .collect();

        let snapshot = Arc::new(DashboardSnapshot::new(now, display_date, parks));
        self.sender.send_replace(Some(snapshot.clone()));

        tracing::info!(
            facilities = snapshot.facility_count(),
            display_date = %display_date,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dashboard snapshot refreshed"
        );
        Ok(snapshot)
    }

    async fn resolve_short_names(
        &self,
        cache: &mut Option<CachedShortNames>,
    ) -> anyhow::Result<Arc<HashMap<FacilityId, String>>> {
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed() < self.short_name_ttl {
                return Ok(cached.names.clone());
            }
        }

        match self.repository.fetch_short_names().await {
            Ok(names) => {
                let names = Arc::new(names);
                *cache = Some(CachedShortNames {
                    fetched_at: Instant::now(),
                    names: names.clone(),
                });
                Ok(names)
            }
            // Stale names beat an empty dashboard
            Err(e) => match cache.as_ref() {
                Some(cached) => {
                    tracing::warn!("Short name refresh failed, keeping cached names: {:#}", e);
                    Ok(cached.names.clone())
                }
                None => Err(e.context("Failed to fetch short names")),
            },
        }
    }

    /// Refresh on a fixed period. The first tick fires immediately.
    pub fn spawn_auto_refresh(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh().await {
                    tracing::error!("Scheduled refresh failed: {:#}", e);
                }
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::domain::observation::AttractionLog;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory repository serving fixed rows per table
    #[derive(Default)]
    pub struct FakeRepository {
        pub tables: HashMap<String, Vec<AttractionLog>>,
        pub short_names: HashMap<FacilityId, String>,
        pub fail: AtomicBool,
        pub fail_short_names: AtomicBool,
        pub log_requests: AtomicUsize,
        pub name_requests: AtomicUsize,
    }

    #[async_trait]
    impl WaitTimeRepository for FakeRepository {
        async fn fetch_attraction_logs(
            &self,
            table: &str,
            _display_date: NaiveDate,
        ) -> anyhow::Result<Vec<AttractionLog>> {
            self.log_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("backend unavailable");
            }
            Ok(self.tables.get(table).cloned().unwrap_or_default())
        }

        async fn fetch_short_names(&self) -> anyhow::Result<HashMap<FacilityId, String>> {
            self.name_requests.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) || self.fail_short_names.load(Ordering::SeqCst) {
                anyhow::bail!("backend unavailable");
            }
            Ok(self.short_names.clone())
        }
    }

    pub fn parks() -> Vec<ParkConfig> {
        vec![
            ParkConfig {
                code: "TDL".to_string(),
                label: "Tokyo Disneyland".to_string(),
                table: "tdl_attraction_log".to_string(),
            },
            ParkConfig {
                code: "TDS".to_string(),
                label: "Tokyo DisneySea".to_string(),
                table: "tds_attraction_log".to_string(),
            },
        ]
    }

    pub fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    /// 2025-07-01 12:30 in Tokyo
    pub fn noon() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-07-01T12:30:00+09:00")
            .unwrap()
            .with_timezone(&Utc)
    }
}
