//! Fire-and-forget click recording
//!
//! The redirect path calls [`ClickRecorder::record`], which only stamps the
//! click and pushes it onto a bounded queue. A single background worker
//! geolocates the client, builds the `ClickEvent` and appends it to the store
//! with retries. A full queue drops the click.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::AnalyticsConfig;
use crate::errors::LinktallyError;
use crate::services::geoip::GeoIpProvider;
use crate::storage::{ClickEvent, LinkStore};
use crate::utils::retry::{RetryPolicy, retry_with};

/// Request metadata captured at redirect time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visit {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderConfig {
    pub queue_capacity: usize,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self::from(&AnalyticsConfig::default())
    }
}

impl From<&AnalyticsConfig> for RecorderConfig {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity.max(1),
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
        }
    }
}

impl RecorderConfig {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay_ms: self.retry_base_delay_ms,
            max_delay_ms: self.retry_base_delay_ms.saturating_mul(20),
        }
    }
}

struct PendingClick {
    code: String,
    visit: Visit,
    at: DateTime<Utc>,
}

enum ClickJob {
    Record(PendingClick),
    /// Answered once every job queued before it has been handled
    Flush(oneshot::Sender<()>),
}

pub struct ClickRecorder {
    sender: RwLock<Option<mpsc::Sender<ClickJob>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    dropped: Arc<AtomicU64>,
}

impl ClickRecorder {
    /// Start the background worker; must be called inside a tokio runtime
    pub fn spawn(store: Arc<dyn LinkStore>, geoip: GeoIpProvider, config: RecorderConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let worker = ClickWorker {
            store,
            geoip,
            retry: config.retry_policy(),
        };
        let handle = tokio::spawn(worker.run(rx));

        info!(
            "Click recorder started (queue capacity {})",
            config.queue_capacity
        );
        Self {
            sender: RwLock::new(Some(tx)),
            worker: Mutex::new(Some(handle)),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Queue one click; never blocks and never fails the caller
    pub fn record(&self, code: &str, visit: Visit) {
        let click = PendingClick {
            code: code.to_string(),
            visit,
            at: Utc::now(),
        };

        let guard = self.sender.read();
        let Some(tx) = guard.as_ref() else {
            debug!("Click recorder stopped, dropping click for {}", code);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match tx.try_send(ClickJob::Record(click)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(
                    "Click queue full, dropping click for {} ({} dropped so far)",
                    code, dropped
                );
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Click worker gone, dropping click for {}", code);
            }
        }
    }

    /// Wait until every click queued before this call has been handled
    pub async fn flush(&self) {
        let Some(tx) = self.sender.read().clone() else {
            return;
        };
        let (done_tx, done_rx) = oneshot::channel();
        if tx.send(ClickJob::Flush(done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// Stop accepting clicks, drain the queue and wait for the worker
    pub async fn shutdown(&self) {
        drop(self.sender.write().take());
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Click worker terminated abnormally: {}", e);
            }
            info!("Click recorder stopped");
        }
    }

    /// Clicks lost to a full or closed queue
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

struct ClickWorker {
    store: Arc<dyn LinkStore>,
    geoip: GeoIpProvider,
    retry: RetryPolicy,
}

impl ClickWorker {
    async fn run(self, mut rx: mpsc::Receiver<ClickJob>) {
        while let Some(job) = rx.recv().await {
            match job {
                ClickJob::Record(click) => self.persist(click).await,
                ClickJob::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
        debug!("Click queue closed, worker exiting");
    }

    async fn persist(&self, click: PendingClick) {
        let location = self.geoip.resolve(click.visit.ip_address.as_deref()).await;
        let event = ClickEvent {
            timestamp: click.at,
            ip_address: click.visit.ip_address,
            country: Some(location.country),
            city: Some(location.city),
            user_agent: click.visit.user_agent,
            referer: click.visit.referer,
        };

        let op = format!("record_click({})", click.code);
        let store = &self.store;
        let code = click.code.as_str();
        let result = retry_with(&op, self.retry, LinktallyError::is_retryable, || {
            store.append_click(code, &event)
        })
        .await;

        match result {
            Ok(()) => debug!("Click recorded for {}", code),
            Err(LinktallyError::NotFound(_)) => {
                warn!("Dropping click for unknown code {}", code);
            }
            Err(e) => error!("Failed to record click for {}: {}", code, e),
        }
    }
}
