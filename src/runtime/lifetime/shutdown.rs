use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use crate::analytics::ClickRecorder;

/// 点击队列排空的最长等待时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Drain pending clicks once the HTTP server has stopped
pub async fn perform_shutdown_tasks(recorder: &ClickRecorder) {
    info!("Shutting down, draining click queue...");
    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), recorder.shutdown()).await {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Click queue drain timed out after {} seconds; pending clicks are lost",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }

    let dropped = recorder.dropped_count();
    if dropped > 0 {
        info!("{} clicks were dropped during this run", dropped);
    }
}
