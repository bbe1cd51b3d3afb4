//! Notification and diagnostics sinks
//!
//! Stand-ins for the device notification service and the debug display:
//! both subscribe to the engine and write to the log.

use geofence_engine::{AlertEvent, HazardEngine};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Log every fired/cleared alert until the engine goes away
pub fn spawn_notification_sink(engine: &Arc<HazardEngine>) -> JoinHandle<()> {
    let mut alerts = engine.subscribe_alerts();
    tokio::spawn(async move {
        loop {
            match alerts.recv().await {
                Ok(AlertEvent::Fired(notice)) => {
                    let limit = notice
                        .speed_limit
                        .map(|l| format!("{l:.0} km/h"))
                        .unwrap_or_else(|| "unknown".to_string());
                    info!(
                        target: "notification",
                        "Speed camera alert: {} ({:?}) in {:.0} m, limit {}. {}",
                        notice.hazard_id, notice.kind, notice.distance_m, limit, notice.remarks
                    );
                }
                Ok(AlertEvent::Cleared { hazard_id, .. }) => {
                    info!(target: "notification", "Camera alert cleared: {}", hazard_id);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification sink lagged, {} events dropped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Log the nearest hazard whenever the snapshot changes
pub fn spawn_diagnostics_sink(engine: &Arc<HazardEngine>) -> JoinHandle<()> {
    let mut snapshots = engine.subscribe_snapshots();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            match snapshot.nearest {
                Some(nearest) => debug!(
                    target: "diagnostics",
                    "Nearest camera: {} at {:.0} m ({} active alerts)",
                    nearest.hazard_id,
                    nearest.distance_m,
                    snapshot.active_alerts.len()
                ),
                None => debug!(
                    target: "diagnostics",
                    "No nearby cameras ({} loaded)",
                    snapshot.hazard_count
                ),
            }
        }
    })
}
