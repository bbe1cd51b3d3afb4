//! Hazard Engine Driver

use crate::{
    AlertEvent, AlertNotice, EngineConfig, EngineError, EngineSnapshot, NearestHazard,
    SampleOutcome,
};
use alerting::{AlertDebouncer, AlertTransition};
use hazard_model::{Hazard, HazardSet};
use metrics::{counter, gauge, histogram};
use proximity::{evaluate, PositionSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Mutable per-session state, guarded by one lock so samples are
/// processed strictly one at a time
struct MonitorState {
    debouncer: AlertDebouncer,
    nearest: Option<NearestHazard>,
    last_sample: Option<PositionSample>,
}

/// Geofence engine for one monitoring session.
///
/// Shareable across threads (`Arc<HazardEngine>`): sample processing is
/// serialized internally, the hazard set is swapped whole, and readers get
/// snapshots rather than references.
pub struct HazardEngine {
    /// Configuration
    config: EngineConfig,
    /// Installed hazard set, replaced atomically on reload
    hazards: RwLock<Arc<HazardSet>>,
    /// Alert and diagnostics state
    monitor: Mutex<MonitorState>,
    /// Whether samples are accepted
    running: AtomicBool,
    /// Alert event feed
    events: broadcast::Sender<AlertEvent>,
    /// Latest snapshot for diagnostics readers
    snapshots: watch::Sender<EngineSnapshot>,
}

impl HazardEngine {
    /// Create a running engine with an empty hazard set
    pub fn new(config: EngineConfig) -> Self {
        info!("Creating hazard engine with config: {:?}", config);
        let (events, _) = broadcast::channel(config.event_capacity());
        let (snapshots, _) = watch::channel(EngineSnapshot {
            running: true,
            ..Default::default()
        });

        Self {
            monitor: Mutex::new(MonitorState {
                debouncer: AlertDebouncer::new(config.alerting.clone()),
                nearest: None,
                last_sample: None,
            }),
            hazards: RwLock::new(Arc::new(HazardSet::empty())),
            running: AtomicBool::new(true),
            events,
            snapshots,
            config,
        }
    }

    /// Validate and install a new hazard set.
    ///
    /// On error the previously installed set stays in place. Alert state
    /// carries over, so cooldowns survive a reload.
    pub fn load_hazards(&self, hazards: Vec<Hazard>) -> Result<usize, EngineError> {
        let set = HazardSet::new(hazards).map_err(|e| {
            warn!("Rejected hazard set: {}", e);
            counter!("geofence_hazard_loads_rejected_total").increment(1);
            e
        })?;

        let count = set.len();
        let (points, lines) = set.counts();
        {
            let mut installed = self.hazards.write().map_err(|_| EngineError::LockPoisoned)?;
            *installed = Arc::new(set);
        }

        gauge!("geofence_hazards_loaded").set(count as f64);
        info!("Installed {} hazards ({} points, {} lines)", count, points, lines);

        let monitor = self.lock_monitor()?;
        self.publish(&monitor);
        Ok(count)
    }

    /// Process one position sample
    pub fn submit_sample(&self, sample: PositionSample) -> Result<SampleOutcome, EngineError> {
        if !self.is_running() {
            counter!("geofence_samples_rejected_total").increment(1);
            return Err(EngineError::Stopped);
        }
        if !sample.coordinate.is_valid() {
            counter!("geofence_samples_rejected_total").increment(1);
            return Err(EngineError::InvalidSample(format!(
                "coordinate ({}, {}) out of range",
                sample.coordinate.latitude, sample.coordinate.longitude
            )));
        }

        let mut monitor = self.lock_monitor()?;
        // stop() may have landed while waiting for the lock
        if !self.is_running() {
            counter!("geofence_samples_rejected_total").increment(1);
            return Err(EngineError::Stopped);
        }
        let hazards = self.hazard_set()?;
        let started = Instant::now();

        let evaluation = evaluate(&hazards, &sample, &self.config.evaluator);
        let primary = evaluation.primary();
        let transitions = monitor
            .debouncer
            .update(primary.map(|p| p.hazard.id()), sample.timestamp_ms);

        let events: Vec<AlertEvent> = transitions
            .into_iter()
            .filter_map(|transition| match transition {
                AlertTransition::Fired(id) => primary
                    .filter(|p| p.hazard.id() == id)
                    .map(|p| AlertEvent::Fired(AlertNotice::new(p, sample.timestamp_ms))),
                AlertTransition::Cleared(hazard_id) => Some(AlertEvent::Cleared {
                    hazard_id,
                    timestamp_ms: sample.timestamp_ms,
                }),
            })
            .collect();

        let outcome = SampleOutcome {
            nearest: evaluation.nearest.map(NearestHazard::from),
            primary: primary.map(NearestHazard::from),
            candidate_count: evaluation.candidates.len(),
            events,
        };

        histogram!("geofence_evaluation_seconds").record(started.elapsed().as_secs_f64());
        counter!("geofence_samples_total").increment(1);

        monitor.nearest = outcome.nearest.clone();
        monitor.last_sample = Some(sample);

        if let Some(nearest) = &outcome.nearest {
            debug!("Nearest hazard: {} at {:.0} m", nearest.hazard_id, nearest.distance_m);
        } else if hazards.is_empty() {
            debug!("No hazards loaded");
        }

        for event in &outcome.events {
            match event {
                AlertEvent::Fired(_) => counter!("geofence_alerts_fired_total").increment(1),
                AlertEvent::Cleared { .. } => {
                    counter!("geofence_alerts_cleared_total").increment(1)
                }
            }
            // No subscribers is fine
            let _ = self.events.send(event.clone());
        }
        self.publish(&monitor);

        Ok(outcome)
    }

    /// Current state
    pub fn current_state(&self) -> Result<EngineSnapshot, EngineError> {
        let monitor = self.lock_monitor()?;
        self.snapshot(&monitor)
    }

    /// Stop accepting samples. Active alerts are left untouched.
    pub fn stop(&self) {
        info!("Stopping hazard monitoring");
        self.running.store(false, Ordering::Release);
        if let Ok(monitor) = self.monitor.lock() {
            self.publish(&monitor);
        }
    }

    /// Accept samples again after [`HazardEngine::stop`]
    pub fn resume(&self) {
        info!("Resuming hazard monitoring");
        self.running.store(true, Ordering::Release);
        if let Ok(monitor) = self.monitor.lock() {
            self.publish(&monitor);
        }
    }

    /// Clear all alert state and cooldowns without emitting events
    pub fn reset(&self) -> Result<(), EngineError> {
        let mut monitor = self.lock_monitor()?;
        monitor.debouncer.reset();
        monitor.nearest = None;
        monitor.last_sample = None;
        info!("Alert state reset");
        self.publish(&monitor);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of installed hazards
    pub fn hazard_count(&self) -> Result<usize, EngineError> {
        Ok(self.hazard_set()?.len())
    }

    /// Feed of fired/cleared events
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<AlertEvent> {
        self.events.subscribe()
    }

    /// Snapshot published after every state change
    pub fn subscribe_snapshots(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn hazard_set(&self) -> Result<Arc<HazardSet>, EngineError> {
        self.hazards
            .read()
            .map(|set| Arc::clone(&set))
            .map_err(|_| EngineError::LockPoisoned)
    }

    fn lock_monitor(&self) -> Result<MutexGuard<'_, MonitorState>, EngineError> {
        self.monitor.lock().map_err(|_| EngineError::LockPoisoned)
    }

    fn snapshot(&self, monitor: &MonitorState) -> Result<EngineSnapshot, EngineError> {
        Ok(EngineSnapshot {
            running: self.is_running(),
            hazard_count: self.hazard_set()?.len(),
            nearest: monitor.nearest.clone(),
            active_alerts: monitor
                .debouncer
                .active()
                .into_iter()
                .map(str::to_string)
                .collect(),
            last_sample: monitor.last_sample,
        })
    }

    fn publish(&self, monitor: &MonitorState) {
        match self.snapshot(monitor) {
            Ok(snapshot) => {
                self.snapshots.send_replace(snapshot);
            }
            Err(e) => warn!("Snapshot not published: {}", e),
        }
    }
}

impl Default for HazardEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertConfig;
    use geodesy::Coordinate;
    use hazard_model::{HazardKind, LineHazard, PointHazard};

    const SECOND: u64 = 1_000;

    fn camera() -> Hazard {
        PointHazard {
            id: "C1".to_string(),
            location: Coordinate::new(22.2820, 114.1580),
            road_bearing: 90.0,
            speed_limit: Some(50.0),
            remarks: "Des Voeux Road Central EB".to_string(),
        }
        .into()
    }

    fn stretch(vertices: usize) -> Hazard {
        LineHazard {
            id: "L1".to_string(),
            vertices: (0..vertices)
                .map(|i| Coordinate::new(22.3000 + i as f64 * 0.001, 114.1700))
                .collect(),
            road_bearing: 0.0,
            speed_limit: Some(70.0),
            remarks: "Tolo Highway".to_string(),
        }
        .into()
    }

    fn approaching(t: u64) -> PositionSample {
        PositionSample::new(Coordinate::new(22.2820, 114.1570), t)
            .with_heading(90.0)
            .with_speed(10.0)
    }

    fn engine_with(hazards: Vec<Hazard>) -> HazardEngine {
        let engine = HazardEngine::default();
        engine.load_hazards(hazards).unwrap();
        engine
    }

    #[test]
    fn test_scenario_fire_suppress_clear() {
        let engine = engine_with(vec![camera()]);

        let first = engine.submit_sample(approaching(0)).unwrap();
        assert_eq!(first.events.len(), 1);
        let AlertEvent::Fired(notice) = &first.events[0] else {
            panic!("expected fired event");
        };
        assert_eq!(notice.hazard_id, "C1");
        assert_eq!(notice.kind, HazardKind::Point);
        assert!((notice.distance_m - 103.0).abs() < 1.0);
        assert_eq!(notice.speed_limit, Some(50.0));
        assert_eq!(notice.remarks, "Des Voeux Road Central EB");

        // Same position 5 s later: still active, nothing new
        let second = engine.submit_sample(approaching(5 * SECOND)).unwrap();
        assert!(second.events.is_empty());
        assert_eq!(engine.current_state().unwrap().active_alerts, ["C1"]);

        // 35 s later, past the camera and moving away
        let away = PositionSample::new(Coordinate::new(22.2820, 114.1610), 35 * SECOND)
            .with_heading(90.0);
        let third = engine.submit_sample(away).unwrap();
        assert_eq!(
            third.events,
            vec![AlertEvent::Cleared {
                hazard_id: "C1".to_string(),
                timestamp_ms: 35 * SECOND
            }]
        );
        assert!(third.primary.is_none());
        assert!(third.nearest.unwrap().distance_m > 200.0);

        // Cooldown has run out since the alert at t=0, so a new pass fires again
        let again = engine.submit_sample(approaching(40 * SECOND)).unwrap();
        assert!(again.events[0].is_fired());
    }

    #[test]
    fn test_cooldown_single_fire() {
        let engine = engine_with(vec![camera()]);
        let mut fired = 0;
        for t in [0, 2, 4, 6] {
            let outcome = engine.submit_sample(approaching(t * SECOND)).unwrap();
            fired += outcome.events.iter().filter(|e| e.is_fired()).count();
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_reentry_within_cooldown_does_not_refire() {
        let engine = engine_with(vec![camera()]);
        engine.submit_sample(approaching(0)).unwrap();

        let far = PositionSample::new(Coordinate::new(22.2820, 114.1540), 3 * SECOND)
            .with_heading(90.0);
        let cleared = engine.submit_sample(far).unwrap();
        assert_eq!(cleared.events.len(), 1);

        let back = engine.submit_sample(approaching(6 * SECOND)).unwrap();
        assert!(back.events.is_empty());
        assert!(engine.current_state().unwrap().active_alerts.is_empty());
    }

    #[test]
    fn test_fail_open_line_fail_closed_point() {
        let engine = engine_with(vec![camera(), stretch(2)]);

        let no_heading_near_point = PositionSample::new(Coordinate::new(22.2820, 114.1570), 0);
        let outcome = engine.submit_sample(no_heading_near_point).unwrap();
        assert_eq!(outcome.candidate_count, 0);
        assert!(outcome.events.is_empty());

        let no_heading_near_line = PositionSample::new(Coordinate::new(22.3000, 114.1702), SECOND);
        let outcome = engine.submit_sample(no_heading_near_line).unwrap();
        assert_eq!(outcome.candidate_count, 1);
        assert_eq!(outcome.primary.unwrap().hazard_id, "L1");
        assert!(outcome.events[0].is_fired());
    }

    #[test]
    fn test_validation_rejection_keeps_previous_set() {
        let engine = engine_with(vec![camera()]);

        let err = engine.load_hazards(vec![stretch(1)]).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(engine.hazard_count().unwrap(), 1);

        let outcome = engine.submit_sample(approaching(0)).unwrap();
        assert_eq!(outcome.primary.unwrap().hazard_id, "C1");
    }

    #[test]
    fn test_empty_set_reports_nothing() {
        let engine = HazardEngine::default();
        let outcome = engine.submit_sample(approaching(0)).unwrap();
        assert!(outcome.nearest.is_none());
        assert!(outcome.events.is_empty());
        assert_eq!(engine.current_state().unwrap().hazard_count, 0);
    }

    #[test]
    fn test_stop_rejects_samples_and_keeps_alerts() {
        let engine = engine_with(vec![camera()]);
        engine.submit_sample(approaching(0)).unwrap();

        engine.stop();
        assert!(matches!(
            engine.submit_sample(approaching(SECOND)),
            Err(EngineError::Stopped)
        ));
        let state = engine.current_state().unwrap();
        assert!(!state.running);
        assert_eq!(state.active_alerts, ["C1"]);

        engine.resume();
        assert!(engine.submit_sample(approaching(2 * SECOND)).is_ok());
    }

    #[test]
    fn test_reset_clears_silently() {
        let engine = engine_with(vec![camera()]);
        let mut alerts = engine.subscribe_alerts();
        engine.submit_sample(approaching(0)).unwrap();
        assert!(alerts.try_recv().unwrap().is_fired());

        engine.reset().unwrap();
        assert!(alerts.try_recv().is_err());

        let state = engine.current_state().unwrap();
        assert!(state.active_alerts.is_empty());
        assert!(state.nearest.is_none());
        assert!(state.last_sample.is_none());

        // Cooldown cleared as well
        let outcome = engine.submit_sample(approaching(SECOND)).unwrap();
        assert!(outcome.events[0].is_fired());
    }

    #[test]
    fn test_invalid_sample_rejected() {
        let engine = engine_with(vec![camera()]);
        let bad = PositionSample::new(Coordinate::new(f64::NAN, 114.157), 0);
        assert!(matches!(
            engine.submit_sample(bad),
            Err(EngineError::InvalidSample(_))
        ));
    }

    #[test]
    fn test_custom_cooldown() {
        let engine = HazardEngine::new(EngineConfig {
            alerting: AlertConfig { cooldown_seconds: 5 },
            ..Default::default()
        });
        engine.load_hazards(vec![camera()]).unwrap();
        engine.submit_sample(approaching(0)).unwrap();

        let away =
            PositionSample::new(Coordinate::new(22.2820, 114.1540), SECOND).with_heading(90.0);
        engine.submit_sample(away).unwrap();

        let outcome = engine.submit_sample(approaching(6 * SECOND)).unwrap();
        assert!(outcome.events[0].is_fired());
    }

    #[test]
    fn test_sample_waiting_on_lock_rejected_after_stop() {
        let engine = engine_with(vec![camera()]);

        std::thread::scope(|scope| {
            let guard = engine.lock_monitor().unwrap();
            let pending = scope.spawn(|| engine.submit_sample(approaching(0)));
            std::thread::sleep(std::time::Duration::from_millis(50));

            // Same order as stop(): flag first, then the lock
            engine.running.store(false, Ordering::Release);
            drop(guard);

            assert!(matches!(pending.join().unwrap(), Err(EngineError::Stopped)));
        });

        let state = engine.current_state().unwrap();
        assert!(state.last_sample.is_none());
        assert!(state.active_alerts.is_empty());
    }

    #[tokio::test]
    async fn test_snapshot_feed() {
        let engine = Arc::new(engine_with(vec![camera()]));
        let mut snapshots = engine.subscribe_snapshots();

        let producer = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || producer.submit_sample(approaching(0)))
            .await
            .unwrap()
            .unwrap();

        snapshots.changed().await.unwrap();
        let snapshot = snapshots.borrow_and_update().clone();
        assert_eq!(snapshot.hazard_count, 1);
        assert_eq!(snapshot.active_alerts, ["C1"]);
        assert_eq!(snapshot.nearest.unwrap().hazard_id, "C1");
    }

    #[tokio::test]
    async fn test_alert_feed_order() {
        let engine = engine_with(vec![camera()]);
        let mut alerts = engine.subscribe_alerts();

        engine.submit_sample(approaching(0)).unwrap();
        engine
            .submit_sample(PositionSample::new(Coordinate::new(22.29, 114.2), SECOND))
            .unwrap();

        assert!(alerts.recv().await.unwrap().is_fired());
        let cleared = alerts.recv().await.unwrap();
        assert_eq!(cleared.hazard_id(), "C1");
        assert!(!cleared.is_fired());
    }

    #[test]
    fn test_event_serialization() {
        let event = AlertEvent::Cleared {
            hazard_id: "C1".to_string(),
            timestamp_ms: 42,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "cleared");
        assert_eq!(json["hazard_id"], "C1");
    }
}
