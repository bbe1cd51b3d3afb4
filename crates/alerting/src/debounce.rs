//! Alert Debounce State Machine

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum time between alerts, per hazard and globally (seconds)
    pub cooldown_seconds: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 30,
        }
    }
}

impl AlertConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_seconds)
    }
}

/// Debounce state of one hazard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    /// Sample time of the last fired alert
    pub last_fired_ms: Option<u64>,
    /// Whether the hazard is the currently alerted primary
    pub active: bool,
    /// Number of times fired this session
    pub fire_count: usize,
}

/// Change emitted by [`AlertDebouncer::update`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertTransition {
    Fired(String),
    Cleared(String),
}

/// Per-hazard Idle/Active tracking with cooldowns
pub struct AlertDebouncer {
    /// Configuration
    config: AlertConfig,
    /// Alert states by hazard id
    states: HashMap<String, AlertState>,
    /// Time of the last alert for any hazard
    global_last_fired_ms: Option<u64>,
}

impl AlertDebouncer {
    /// Create a new debouncer
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert debouncer with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            global_last_fired_ms: None,
        }
    }

    /// Advance the state machine with this sample's primary hazard.
    ///
    /// Clears come before fires in the returned list. A primary blocked by a
    /// cooldown stays idle and may fire on a later sample.
    pub fn update(&mut self, primary: Option<&str>, now_ms: u64) -> Vec<AlertTransition> {
        let mut transitions = Vec::new();
        let cooldown_ms = self.cooldown_ms();

        let mut cleared: Vec<String> = self
            .states
            .iter_mut()
            .filter(|(id, state)| state.active && Some(id.as_str()) != primary)
            .map(|(id, state)| {
                state.active = false;
                id.clone()
            })
            .collect();
        cleared.sort();
        for id in cleared {
            info!("Alert cleared: {}", id);
            transitions.push(AlertTransition::Cleared(id));
        }

        if let Some(id) = primary {
            let global_ready = elapsed(self.global_last_fired_ms, now_ms, cooldown_ms);
            let state = self.states.entry(id.to_string()).or_default();

            if state.active {
                debug!("Alert suppressed: {} already active", id);
            } else if !elapsed(state.last_fired_ms, now_ms, cooldown_ms) {
                debug!("Alert suppressed: {} in cooldown period", id);
            } else if !global_ready {
                debug!("Alert suppressed: global cooldown blocks {}", id);
            } else {
                state.active = true;
                state.last_fired_ms = Some(now_ms);
                state.fire_count += 1;
                self.global_last_fired_ms = Some(now_ms);

                info!("Alert fired: {} (count: {})", id, state.fire_count);
                transitions.push(AlertTransition::Fired(id.to_string()));
            }
        }

        self.prune(now_ms);
        transitions
    }

    /// Drop idle states that no longer hold a cooldown
    fn prune(&mut self, now_ms: u64) {
        let cooldown_ms = self.cooldown_ms();
        self.states.retain(|_, state| {
            state.active
                || (state.last_fired_ms.is_some()
                    && !elapsed(state.last_fired_ms, now_ms, cooldown_ms))
        });
    }

    fn cooldown_ms(&self) -> u64 {
        u64::try_from(self.config.cooldown().as_millis()).unwrap_or(u64::MAX)
    }

    /// Ids of currently active hazards, sorted
    pub fn active(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .states
            .iter()
            .filter(|(_, state)| state.active)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.states.get(id).is_some_and(|s| s.active)
    }

    /// State of one hazard, if tracked
    pub fn state(&self, id: &str) -> Option<&AlertState> {
        self.states.get(id)
    }

    /// Time of the last alert for any hazard
    pub fn global_last_fired_ms(&self) -> Option<u64> {
        self.global_last_fired_ms
    }

    /// Forget all alert state and cooldowns without emitting transitions
    pub fn reset(&mut self) {
        self.states.clear();
        self.global_last_fired_ms = None;
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

/// Whether the cooldown since `last` has passed; a clock going backwards counts as no time
fn elapsed(last: Option<u64>, now_ms: u64, cooldown_ms: u64) -> bool {
    match last {
        None => true,
        Some(last) => now_ms.saturating_sub(last) >= cooldown_ms,
    }
}
