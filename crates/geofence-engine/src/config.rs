//! Engine configuration

use alerting::AlertConfig;
use proximity::EvaluatorConfig;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Alert predicate thresholds
    pub evaluator: EvaluatorConfig,
    /// Cooldown settings
    pub alerting: AlertConfig,
    /// Buffered alert events per subscriber before lagging ones lose the oldest
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorConfig::default(),
            alerting: AlertConfig::default(),
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Event buffer size, never zero
    pub fn event_capacity(&self) -> usize {
        self.event_capacity.max(1)
    }
}
