//! Alerting System
//!
//! Turns the per-sample primary hazard into fired/cleared transitions,
//! suppressing repeats with per-hazard and global cooldowns.

mod debounce;

pub use debounce::{AlertConfig, AlertDebouncer, AlertState, AlertTransition};
