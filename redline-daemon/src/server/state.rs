//! Shared application state for the server.

use redline_core::ChangeClassifier;
use std::time::Instant;

use crate::config::LimitsConfig;

/// Shared application state.
///
/// Read-only after startup; every request works on its own data.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Materiality classifier, optionally backed by an external service
    pub classifier: ChangeClassifier,
    /// Input bounds
    pub limits: LimitsConfig,
    /// When the daemon started
    pub start_time: Instant,
}

impl AppState {
    pub fn new(classifier: ChangeClassifier, limits: LimitsConfig) -> Self {
        Self {
            classifier,
            limits,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Name reported by `/health` for the active classification strategy.
    pub fn classifier_name(&self) -> &str {
        self.classifier.external_name().unwrap_or("heuristic")
    }
}
