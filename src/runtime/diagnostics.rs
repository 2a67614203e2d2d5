use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::CoreConfig;
use crate::logging::Logger;
use crate::metrics::CoreMetrics;
use crate::scheduler::{TickCallback, TickControl};

/// Periodically emits core metrics snapshots through the provided logger.
///
/// Runs as an ordinary scheduler subscription whose cadence is the snapshot
/// interval, so uptime is measured in scheduled frame time.
pub struct MetricsSnapshotTask {
    logger: Logger,
    metrics: Arc<Mutex<CoreMetrics>>,
    target: String,
    uptime: Duration,
}

impl MetricsSnapshotTask {
    pub fn new(logger: Logger, metrics: Arc<Mutex<CoreMetrics>>) -> Self {
        Self {
            logger,
            metrics,
            target: "rs9000::runtime.metrics".to_string(),
            uptime: Duration::ZERO,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Built only when the config carries a logger, a metrics handle and a
    /// non-zero interval.
    pub fn from_config(config: &CoreConfig) -> Option<Self> {
        if config.metrics_interval.is_zero() {
            return None;
        }
        let logger = config.logger.clone()?;
        let metrics = config.metrics_handle()?;
        Some(Self::new(logger, metrics).with_target(config.metrics_target.clone()))
    }

    pub fn uptime(&self) -> Duration {
        self.uptime
    }

    pub fn emit_snapshot(&mut self, elapsed: Duration) {
        self.uptime = self.uptime.saturating_add(elapsed);
        if let Ok(guard) = self.metrics.lock() {
            let event = guard.snapshot(self.uptime).to_log_event(&self.target);
            let _ = self.logger.log_event(event);
        }
    }

    pub fn into_callback<S: 'static>(mut self) -> Box<TickCallback<S>> {
        let callback = move |_state: &mut S, control: &mut TickControl<S>| {
            self.emit_snapshot(control.elapsed());
            Ok(())
        };
        Box::new(callback)
    }
}
