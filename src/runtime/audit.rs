//! Lifecycle audit hooks for the coordination core.
//!
//! Records capture a stage identifier plus structured metadata so callers can
//! log, buffer, or assert on what the core did without reaching into it.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Checkpoints emitted by the scheduler and the runtime context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreAuditStage {
    CoreStarted,
    SubscriptionAdded,
    SubscriptionRemoved,
    RadarShown,
    RadarHidden,
    ControllerToggled,
    KeyboardOpened,
    /// A keyboard start arrived while a prompt was already open.
    KeyboardIgnored,
    KeyboardConfirmed,
    KeyboardCancelled,
    CoreStopped,
}

#[derive(Debug, Clone)]
pub struct CoreAuditEvent {
    pub timestamp: SystemTime,
    pub stage: CoreAuditStage,
    pub details: Vec<(String, Value)>,
}

impl CoreAuditEvent {
    fn new(stage: CoreAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

pub struct CoreAuditEventBuilder {
    event: CoreAuditEvent,
}

impl CoreAuditEventBuilder {
    pub fn new(stage: CoreAuditStage) -> Self {
        Self {
            event: CoreAuditEvent::new(stage),
        }
    }

    pub fn detail(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.event.details.push((key.into(), value));
        self
    }

    pub fn finish(self) -> CoreAuditEvent {
        self.event
    }
}

pub trait CoreAudit: Send + Sync {
    fn record(&self, event: CoreAuditEvent);
}

/// Default sink when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullCoreAudit;

impl CoreAudit for NullCoreAudit {
    fn record(&self, _event: CoreAuditEvent) {}
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct BufferedCoreAudit {
    events: Mutex<Vec<CoreAuditEvent>>,
}

impl BufferedCoreAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CoreAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<CoreAuditStage> {
        self.events().into_iter().map(|e| e.stage).collect()
    }

    pub fn count(&self, stage: CoreAuditStage) -> usize {
        self.stages().into_iter().filter(|s| *s == stage).count()
    }
}

impl CoreAudit for BufferedCoreAudit {
    fn record(&self, event: CoreAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_details_in_order() {
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::SubscriptionAdded);
        builder
            .detail("subscription", json!("radar.inputs"))
            .detail("cadence_ms", json!(0));
        let event = builder.finish();
        assert_eq!(event.stage, CoreAuditStage::SubscriptionAdded);
        assert_eq!(event.details[0].0, "subscription");
        assert_eq!(event.detail("cadence_ms"), Some(&json!(0)));
    }

    #[test]
    fn buffered_audit_counts_stages() {
        let audit = BufferedCoreAudit::new();
        audit.record(CoreAuditEventBuilder::new(CoreAuditStage::RadarShown).finish());
        audit.record(CoreAuditEventBuilder::new(CoreAuditStage::RadarHidden).finish());
        audit.record(CoreAuditEventBuilder::new(CoreAuditStage::RadarShown).finish());
        assert_eq!(audit.count(CoreAuditStage::RadarShown), 2);
        assert_eq!(
            audit.stages(),
            vec![
                CoreAuditStage::RadarShown,
                CoreAuditStage::RadarHidden,
                CoreAuditStage::RadarShown
            ]
        );
    }
}
