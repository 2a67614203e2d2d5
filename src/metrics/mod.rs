use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Running counters for the coordination core.
#[derive(Debug, Default, Clone)]
pub struct CoreMetrics {
    frames: u64,
    invocations: u64,
    failures: u64,
    overlay_messages: u64,
    keyboard_opened: u64,
    keyboard_confirmed: u64,
    keyboard_cancelled: u64,
    radar_shown: u64,
    radar_hidden: u64,
    controller_toggles: u64,
}

impl CoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_frame(&mut self, invoked: usize, failed: usize) {
        self.frames = self.frames.saturating_add(1);
        self.invocations = self.invocations.saturating_add(invoked as u64);
        self.failures = self.failures.saturating_add(failed as u64);
    }

    pub fn record_overlay_message(&mut self) {
        self.overlay_messages = self.overlay_messages.saturating_add(1);
    }

    pub fn record_keyboard_opened(&mut self) {
        self.keyboard_opened = self.keyboard_opened.saturating_add(1);
    }

    pub fn record_keyboard_closed(&mut self, confirmed: bool) {
        if confirmed {
            self.keyboard_confirmed = self.keyboard_confirmed.saturating_add(1);
        } else {
            self.keyboard_cancelled = self.keyboard_cancelled.saturating_add(1);
        }
    }

    pub fn record_radar_visibility(&mut self, shown: bool) {
        if shown {
            self.radar_shown = self.radar_shown.saturating_add(1);
        } else {
            self.radar_hidden = self.radar_hidden.saturating_add(1);
        }
    }

    pub fn record_controller_toggle(&mut self) {
        self.controller_toggles = self.controller_toggles.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            frames: self.frames,
            invocations: self.invocations,
            failures: self.failures,
            overlay_messages: self.overlay_messages,
            keyboard_opened: self.keyboard_opened,
            keyboard_confirmed: self.keyboard_confirmed,
            keyboard_cancelled: self.keyboard_cancelled,
            radar_shown: self.radar_shown,
            radar_hidden: self.radar_hidden,
            controller_toggles: self.controller_toggles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub frames: u64,
    pub invocations: u64,
    pub failures: u64,
    pub overlay_messages: u64,
    pub keyboard_opened: u64,
    pub keyboard_confirmed: u64,
    pub keyboard_cancelled: u64,
    pub radar_shown: u64,
    pub radar_hidden: u64,
    pub controller_toggles: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "core_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("frames".to_string(), json!(self.frames));
        map.insert("invocations".to_string(), json!(self.invocations));
        map.insert("failures".to_string(), json!(self.failures));
        map.insert("overlay_messages".to_string(), json!(self.overlay_messages));
        map.insert("keyboard_opened".to_string(), json!(self.keyboard_opened));
        map.insert("keyboard_confirmed".to_string(), json!(self.keyboard_confirmed));
        map.insert("keyboard_cancelled".to_string(), json!(self.keyboard_cancelled));
        map.insert("radar_shown".to_string(), json!(self.radar_shown));
        map.insert("radar_hidden".to_string(), json!(self.radar_hidden));
        map.insert("controller_toggles".to_string(), json!(self.controller_toggles));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counters_accumulate() {
        let mut metrics = CoreMetrics::new();
        metrics.record_frame(2, 0);
        metrics.record_frame(3, 1);
        let snapshot = metrics.snapshot(Duration::from_millis(40));
        assert_eq!(snapshot.frames, 2);
        assert_eq!(snapshot.invocations, 5);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.uptime_ms, 40);
    }

    #[test]
    fn keyboard_outcomes_split() {
        let mut metrics = CoreMetrics::new();
        metrics.record_keyboard_opened();
        metrics.record_keyboard_closed(true);
        metrics.record_keyboard_opened();
        metrics.record_keyboard_closed(false);
        let snapshot = metrics.snapshot(Duration::ZERO);
        assert_eq!(snapshot.keyboard_opened, 2);
        assert_eq!(snapshot.keyboard_confirmed, 1);
        assert_eq!(snapshot.keyboard_cancelled, 1);
    }

    #[test]
    fn snapshot_log_event_carries_fields() {
        let mut metrics = CoreMetrics::new();
        metrics.record_controller_toggle();
        let event = metrics.snapshot(Duration::ZERO).to_log_event("rs9000::runtime.metrics");
        assert_eq!(event.message, "core_metrics");
        assert_eq!(event.field("controller_toggles"), Some(&json!(1)));
    }
}
