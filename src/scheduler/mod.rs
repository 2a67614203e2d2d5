//! Cooperative, single-threaded frame scheduler.
//!
//! The host calls [`FrameScheduler::tick`] once per frame. Each subscription
//! accumulates frame time and runs once the accumulator reaches its cadence;
//! a zero cadence runs every frame. Callbacks run synchronously in insertion
//! order and never overlap, so they must not block.
//!
//! Callbacks change the subscription set through their [`TickControl`]. An
//! unsubscribe takes effect as soon as the issuing callback returns: a
//! subscription removed earlier in a pass is skipped for the rest of it.
//! Subscriptions added during a pass join when the pass ends and first run
//! on the next one. Removed entries are compacted out at the end of the pass.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::CoreMetrics;
use crate::runtime::audit::{CoreAudit, CoreAuditEventBuilder, CoreAuditStage, NullCoreAudit};
use crate::{CoreError, Result};

const TARGET: &str = "rs9000::scheduler";

pub type TickCallback<S> = dyn FnMut(&mut S, &mut TickControl<S>) -> Result<()>;

/// Anything that can register or drop named per-frame callbacks.
pub trait Subscriptions<S> {
    fn subscribe(
        &mut self,
        name: &str,
        cadence: Duration,
        callback: Box<TickCallback<S>>,
    ) -> Result<()>;

    fn unsubscribe(&mut self, name: &str);

    /// Convenience over [`Subscriptions::subscribe`] that boxes the closure.
    fn subscribe_with<F>(&mut self, name: &str, cadence: Duration, callback: F) -> Result<()>
    where
        F: FnMut(&mut S, &mut TickControl<S>) -> Result<()> + 'static,
        Self: Sized,
    {
        self.subscribe(name, cadence, Box::new(callback))
    }
}

struct Subscription<S> {
    name: String,
    cadence: Duration,
    accumulated: Duration,
    callback: Box<TickCallback<S>>,
    removed: bool,
}

impl<S> Subscription<S> {
    fn new(name: &str, cadence: Duration, callback: Box<TickCallback<S>>) -> Self {
        Self {
            name: name.to_string(),
            cadence,
            accumulated: Duration::ZERO,
            callback,
            removed: false,
        }
    }
}

enum Command<S> {
    Subscribe(Subscription<S>),
    Unsubscribe(String),
}

/// Handed to a callback for the duration of one invocation.
pub struct TickControl<S> {
    name: String,
    frame: u64,
    delta: Duration,
    elapsed: Duration,
    commands: Vec<Command<S>>,
}

impl<S> TickControl<S> {
    fn new(name: String, frame: u64, delta: Duration, elapsed: Duration) -> Self {
        Self {
            name,
            frame,
            delta,
            elapsed,
            commands: Vec::new(),
        }
    }

    /// Name of the subscription being invoked.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Duration of the current frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time accumulated since this subscription last ran.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn unsubscribe_self(&mut self) {
        let name = self.name.clone();
        self.commands.push(Command::Unsubscribe(name));
    }
}

impl<S> Subscriptions<S> for TickControl<S> {
    fn subscribe(
        &mut self,
        name: &str,
        cadence: Duration,
        callback: Box<TickCallback<S>>,
    ) -> Result<()> {
        self.commands
            .push(Command::Subscribe(Subscription::new(name, cadence, callback)));
        Ok(())
    }

    fn unsubscribe(&mut self, name: &str) {
        self.commands.push(Command::Unsubscribe(name.to_string()));
    }
}

/// Outcome of one scheduler pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub frame: u64,
    pub invoked: usize,
    pub failed: usize,
}

pub struct FrameScheduler<S> {
    entries: Vec<Subscription<S>>,
    pending: Vec<Subscription<S>>,
    frame: u64,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<CoreMetrics>>>,
    audit: Arc<dyn CoreAudit>,
}

impl<S> Default for FrameScheduler<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            pending: Vec::new(),
            frame: 0,
            logger: None,
            metrics: None,
            audit: Arc::new(NullCoreAudit),
        }
    }
}

impl<S> FrameScheduler<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Mutex<CoreMetrics>>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn CoreAudit>) -> Self {
        self.audit = audit;
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| !e.removed && e.name == name)
    }

    /// Live subscription names in invocation order.
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.removed)
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Remove a subscription outside a pass. Returns whether one existed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        let removed = self.entries.len() != before;
        if removed {
            self.record_removed(name);
        }
        removed
    }

    /// Teardown: drop every subscription. Returns how many were live.
    pub fn unsubscribe_all(&mut self) -> usize {
        let names: Vec<String> = self
            .entries
            .drain(..)
            .filter(|e| !e.removed)
            .map(|e| e.name)
            .collect();
        self.pending.clear();
        for name in &names {
            self.record_removed(name);
        }
        names.len()
    }

    /// Run one pass over the subscriptions.
    pub fn tick(&mut self, state: &mut S, delta: Duration) -> TickSummary {
        self.frame += 1;
        let frame = self.frame;
        let mut summary = TickSummary {
            frame,
            ..TickSummary::default()
        };

        let count = self.entries.len();
        for idx in 0..count {
            let (commands, failure) = {
                let entry = &mut self.entries[idx];
                if entry.removed {
                    continue;
                }
                entry.accumulated = entry.accumulated.saturating_add(delta);
                if entry.accumulated < entry.cadence {
                    continue;
                }
                let elapsed = std::mem::take(&mut entry.accumulated);
                let mut control = TickControl::new(entry.name.clone(), frame, delta, elapsed);
                summary.invoked += 1;
                let failure = (entry.callback)(state, &mut control)
                    .err()
                    .map(|err| (entry.name.clone(), err));
                (control.commands, failure)
            };

            if let Some((name, err)) = failure {
                summary.failed += 1;
                emit(
                    self.logger.as_ref(),
                    LogLevel::Error,
                    TARGET,
                    "callback_failed",
                    [
                        json_kv("subscription", json!(name)),
                        json_kv("frame", json!(frame)),
                        json_kv("error", json!(err.to_string())),
                    ],
                );
            }
            self.apply(commands);
        }

        self.compact();

        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_frame(summary.invoked, summary.failed);
            }
        }
        summary
    }

    fn apply(&mut self, commands: Vec<Command<S>>) {
        for command in commands {
            match command {
                Command::Subscribe(subscription) => {
                    let taken = self.contains(&subscription.name)
                        || self.pending.iter().any(|p| p.name == subscription.name);
                    if taken {
                        emit(
                            self.logger.as_ref(),
                            LogLevel::Error,
                            TARGET,
                            "duplicate_subscription",
                            [json_kv("subscription", json!(subscription.name))],
                        );
                    } else {
                        self.pending.push(subscription);
                    }
                }
                Command::Unsubscribe(name) => {
                    let mut hit = false;
                    for entry in self.entries.iter_mut().filter(|e| !e.removed && e.name == name) {
                        entry.removed = true;
                        hit = true;
                    }
                    let before = self.pending.len();
                    self.pending.retain(|p| p.name != name);
                    if hit || self.pending.len() != before {
                        self.record_removed(&name);
                    }
                }
            }
        }
    }

    fn compact(&mut self) {
        self.entries.retain(|e| !e.removed);
        let joined: Vec<Subscription<S>> = self.pending.drain(..).collect();
        for subscription in joined {
            self.record_added(&subscription.name, subscription.cadence);
            self.entries.push(subscription);
        }
    }

    fn record_added(&self, name: &str, cadence: Duration) {
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "subscribed",
            [
                json_kv("subscription", json!(name)),
                json_kv("cadence_ms", json!(cadence.as_millis() as u64)),
            ],
        );
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::SubscriptionAdded);
        builder
            .detail("subscription", json!(name))
            .detail("cadence_ms", json!(cadence.as_millis() as u64));
        self.audit.record(builder.finish());
    }

    fn record_removed(&self, name: &str) {
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "unsubscribed",
            [json_kv("subscription", json!(name))],
        );
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::SubscriptionRemoved);
        builder.detail("subscription", json!(name));
        self.audit.record(builder.finish());
    }
}

impl<S> Subscriptions<S> for FrameScheduler<S> {
    fn subscribe(
        &mut self,
        name: &str,
        cadence: Duration,
        callback: Box<TickCallback<S>>,
    ) -> Result<()> {
        if self.contains(name) {
            return Err(CoreError::DuplicateSubscription(name.to_string()));
        }
        self.record_added(name, cadence);
        self.entries.push(Subscription::new(name, cadence, callback));
        Ok(())
    }

    fn unsubscribe(&mut self, name: &str) {
        self.remove(name);
    }
}
