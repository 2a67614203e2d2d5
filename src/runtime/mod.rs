use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use crate::config::CoreConfig;
use crate::events::{AppEvent, EventBus};
use crate::host::Host;
use crate::keyboard::{KeyboardFlow, KeyboardPoll};
use crate::logging::{LogLevel, emit, json_kv};
use crate::overlay::{
    OverlayChannel, OverlayMessage, OverlayRequest, OverlayTransport, decode_request,
};
use crate::radar::{IdleRadar, Radar, RadarDisplayState, RadarFrame};
use crate::scheduler::{FrameScheduler, Subscriptions, TickControl, TickSummary};
use crate::visibility::{
    ControllerVisibility, InputRouter, VisibilityArbiter, VisibilityDecision, is_driving_qualifying,
};
use crate::Result;

use self::audit::{CoreAuditEventBuilder, CoreAuditStage};
use self::diagnostics::MetricsSnapshotTask;

pub mod audit;
pub mod diagnostics;
pub mod driver;

const TARGET: &str = "rs9000::runtime";

/// Throttled radar collaborator update.
pub const UPDATE_SUBSCRIPTION: &str = "radar.update";
/// Unthrottled visibility and input reducers.
pub const INPUTS_SUBSCRIPTION: &str = "radar.inputs";
/// Present only while a keyboard prompt is open.
pub const KEYBOARD_SUBSCRIPTION: &str = "keyboard.poll";
pub const DIAGNOSTICS_SUBSCRIPTION: &str = "diagnostics.metrics";

/// Process-wide state shared by every per-frame callback.
///
/// Each piece of mutable state has exactly one writer: the arbiter writes
/// the radar's `displayed` flag, the router writes the panel's `visible`
/// flag, and the keyboard flow owns the single prompt session.
pub struct RadarContext<H> {
    config: CoreConfig,
    host: H,
    overlay: OverlayChannel,
    events: EventBus,
    radar_state: RadarDisplayState,
    radar: Box<dyn Radar>,
    controller: ControllerVisibility,
    keyboard: KeyboardFlow,
}

impl<H: Host + 'static> RadarContext<H> {
    pub fn new<T>(config: CoreConfig, host: H, transport: T) -> Self
    where
        T: OverlayTransport + 'static,
    {
        let overlay = OverlayChannel::new(transport)
            .with_logger(config.logger.clone())
            .with_metrics(config.metrics_handle());
        let keyboard = KeyboardFlow::new().with_logger(config.logger.clone());
        Self {
            config,
            host,
            overlay,
            events: EventBus::new(),
            radar_state: RadarDisplayState::default(),
            radar: Box::new(IdleRadar),
            controller: ControllerVisibility::new(),
            keyboard,
        }
    }

    pub fn set_radar<R>(&mut self, radar: R)
    where
        R: Radar + 'static,
    {
        self.radar = Box::new(radar);
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn overlay(&self) -> &OverlayChannel {
        &self.overlay
    }

    pub fn radar_state(&self) -> &RadarDisplayState {
        &self.radar_state
    }

    pub fn controller(&self) -> &ControllerVisibility {
        &self.controller
    }

    pub fn keyboard(&self) -> &KeyboardFlow {
        &self.keyboard
    }

    /// Operator power toggle. Visibility follows on the next inputs pass.
    pub fn set_radar_enabled(&mut self, enabled: bool) {
        if self.radar_state.is_enabled() != enabled {
            self.radar_state.set_enabled(enabled);
            emit(
                self.config.logger.as_ref(),
                LogLevel::Info,
                TARGET,
                "radar_power",
                [json_kv("enabled", json!(enabled))],
            );
        }
    }

    pub fn is_driving_qualifying(&self) -> bool {
        is_driving_qualifying(self.host.local_occupancy(), &self.config.qualifying_classes)
    }

    /// Per-frame reducers. The driving predicate is sampled once so both
    /// reducers see the same frame.
    pub fn check_inputs(&mut self) -> Result<()> {
        let driving = self.is_driving_qualifying();

        match VisibilityArbiter::apply(&mut self.radar_state, driving) {
            VisibilityDecision::Show => self.radar_visibility_changed(true)?,
            VisibilityDecision::Hide => self.radar_visibility_changed(false)?,
            VisibilityDecision::Keep => {}
        }

        let pressed = self.host.is_control_just_pressed(self.config.toggle_control);
        if InputRouter::apply(&mut self.controller, pressed, driving) {
            self.controller_toggled()?;
        }
        Ok(())
    }

    pub fn update_radar(&mut self) -> Result<()> {
        self.radar.update(RadarFrame {
            display: &self.radar_state,
            units: self.config.units,
            overlay: &mut self.overlay,
        })
    }

    /// Open a keyboard prompt and attach its poller to `subs`. Returns
    /// `false` when a prompt is already open; that request is dropped.
    pub fn show_keyboard<T>(
        &mut self,
        subs: &mut T,
        limit: u32,
        initial_text: &str,
    ) -> Result<bool>
    where
        T: Subscriptions<Self>,
    {
        if !self.keyboard.start(&mut self.host, limit, initial_text) {
            let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::KeyboardIgnored);
            builder.detail("limit", json!(limit));
            self.config.audit.record(builder.finish());
            return Ok(false);
        }

        let poller = Box::new(Self::keyboard_tick);
        if let Err(err) = subs.subscribe(KEYBOARD_SUBSCRIPTION, Duration::ZERO, poller) {
            // No poller means the session could never finish.
            self.keyboard.reset();
            return Err(err);
        }

        self.with_metrics(|m| m.record_keyboard_opened());
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::KeyboardOpened);
        builder
            .detail("limit", json!(limit))
            .detail("initial_chars", json!(initial_text.chars().count()));
        self.config.audit.record(builder.finish());
        Ok(true)
    }

    pub fn handle_request<T>(&mut self, request: OverlayRequest, subs: &mut T) -> Result<()>
    where
        T: Subscriptions<Self>,
    {
        match request {
            OverlayRequest::ShowKeyboard { limit, text } => {
                self.show_keyboard(subs, limit, &text)?;
            }
            OverlayRequest::SetRadarEnabled { enabled } => self.set_radar_enabled(enabled),
        }
        Ok(())
    }

    fn inputs_tick(&mut self, _control: &mut TickControl<Self>) -> Result<()> {
        self.check_inputs()
    }

    fn update_tick(&mut self, _control: &mut TickControl<Self>) -> Result<()> {
        self.update_radar()
    }

    fn keyboard_tick(&mut self, control: &mut TickControl<Self>) -> Result<()> {
        match self.keyboard.poll(&mut self.host) {
            KeyboardPoll::Waiting => {}
            KeyboardPoll::Idle => control.unsubscribe_self(),
            KeyboardPoll::Confirmed(text) => {
                let chars = text.chars().count();
                self.events.emit(&AppEvent::KeyboardResult(text));
                control.unsubscribe_self();
                self.keyboard_closed(CoreAuditStage::KeyboardConfirmed, Some(chars));
            }
            KeyboardPoll::Cancelled => {
                control.unsubscribe_self();
                self.keyboard_closed(CoreAuditStage::KeyboardCancelled, None);
            }
        }
        Ok(())
    }

    fn keyboard_closed(&mut self, stage: CoreAuditStage, chars: Option<usize>) {
        let confirmed = stage == CoreAuditStage::KeyboardConfirmed;
        self.with_metrics(|m| m.record_keyboard_closed(confirmed));
        let mut builder = CoreAuditEventBuilder::new(stage);
        if let Some(chars) = chars {
            builder.detail("chars", json!(chars));
        }
        self.config.audit.record(builder.finish());
    }

    fn radar_visibility_changed(&mut self, shown: bool) -> Result<()> {
        self.overlay.publish(&OverlayMessage::radar_display(shown))?;
        self.events.emit(&AppEvent::RadarDisplayChanged(shown));
        self.with_metrics(|m| m.record_radar_visibility(shown));
        let stage = if shown {
            CoreAuditStage::RadarShown
        } else {
            CoreAuditStage::RadarHidden
        };
        self.config.audit.record(CoreAuditEventBuilder::new(stage).finish());
        emit(
            self.config.logger.as_ref(),
            LogLevel::Info,
            TARGET,
            "radar_display",
            [json_kv("displayed", json!(shown))],
        );
        Ok(())
    }

    fn controller_toggled(&mut self) -> Result<()> {
        let visible = self.controller.is_visible();
        self.overlay.publish(&OverlayMessage::controller_display(visible))?;
        self.events.emit(&AppEvent::ControllerVisibilityChanged(visible));
        self.with_metrics(|m| m.record_controller_toggle());
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::ControllerToggled);
        builder.detail("visible", json!(visible));
        self.config.audit.record(builder.finish());
        emit(
            self.config.logger.as_ref(),
            LogLevel::Info,
            TARGET,
            "controller_display",
            [json_kv("visible", json!(visible))],
        );
        Ok(())
    }

    fn with_metrics(&self, record: impl FnOnce(&mut crate::metrics::CoreMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }
}

/// Owns the scheduler and the context it drives.
pub struct RadarCore<H> {
    scheduler: FrameScheduler<RadarContext<H>>,
    context: RadarContext<H>,
    started_at: Option<Instant>,
}

impl<H: Host + 'static> RadarCore<H> {
    pub fn new<T>(config: CoreConfig, host: H, transport: T) -> Self
    where
        T: OverlayTransport + 'static,
    {
        let scheduler = FrameScheduler::new()
            .with_logger(config.logger.clone())
            .with_metrics(config.metrics_handle())
            .with_audit(Arc::clone(&config.audit));
        Self {
            scheduler,
            context: RadarContext::new(config, host, transport),
            started_at: None,
        }
    }

    pub fn with_radar<R>(mut self, radar: R) -> Self
    where
        R: Radar + 'static,
    {
        self.context.set_radar(radar);
        self
    }

    pub fn context(&self) -> &RadarContext<H> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RadarContext<H> {
        &mut self.context
    }

    pub fn scheduler(&self) -> &FrameScheduler<RadarContext<H>> {
        &self.scheduler
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Register the per-frame subscriptions and announce the display unit to
    /// the overlay. Calling it again while started does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }

        let cadence = self.context.config.radar_update_cadence;
        self.scheduler.subscribe(
            UPDATE_SUBSCRIPTION,
            cadence,
            Box::new(RadarContext::<H>::update_tick),
        )?;
        self.scheduler.subscribe(
            INPUTS_SUBSCRIPTION,
            Duration::ZERO,
            Box::new(RadarContext::<H>::inputs_tick),
        )?;
        if let Some(task) = MetricsSnapshotTask::from_config(&self.context.config) {
            let interval = self.context.config.metrics_interval;
            self.scheduler
                .subscribe(DIAGNOSTICS_SUBSCRIPTION, interval, task.into_callback())?;
        }

        let units = self.context.config.units;
        self.context
            .overlay
            .publish(&OverlayMessage::Units(units.into()))?;

        self.started_at = Some(Instant::now());
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::CoreStarted);
        builder
            .detail("units", json!(units.label()))
            .detail("subscriptions", json!(self.scheduler.len()));
        self.context.config.audit.record(builder.finish());
        emit(
            self.context.config.logger.as_ref(),
            LogLevel::Info,
            TARGET,
            "core_started",
            [
                json_kv("units", json!(units.label())),
                json_kv("subscriptions", json!(self.scheduler.names())),
            ],
        );
        Ok(())
    }

    /// One host frame.
    pub fn frame(&mut self, delta: Duration) -> TickSummary {
        self.scheduler.tick(&mut self.context, delta)
    }

    pub fn show_keyboard(&mut self, limit: u32, initial_text: &str) -> Result<bool> {
        self.context
            .show_keyboard(&mut self.scheduler, limit, initial_text)
    }

    pub fn handle_request(&mut self, request: OverlayRequest) -> Result<()> {
        self.context.handle_request(request, &mut self.scheduler)
    }

    /// Decode and apply a request posted by the overlay panel.
    pub fn dispatch_request(&mut self, body: &str) -> Result<()> {
        let request = decode_request(body)?;
        self.handle_request(request)
    }

    /// Unregister every subscription and drop any open prompt. Returns how
    /// many subscriptions were removed.
    pub fn shutdown(&mut self) -> usize {
        let removed = self.scheduler.unsubscribe_all();
        self.context.keyboard.reset();
        let Some(started_at) = self.started_at.take() else {
            return removed;
        };

        let uptime_ms = started_at.elapsed().as_millis() as u64;
        let mut builder = CoreAuditEventBuilder::new(CoreAuditStage::CoreStopped);
        builder
            .detail("removed", json!(removed))
            .detail("uptime_ms", json!(uptime_ms));
        self.context.config.audit.record(builder.finish());
        emit(
            self.context.config.logger.as_ref(),
            LogLevel::Info,
            TARGET,
            "core_stopped",
            [
                json_kv("removed", json!(removed)),
                json_kv("uptime_ms", json!(uptime_ms)),
            ],
        );
        removed
    }
}
