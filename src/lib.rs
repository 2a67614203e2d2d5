//! Coordination core for the RS9000 in-vehicle traffic radar overlay.
//!
//! The host calls [`RadarCore::frame`] once per game frame. A cooperative
//! [`FrameScheduler`] fans that out to named subscriptions: the throttled
//! radar update, the visibility and input reducers, and an on-screen keyboard
//! poller that only exists while a prompt is open. UI changes reach the
//! rendered overlay as `{type, data}` JSON envelopes through an
//! [`OverlayChannel`].

pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod keyboard;
pub mod logging;
pub mod metrics;
pub mod overlay;
pub mod radar;
pub mod runtime;
pub mod scheduler;
pub mod units;
pub mod visibility;

pub use config::{CoreConfig, CoreSettings};
pub use error::{ConfigError, CoreError, Result};
pub use events::{AppEvent, EventBus, EventKind, HandlerId};
pub use host::{
    Control, EdgeTrigger, GameHost, Host, KeyboardHost, KeyboardPrompt, Occupancy, ScriptedHost,
    Seat, VehicleClass,
};
pub use keyboard::{KeyboardFlow, KeyboardPoll, KeyboardSession, KeyboardState, KeyboardStatus};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{CoreMetrics, MetricSnapshot};
pub use overlay::{
    MessageType, OverlayChannel, OverlayMessage, OverlayRequest, OverlayTransport, QueueTransport,
};
pub use radar::{IdleRadar, Radar, RadarDisplayState, RadarFrame};
pub use runtime::audit::{
    BufferedCoreAudit, CoreAudit, CoreAuditEvent, CoreAuditEventBuilder, CoreAuditStage,
    NullCoreAudit,
};
pub use runtime::diagnostics::MetricsSnapshotTask;
pub use runtime::driver::script::{
    DriverResult, HostFrame, ScriptDriver, ScriptDriverError, ScriptReport,
};
pub use runtime::{RadarContext, RadarCore};
pub use scheduler::{FrameScheduler, Subscriptions, TickCallback, TickControl, TickSummary};
pub use units::DisplayUnit;
pub use visibility::{
    ControllerVisibility, InputRouter, VisibilityArbiter, VisibilityDecision,
    is_driving_qualifying,
};
