use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CoreConfig;
use crate::events::{AppEvent, EventKind};
use crate::host::{Control, Occupancy, ScriptedHost, Seat, VehicleClass};
use crate::overlay::{OverlayRequest, QueueTransport};
use crate::radar::Radar;
use crate::runtime::RadarCore;
use crate::scheduler::TickSummary;
use crate::CoreError;

pub type DriverResult<T> = std::result::Result<T, ScriptDriverError>;

#[derive(Debug, Error)]
pub enum ScriptDriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

fn default_delta_ms() -> u64 {
    16
}

/// One line of a host script: the host's state for a single frame.
///
/// Occupancy and held controls describe the whole frame, so omitting them
/// means on foot with nothing held. Keyboard status persists until changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostFrame {
    #[serde(default = "default_delta_ms")]
    pub delta_ms: u64,
    #[serde(default)]
    pub occupancy: Option<ScriptOccupancy>,
    #[serde(default)]
    pub held: Vec<Control>,
    #[serde(default)]
    pub radar_enabled: Option<bool>,
    #[serde(default)]
    pub request: Option<OverlayRequest>,
    #[serde(default)]
    pub keyboard_status: Option<i32>,
    #[serde(default)]
    pub keyboard_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptOccupancy {
    pub seat: i32,
    pub class: VehicleClass,
}

impl From<ScriptOccupancy> for Occupancy {
    fn from(value: ScriptOccupancy) -> Self {
        Occupancy::new(Seat::from_index(value.seat), value.class)
    }
}

/// Application event line written alongside overlay messages.
#[derive(Debug, Serialize)]
struct EventLine<'a> {
    event: &'a str,
    data: &'a str,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptReport {
    pub frames: u64,
    pub messages: u64,
    pub events: u64,
    pub failed_callbacks: u64,
}

/// Replays a JSON-lines host script against a [`RadarCore`] and writes every
/// overlay message, one per line, to the output.
pub struct ScriptDriver {
    core: RadarCore<ScriptedHost>,
    outbox: QueueTransport,
    results: Rc<RefCell<Vec<String>>>,
}

impl ScriptDriver {
    pub fn new(config: CoreConfig) -> Self {
        let outbox = QueueTransport::new();
        let mut core = RadarCore::new(config, ScriptedHost::new(), outbox.clone());
        let results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&results);
        core.context_mut()
            .events_mut()
            .on(EventKind::KeyboardResult, move |event| {
                if let AppEvent::KeyboardResult(text) = event {
                    sink.borrow_mut().push(text.clone());
                }
            });
        Self {
            core,
            outbox,
            results,
        }
    }

    pub fn with_radar<R>(mut self, radar: R) -> Self
    where
        R: Radar + 'static,
    {
        self.core = self.core.with_radar(radar);
        self
    }

    pub fn core(&self) -> &RadarCore<ScriptedHost> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut RadarCore<ScriptedHost> {
        &mut self.core
    }

    pub fn run<R, W>(&mut self, input: R, output: &mut W) -> DriverResult<ScriptReport>
    where
        R: BufRead,
        W: Write,
    {
        let mut report = ScriptReport::default();
        self.core.start()?;
        self.flush(output, &mut report)?;

        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let frame: HostFrame = serde_json::from_str(trimmed)
                .map_err(|err| ScriptDriverError::Decode(err.to_string()))?;
            let summary = self.step(frame)?;
            report.frames += 1;
            report.failed_callbacks += summary.failed as u64;
            self.flush(output, &mut report)?;
        }

        self.core.shutdown();
        Ok(report)
    }

    /// Apply one frame of host state, then tick the core.
    pub fn step(&mut self, frame: HostFrame) -> DriverResult<TickSummary> {
        let host = self.core.context_mut().host_mut();
        host.set_occupancy(frame.occupancy.map(Occupancy::from));
        host.hold(&frame.held);

        if let Some(enabled) = frame.radar_enabled {
            self.core.context_mut().set_radar_enabled(enabled);
        }
        if let Some(request) = frame.request {
            self.core.handle_request(request)?;
        }
        // After the request so a prompt opened this frame sees the status.
        if let Some(status) = frame.keyboard_status {
            self.core
                .context_mut()
                .host_mut()
                .set_keyboard_status(status, frame.keyboard_text);
        }

        Ok(self.core.frame(Duration::from_millis(frame.delta_ms)))
    }

    fn flush<W: Write>(&mut self, output: &mut W, report: &mut ScriptReport) -> DriverResult<()> {
        for message in self.outbox.drain() {
            writeln!(output, "{message}")?;
            report.messages += 1;
        }
        let results: Vec<String> = self.results.borrow_mut().drain(..).collect();
        for text in results {
            let line = EventLine {
                event: EventKind::KeyboardResult.wire_name(),
                data: &text,
            };
            let encoded = serde_json::to_string(&line).map_err(CoreError::from)?;
            writeln!(output, "{encoded}")?;
            report.events += 1;
        }
        output.flush()?;
        Ok(())
    }
}
