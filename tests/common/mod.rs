#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use rs9000::{
    AppEvent, BufferedCoreAudit, Control, CoreConfig, EventKind, Logger, MemorySink, Occupancy,
    QueueTransport, RadarCore, ScriptedHost, TickSummary, VehicleClass,
};
use serde_json::Value;

pub const FRAME: Duration = Duration::from_millis(16);

/// A started core over a scripted host, with every observable side channel
/// captured.
pub struct TestCore {
    pub core: RadarCore<ScriptedHost>,
    pub outbox: QueueTransport,
    pub audit: Arc<BufferedCoreAudit>,
    pub logs: Arc<MemorySink>,
    pub keyboard_results: Rc<RefCell<Vec<String>>>,
    held: Vec<Control>,
}

impl TestCore {
    pub fn new() -> Self {
        Self::with_config(CoreConfig::default())
    }

    pub fn with_config(mut config: CoreConfig) -> Self {
        let audit = Arc::new(BufferedCoreAudit::new());
        let logs = Arc::new(MemorySink::new());
        config.audit = audit.clone();
        config.logger = Some(Logger::from_shared(logs.clone()));
        config.enable_metrics();

        let outbox = QueueTransport::new();
        let mut core = RadarCore::new(config, ScriptedHost::new(), outbox.clone());
        let keyboard_results = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&keyboard_results);
        core.context_mut()
            .events_mut()
            .on(EventKind::KeyboardResult, move |event| {
                if let AppEvent::KeyboardResult(text) = event {
                    sink.borrow_mut().push(text.clone());
                }
            });
        core.start().expect("core starts");

        Self {
            core,
            outbox,
            audit,
            logs,
            keyboard_results,
            held: Vec::new(),
        }
    }

    pub fn host(&mut self) -> &mut ScriptedHost {
        self.core.context_mut().host_mut()
    }

    pub fn enter_driver_seat(&mut self) {
        self.host()
            .set_occupancy(Some(Occupancy::driver(VehicleClass::EMERGENCY)));
    }

    pub fn exit_vehicle(&mut self) {
        self.host().set_occupancy(None);
    }

    /// Run one frame with the toggle held, then one with it released.
    pub fn tap_toggle(&mut self) {
        self.held = vec![Control::VEHICLE_DUCK];
        self.frame();
        self.held.clear();
        self.frame();
    }

    pub fn frame(&mut self) -> TickSummary {
        let held = self.held.clone();
        self.host().hold(&held);
        self.core.frame(FRAME)
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame();
        }
    }

    pub fn radar_displayed(&self) -> bool {
        self.core.context().radar_state().is_displayed()
    }

    pub fn controller_visible(&self) -> bool {
        self.core.context().controller().is_visible()
    }

    /// Drain the overlay and return the decoded envelopes.
    pub fn drain_messages(&self) -> Vec<Value> {
        self.outbox
            .drain()
            .iter()
            .map(|line| serde_json::from_str(line).expect("overlay message is JSON"))
            .collect()
    }
}
