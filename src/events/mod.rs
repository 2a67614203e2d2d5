//! Typed application events with insertion-ordered handler lists.

use std::collections::HashMap;

/// Events raised by the core for the embedding application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Text from a confirmed keyboard session. Raised once per session.
    KeyboardResult(String),
    RadarDisplayChanged(bool),
    ControllerVisibilityChanged(bool),
}

impl AppEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AppEvent::KeyboardResult(_) => EventKind::KeyboardResult,
            AppEvent::RadarDisplayChanged(_) => EventKind::RadarDisplayChanged,
            AppEvent::ControllerVisibilityChanged(_) => EventKind::ControllerVisibilityChanged,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyboardResult,
    RadarDisplayChanged,
    ControllerVisibilityChanged,
}

impl EventKind {
    /// Name used when the event crosses into the host's string-keyed event
    /// system.
    pub const fn wire_name(self) -> &'static str {
        match self {
            EventKind::KeyboardResult => "rs9000:_keyboardResult",
            EventKind::RadarDisplayChanged => "rs9000:_radarDisplayChanged",
            EventKind::ControllerVisibilityChanged => "rs9000:_controllerVisibilityChanged",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Box<dyn FnMut(&AppEvent)>;

#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: FnMut(&AppEvent) + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    pub fn remove(&mut self, id: HandlerId) -> bool {
        for list in self.handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(handler_id, _)| *handler_id == id) {
                drop(list.remove(pos));
                return true;
            }
        }
        false
    }

    /// Invoke every handler registered for the event's kind, in
    /// registration order. Returns how many ran.
    pub fn emit(&mut self, event: &AppEvent) -> usize {
        match self.handlers.get_mut(&event.kind()) {
            Some(list) => {
                for (_, handler) in list.iter_mut() {
                    handler(event);
                }
                list.len()
            }
            None => 0,
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map(Vec::len).unwrap_or(0)
    }
}
