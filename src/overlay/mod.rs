//! One-way channel to the rendered overlay.
//!
//! Messages are encoded as a `{type, data}` JSON envelope and handed to the
//! host transport verbatim. Delivery is fire-and-forget: no chunking, no
//! acknowledgement, no retry.

mod messages;
mod requests;

pub use messages::{
    MessageType, OverlayEnvelope, OverlayMessage, SpeedReadingPayload, UnitsPayload,
    VisibilityPayload, encode_envelope,
};
pub use requests::{OverlayRequest, decode_request};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;

use crate::Result;
use crate::logging::{LogLevel, Logger, emit, json_kv};
use crate::metrics::CoreMetrics;

const TARGET: &str = "rs9000::overlay";

/// Host transport for whole overlay messages.
///
/// An unavailable transport swallows the message; reporting that failure is
/// the host's job.
pub trait OverlayTransport {
    fn send_nui_message(&mut self, message: &str);
}

/// Transport that buffers messages until drained. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct QueueTransport {
    queue: Rc<RefCell<VecDeque<String>>>,
}

impl QueueTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<String> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl OverlayTransport for QueueTransport {
    fn send_nui_message(&mut self, message: &str) {
        self.queue.borrow_mut().push_back(message.to_string());
    }
}

pub struct OverlayChannel {
    transport: Box<dyn OverlayTransport>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<CoreMetrics>>>,
    sent: u64,
}

impl OverlayChannel {
    pub fn new<T>(transport: T) -> Self
    where
        T: OverlayTransport + 'static,
    {
        Self {
            transport: Box::new(transport),
            logger: None,
            metrics: None,
            sent: 0,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Mutex<CoreMetrics>>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Encode `data` under `kind` and hand it to the transport.
    pub fn send<T: Serialize>(&mut self, kind: MessageType, data: &T) -> Result<()> {
        let text = encode_envelope(kind, data)?;
        self.deliver(kind, &text);
        Ok(())
    }

    pub fn publish(&mut self, message: &OverlayMessage) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.deliver(message.kind(), &text);
        Ok(())
    }

    /// Messages handed to the transport so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    fn deliver(&mut self, kind: MessageType, text: &str) {
        self.transport.send_nui_message(text);
        self.sent = self.sent.saturating_add(1);
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_overlay_message();
            }
        }
        emit(
            self.logger.as_ref(),
            LogLevel::Trace,
            TARGET,
            "message_sent",
            [
                json_kv("type", json!(kind)),
                json_kv("bytes", json!(text.len())),
            ],
        );
    }
}
