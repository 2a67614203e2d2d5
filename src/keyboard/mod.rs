//! On-screen keyboard request/poll/completion state machine.
//!
//! At most one prompt is open at a time. While a session is awaiting input
//! the runtime polls it once per frame; a terminal status returns the flow
//! to [`KeyboardState::Idle`].

use serde_json::json;

use crate::host::KeyboardHost;
use crate::logging::{LogLevel, Logger, emit, json_kv};

const TARGET: &str = "rs9000::keyboard";

/// Raw host status for an open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardStatus {
    Unset,
    Confirmed,
    Cancelled,
}

impl KeyboardStatus {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(KeyboardStatus::Unset),
            1 => Some(KeyboardStatus::Confirmed),
            2 => Some(KeyboardStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardSession {
    pub character_limit: u32,
    pub initial_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyboardState {
    #[default]
    Idle,
    AwaitingInput(KeyboardSession),
}

/// Result of one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardPoll {
    /// No session is open.
    Idle,
    Waiting,
    Confirmed(String),
    Cancelled,
}

impl KeyboardPoll {
    pub fn is_terminal(&self) -> bool {
        matches!(self, KeyboardPoll::Confirmed(_) | KeyboardPoll::Cancelled)
    }
}

#[derive(Default)]
pub struct KeyboardFlow {
    state: KeyboardState,
    logger: Option<Logger>,
}

impl KeyboardFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> &KeyboardState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, KeyboardState::AwaitingInput(_))
    }

    pub fn session(&self) -> Option<&KeyboardSession> {
        match &self.state {
            KeyboardState::AwaitingInput(session) => Some(session),
            KeyboardState::Idle => None,
        }
    }

    /// Forget an open session without consulting the host. Used at teardown
    /// once the poller is gone.
    pub fn reset(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = KeyboardState::Idle;
        was_active
    }

    /// Open a prompt. Returns `false` without touching the host when one is
    /// already open.
    pub fn start(&mut self, host: &mut dyn KeyboardHost, limit: u32, initial_text: &str) -> bool {
        if self.is_active() {
            emit(
                self.logger.as_ref(),
                LogLevel::Debug,
                TARGET,
                "start_ignored",
                [json_kv("limit", json!(limit))],
            );
            return false;
        }

        host.display_onscreen_keyboard(limit, initial_text);
        self.state = KeyboardState::AwaitingInput(KeyboardSession {
            character_limit: limit,
            initial_text: initial_text.to_string(),
        });
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "prompt_opened",
            [
                json_kv("limit", json!(limit)),
                json_kv("initial_chars", json!(initial_text.chars().count())),
            ],
        );
        true
    }

    /// Query the host once. Status values outside the known set count as
    /// still editing.
    pub fn poll(&mut self, host: &mut dyn KeyboardHost) -> KeyboardPoll {
        if !self.is_active() {
            return KeyboardPoll::Idle;
        }

        let raw = host.update_onscreen_keyboard();
        let status = match KeyboardStatus::from_raw(raw) {
            Some(status) => status,
            None => {
                emit(
                    self.logger.as_ref(),
                    LogLevel::Warn,
                    TARGET,
                    "unknown_status",
                    [json_kv("status", json!(raw))],
                );
                KeyboardStatus::Unset
            }
        };

        let outcome = match status {
            KeyboardStatus::Unset => return KeyboardPoll::Waiting,
            KeyboardStatus::Confirmed => {
                KeyboardPoll::Confirmed(host.onscreen_keyboard_result().unwrap_or_default())
            }
            KeyboardStatus::Cancelled => KeyboardPoll::Cancelled,
        };

        self.state = KeyboardState::Idle;
        emit(
            self.logger.as_ref(),
            LogLevel::Debug,
            TARGET,
            "prompt_closed",
            [json_kv(
                "confirmed",
                json!(matches!(outcome, KeyboardPoll::Confirmed(_))),
            )],
        );
        outcome
    }
}
