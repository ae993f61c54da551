use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use till_common::{ActionGate, ActionItem};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::key_event::KeyDown;

/// A named, independently activatable collection of keyboard actions.
#[derive(Clone, Default)]
pub struct Zone {
    pub id: String,
    /// Receives matched key presses even while another zone is active.
    pub always_active: bool,
    /// Raw source the actions are crawled from, typically a screen payload.
    pub actions_obj: Option<Value>,
    /// Derived from `actions_obj` on register/update when that is present.
    pub actions: Vec<ActionItem>,
    pub action_gate: Option<Rc<dyn ActionGate>>,
    /// `Some(false)` claims matching keys without ever running the action.
    pub auto_do_action: Option<bool>,
}

impl Zone {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_actions(mut self, actions: Vec<ActionItem>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_actions_obj(mut self, source: Value) -> Self {
        self.actions_obj = Some(source);
        self
    }

    pub fn with_action_gate(mut self, gate: Rc<dyn ActionGate>) -> Self {
        self.action_gate = Some(gate);
        self
    }

    pub fn always_active(mut self) -> Self {
        self.always_active = true;
        self
    }

    pub fn with_auto_do_action(mut self, auto: bool) -> Self {
        self.auto_do_action = Some(auto);
        self
    }

    pub fn auto_does_action(&self) -> bool {
        self.auto_do_action != Some(false)
    }
}

impl From<&str> for Zone {
    fn from(id: &str) -> Self {
        Zone::new(id)
    }
}

impl From<String> for Zone {
    fn from(id: String) -> Self {
        Zone::new(id)
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("id", &self.id)
            .field("always_active", &self.always_active)
            .field("actions", &self.actions)
            .field("has_action_gate", &self.action_gate.is_some())
            .field("auto_do_action", &self.auto_do_action)
            .finish()
    }
}

/// What one key-down looked like to one zone pipeline.
#[derive(Debug, Clone)]
pub struct KeybindingEvent {
    pub key: KeyDown,
    /// `None` on the global stream when no zone is active.
    pub zone: Option<Zone>,
    pub action: Option<ActionItem>,
    pub action_payload: Option<Value>,
    pub did_do_action: bool,
}

impl KeybindingEvent {
    pub fn zone_id(&self) -> Option<&str> {
        self.zone.as_ref().map(|z| z.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneNotice {
    Activated(String),
    Deactivated(String),
}

/// A stream of key-down events. A stream for a no-op call is already closed.
///
/// A zone pipeline stream first yields the recent events it was created
/// with, then everything the pipeline dispatches afterwards.
pub struct ZoneEvents {
    backlog: VecDeque<KeybindingEvent>,
    receiver: broadcast::Receiver<KeybindingEvent>,
}

impl ZoneEvents {
    pub(crate) fn new(receiver: broadcast::Receiver<KeybindingEvent>) -> Self {
        Self::with_backlog(VecDeque::new(), receiver)
    }

    pub(crate) fn with_backlog(
        backlog: VecDeque<KeybindingEvent>,
        receiver: broadcast::Receiver<KeybindingEvent>,
    ) -> Self {
        Self { backlog, receiver }
    }

    pub fn try_recv(&mut self) -> Result<KeybindingEvent, TryRecvError> {
        match self.backlog.pop_front() {
            Some(event) => Ok(event),
            None => self.receiver.try_recv(),
        }
    }

    pub async fn recv(&mut self) -> Result<KeybindingEvent, RecvError> {
        match self.backlog.pop_front() {
            Some(event) => Ok(event),
            None => self.receiver.recv().await,
        }
    }
}

pub(crate) fn closed_stream() -> ZoneEvents {
    let (_, receiver) = broadcast::channel(1);
    ZoneEvents::new(receiver)
}
