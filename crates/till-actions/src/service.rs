//! The concrete action gate.
//!
//! State machine per session:
//!
//! * idle: actions are sent straight away.
//! * blocked: a sent action awaits its response. New actions are refused,
//!   except `queueIfBlocked` ones which take the single queue slot.
//! * confirming: an item's confirmation dialog is open. Counts as blocked.
//!
//! `unblock` (usually triggered by `handle_message`) returns to idle and
//! replays the queued action, if any.

use std::cell::RefCell;

use serde_json::Value;
use till_common::{ActionError, ActionGate, ActionItem, SessionMessage};
use till_config::ActionConfig;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::disablers::DisablerSet;
use crate::outbound::{ActionOutcome, OutboundAction};

#[derive(Debug, Default)]
struct GateState {
    blocked: bool,
    queued: Option<(ActionItem, Option<Value>)>,
    confirming: Option<(ActionItem, Option<Value>)>,
}

pub struct ActionService {
    default_block_for_response: bool,
    outbound: mpsc::UnboundedSender<OutboundAction>,
    state: RefCell<GateState>,
    disablers: RefCell<DisablerSet>,
}

impl ActionService {
    pub fn new(config: &ActionConfig) -> (Self, mpsc::UnboundedReceiver<OutboundAction>) {
        let (outbound, receiver) = mpsc::unbounded_channel();
        let service = Self {
            default_block_for_response: config.default_block_for_response,
            outbound,
            state: RefCell::new(GateState::default()),
            disablers: RefCell::new(DisablerSet::new()),
        };
        (service, receiver)
    }

    /// Sends, queues, refuses or parks `item` for confirmation.
    ///
    /// `payload` falls back to the item's `defaultPayload`.
    pub fn do_action(&self, item: &ActionItem, payload: Option<Value>) -> ActionOutcome {
        if !item.is_enabled() || self.action_is_disabled(&item.action) {
            debug!("action '{}' is disabled", item.action);
            return ActionOutcome::Disabled;
        }
        let payload = payload.or_else(|| item.default_payload.clone());

        if self.action_blocked() {
            if item.queues_if_blocked() {
                let mut state = self.state.borrow_mut();
                if let Some((replaced, _)) = state.queued.replace((item.clone(), payload)) {
                    debug!("queued action '{}' replaces '{}'", item.action, replaced.action);
                } else {
                    debug!("queued action '{}' until unblocked", item.action);
                }
                return ActionOutcome::Queued;
            }
            debug!("action '{}' refused while blocked", item.action);
            return ActionOutcome::Blocked;
        }

        if item.requires_confirmation() {
            let dialog = item.confirmation_dialog.clone().unwrap_or(Value::Null);
            self.state.borrow_mut().confirming = Some((item.clone(), payload));
            let request = OutboundAction::ConfirmationRequested {
                item: item.clone(),
                dialog,
            };
            if self.outbound.send(request).is_err() {
                warn!("outbound channel closed, cannot confirm action '{}'", item.action);
                self.state.borrow_mut().confirming = None;
                return ActionOutcome::Dropped;
            }
            return ActionOutcome::AwaitingConfirmation;
        }

        match self.send(item.clone(), payload) {
            Ok(()) => ActionOutcome::Sent,
            Err(e) => {
                warn!("{e}");
                ActionOutcome::Dropped
            }
        }
    }

    fn send(&self, item: ActionItem, payload: Option<Value>) -> Result<(), ActionError> {
        let blocks = match item.do_not_block_for_response {
            Some(skip) => !skip,
            None => self.default_block_for_response,
        };
        let name = item.action.clone();
        self.outbound
            .send(OutboundAction::Send { item, payload })
            .map_err(|_| ActionError::ChannelClosed(name.clone()))?;
        if blocks {
            self.state.borrow_mut().blocked = true;
        }
        info!("sent action '{name}'");
        Ok(())
    }

    /// Clears the blocked state and replays the queued action.
    pub fn unblock(&self) -> Option<ActionOutcome> {
        let queued = {
            let mut state = self.state.borrow_mut();
            if state.blocked {
                debug!("actions unblocked");
            }
            state.blocked = false;
            if state.confirming.is_some() {
                return None;
            }
            state.queued.take()
        };
        let (item, payload) = queued?;
        debug!("replaying queued action '{}'", item.action);
        Some(self.do_action(&item, payload))
    }

    /// Unblocks on the responses the server says should unblock.
    ///
    /// A screen or dialog push unblocks unless it carries
    /// `willUnblock: false`; other messages only with `willUnblock: true`.
    pub fn handle_message(&self, message: &SessionMessage) -> Option<ActionOutcome> {
        let unblocks = match message.will_unblock() {
            Some(explicit) => explicit,
            None => message.is_ui_push(),
        };
        if unblocks {
            self.unblock()
        } else {
            None
        }
    }

    /// Completes the open confirmation. A declined confirmation lets a
    /// queued action through.
    pub fn resolve_confirmation(&self, confirmed: bool) -> Result<ActionOutcome, ActionError> {
        let (item, payload) = self
            .state
            .borrow_mut()
            .confirming
            .take()
            .ok_or(ActionError::NothingPending)?;
        if confirmed {
            self.send(item, payload)?;
            return Ok(ActionOutcome::Sent);
        }
        debug!("confirmation for action '{}' declined", item.action);
        if !self.state.borrow().blocked {
            self.unblock();
        }
        Ok(ActionOutcome::Cancelled)
    }

    pub fn register_action_disabler(&self, action: &str, disabled: watch::Receiver<bool>) {
        self.disablers.borrow_mut().register(action, disabled);
    }

    pub fn remove_action_disabler(&self, action: &str) -> bool {
        self.disablers.borrow_mut().remove(action)
    }

    pub fn action_is_disabled(&self, action: &str) -> bool {
        self.disablers.borrow().is_disabled(action)
    }

    pub fn action_is_disabled_watch(&self, action: &str) -> watch::Receiver<bool> {
        self.disablers.borrow().watch(action)
    }

    pub fn action_blocked(&self) -> bool {
        let state = self.state.borrow();
        state.blocked || state.confirming.is_some()
    }

    pub fn has_queued_action(&self) -> bool {
        self.state.borrow().queued.is_some()
    }
}

impl ActionGate for ActionService {
    fn do_action(&self, item: &ActionItem, payload: Option<Value>) {
        let outcome = ActionService::do_action(self, item, payload);
        debug!("action '{}' resolved as {outcome:?}", item.action);
    }

    fn action_blocked(&self) -> bool {
        ActionService::action_blocked(self)
    }

    fn action_is_disabled(&self, action: &str) -> bool {
        ActionService::action_is_disabled(self, action)
    }
}
