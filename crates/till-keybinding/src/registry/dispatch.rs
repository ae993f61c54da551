//! Key-down dispatch: the shared source, the per-zone pipelines and the
//! action-invocation protocol.
//!
//! Everything here runs synchronously on the caller's stack. The registry
//! state is only borrowed for short lookups and never while user code (hooks,
//! gates) runs, so hooks and gates may freely call back into the registry.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use super::KeybindingRegistry;
use crate::hooks::{PayloadRequest, PendingAction};
use crate::key_event::KeyDown;
use crate::keymap::KeyLike;
use crate::zone::KeybindingEvent;

/// What a key-down amounted to, so the UI layer can decide whether to
/// suppress the native key behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Some zone pipeline claimed the key.
    pub matched: bool,
    /// A matched action was handed to its gate.
    pub did_do_action: bool,
}

impl KeybindingRegistry {
    /// Feeds one physical key-down through the shared source.
    pub fn dispatch_key_down(&self, key: &KeyDown) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        if !self.enabled() {
            trace!("keybindings disabled, dropping key-down");
            return outcome;
        }
        if key.repeat && self.inner.ignore_repeats {
            trace!("dropping auto-repeat key-down");
            return outcome;
        }

        let normalized = key.normalized_key();
        self.emit_global(key, normalized.as_deref());

        let Some(normalized) = normalized else {
            return outcome;
        };

        let pipelines: Vec<(String, CancellationToken)> = {
            let state = self.inner.state.borrow();
            state
                .order
                .iter()
                .filter_map(|id| state.zones.get(id).map(|e| (id.clone(), e.stop.clone())))
                .collect()
        };

        for (zone_id, stop) in pipelines {
            if stop.is_cancelled() {
                continue;
            }
            let Some(mut event) = self.match_zone(&zone_id, key, &normalized) else {
                continue;
            };
            outcome.matched = true;

            self.invoke_action(&mut event, &stop);
            outcome.did_do_action |= event.did_do_action;

            if stop.is_cancelled() {
                continue;
            }
            let limit = self.inner.event_capacity;
            if let Some(entry) = self.inner.state.borrow_mut().zones.get_mut(&zone_id) {
                entry.dispatch(event, limit);
            }
        }
        outcome
    }

    fn emit_global(&self, key: &KeyDown, normalized: Option<&str>) {
        let (zone, action) = {
            let state = self.inner.state.borrow();
            match state.active.as_deref().and_then(|id| state.zones.get(id)) {
                Some(entry) => (
                    Some(entry.zone.clone()),
                    normalized.and_then(|n| entry.cache.get(n).cloned()),
                ),
                None => (None, None),
            }
        };
        let _ = self.inner.key_downs.send(KeybindingEvent {
            key: key.clone(),
            zone,
            action,
            action_payload: None,
            did_do_action: false,
        });
    }

    /// A zone pipeline only passes keys it has an action for, and only while
    /// it is the active zone (or always active).
    fn match_zone(&self, zone_id: &str, key: &KeyDown, normalized: &str) -> Option<KeybindingEvent> {
        let state = self.inner.state.borrow();
        let entry = state.zones.get(zone_id)?;
        let action = entry.cache.get(normalized)?;
        if !(state.is_active(zone_id) || entry.zone.always_active) {
            return None;
        }
        Some(KeybindingEvent {
            key: key.clone(),
            zone: Some(entry.zone.clone()),
            action: Some(action.clone()),
            action_payload: None,
            did_do_action: false,
        })
    }

    fn invoke_action(&self, event: &mut KeybindingEvent, stop: &CancellationToken) {
        let Some(zone) = event.zone.as_ref() else {
            return;
        };
        let zone_id = zone.id.clone();

        if !self.is_active(&zone_id) {
            trace!("zone '{zone_id}' is not active, not running its action");
            return;
        }
        let Some(action) = event.action.clone() else {
            return;
        };
        if !zone.auto_does_action() {
            trace!("zone '{zone_id}' claims '{}' without running it", action.action);
            return;
        }
        if !action.is_enabled() {
            debug!("action '{}' is disabled", action.action);
            return;
        }
        let Some(gate) = zone.action_gate.clone() else {
            trace!("zone '{zone_id}' has no action gate");
            return;
        };
        if gate.action_is_disabled(&action.action) {
            debug!("action '{}' is disabled by its gate", action.action);
            return;
        }

        let mut request = PayloadRequest {
            zone_id: zone_id.clone(),
            action,
            payload: None,
        };
        let mut failure = None;
        let ran = self.inner.payload_hooks.each(|hook| match hook(&mut request) {
            Ok(()) => true,
            Err(e) => {
                failure = Some(e);
                false
            }
        });
        if !ran {
            warn!(
                "nested dispatch inside a payload hook, not running '{}'",
                request.action.action
            );
            return;
        }
        if let Some(e) = failure {
            error!("{e}");
            return;
        }
        event.action = Some(request.action.clone());
        event.action_payload = request.payload.clone();

        if stop.is_cancelled() || !self.is_active(&zone_id) {
            return;
        }
        let mut pending = PendingAction {
            zone_id: zone_id.clone(),
            action: request.action,
            payload: request.payload,
            cancel: false,
        };
        let ran = self.inner.pending_hooks.each(|hook| {
            hook(&mut pending);
            true
        });
        if !ran {
            warn!(
                "nested dispatch inside a pending-action hook, not running '{}'",
                pending.action.action
            );
            return;
        }
        event.action = Some(pending.action.clone());
        event.action_payload = pending.payload.clone();
        if pending.cancel {
            debug!("action '{}' in zone '{zone_id}' was cancelled", pending.action.action);
            return;
        }
        if stop.is_cancelled() {
            return;
        }

        debug!("zone '{zone_id}' running action '{}'", pending.action.action);
        gate.do_action(&pending.action, pending.payload);
        event.did_do_action = true;
    }
}
