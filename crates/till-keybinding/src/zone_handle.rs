//! Per-consumer handle bound to a single zone id.
//!
//! UI components own a [`KeybindingZone`] instead of talking to the registry
//! directly. The handle remembers which id it registered, tears down its own
//! hooks and derived streams on [`KeybindingZone::unregister`], and
//! unregisters on drop.

use std::fmt::Display;

use serde_json::Value;
use till_common::{ActionItem, KeybindingError};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::hooks::HookId;
use crate::registry::KeybindingRegistry;
use crate::zone::{closed_stream, KeybindingEvent, Zone, ZoneEvents};

pub struct KeybindingZone {
    registry: KeybindingRegistry,
    zone_id: Option<String>,
    done: CancellationToken,
    hooks: Vec<HookId>,
}

impl KeybindingZone {
    pub fn new(registry: KeybindingRegistry) -> Self {
        let done = registry.shutdown_token().child_token();
        Self {
            registry,
            zone_id: None,
            done,
            hooks: Vec::new(),
        }
    }

    /// The bound zone id, once `register` has been called.
    pub fn id(&self) -> Option<&str> {
        self.zone_id.as_deref()
    }

    pub fn registry(&self) -> &KeybindingRegistry {
        &self.registry
    }

    /// Binds the handle to `zone.id` and registers it.
    ///
    /// A handle bound to another id tears that binding down first: its
    /// hooks and streams end, and the old zone is unregistered if it is
    /// still registered.
    pub fn register(&mut self, zone: impl Into<Zone>) -> ZoneEvents {
        let zone = zone.into();
        if zone.id.is_empty() {
            warn!("cannot register a keybinding zone handle without an id");
            return closed_stream();
        }
        if self.zone_id.as_deref().is_some_and(|id| id != zone.id) {
            self.unregister();
        }
        if self.done.is_cancelled() {
            self.done = self.registry.shutdown_token().child_token();
        }
        self.zone_id = Some(zone.id.clone());
        self.registry.register(zone)
    }

    /// Updates the bound zone. The id of `zone` is replaced by the bound id.
    pub fn update(&self, mut zone: Zone) -> ZoneEvents {
        let Some(id) = &self.zone_id else {
            warn!("cannot update a keybinding zone handle that was never registered");
            return closed_stream();
        };
        zone.id = id.clone();
        self.registry.update(zone)
    }

    /// Unregisters the bound zone if it is still registered, and ends every
    /// stream and hook derived from this handle.
    pub fn unregister(&mut self) -> Option<Zone> {
        for hook in self.hooks.drain(..) {
            self.registry.remove_hook(hook);
        }
        self.done.cancel();

        let id = self.zone_id.as_deref()?;
        if !self.registry.is_registered(id) {
            debug!("keybinding zone '{id}' is already unregistered");
            return None;
        }
        self.registry.unregister(id)
    }

    pub fn activate(&self) {
        match &self.zone_id {
            Some(id) => self.registry.activate(id),
            None => warn!("cannot activate a keybinding zone handle that was never registered"),
        }
    }

    pub fn deactivate(&self) {
        match &self.zone_id {
            Some(id) => self.registry.deactivate(id),
            None => warn!("cannot deactivate a keybinding zone handle that was never registered"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.zone_id
            .as_deref()
            .is_some_and(|id| self.registry.is_active(id))
    }

    pub fn is_registered(&self) -> bool {
        self.zone_id
            .as_deref()
            .is_some_and(|id| self.registry.is_registered(id))
    }

    pub fn add_keybinding(&self, item: ActionItem) -> bool {
        match &self.zone_id {
            Some(id) => self.registry.add_keybinding(id, item),
            None => false,
        }
    }

    pub fn remove_keybinding(&self, item: &ActionItem) -> bool {
        match &self.zone_id {
            Some(id) => self.registry.remove_keybinding(id, item),
            None => false,
        }
    }

    /// Global key-downs that resolved to this handle's zone.
    ///
    /// The stream ends when the handle unregisters, is dropped, or the
    /// registry shuts down.
    pub fn key_down_events(&self) -> ZoneKeyDownStream {
        let Some(id) = &self.zone_id else {
            let done = CancellationToken::new();
            done.cancel();
            return ZoneKeyDownStream {
                rx: closed_stream(),
                zone_id: String::new(),
                done,
            };
        };
        ZoneKeyDownStream {
            rx: self.registry.key_down_events(),
            zone_id: id.clone(),
            done: self.done.clone(),
        }
    }

    /// The bound zone's matched-action pipeline.
    pub fn zone_action_events(&self) -> ZoneEvents {
        match &self.zone_id {
            Some(id) => self.registry.key_down_zone_action_events(id),
            None => closed_stream(),
        }
    }

    /// Supplies the payload for `action` whenever this zone runs it.
    ///
    /// A provider error aborts that one invocation and is logged with the
    /// action name. The hook is removed when the handle unregisters.
    pub fn provide_payload<F, E>(&mut self, action: &str, mut provider: F) -> Option<HookId>
    where
        F: FnMut(&ActionItem) -> Result<Value, E> + 'static,
        E: Display,
    {
        let Some(zone_id) = self.zone_id.clone() else {
            warn!("cannot provide a payload for '{action}' before the zone handle is registered");
            return None;
        };
        let action = action.to_string();
        let hook = self.registry.on_payload_request(move |request| {
            if request.zone_id != zone_id || request.action.action != action {
                return Ok(());
            }
            match provider(&request.action) {
                Ok(payload) => {
                    request.payload = Some(payload);
                    Ok(())
                }
                Err(e) => Err(KeybindingError::PayloadProvider {
                    action: action.clone(),
                    message: e.to_string(),
                }),
            }
        });
        self.hooks.push(hook);
        Some(hook)
    }
}

impl Drop for KeybindingZone {
    fn drop(&mut self) {
        self.unregister();
    }
}

/// Key-downs of the global stream filtered to one zone.
///
/// Backed by a broadcast receiver, so several streams share one dispatch.
pub struct ZoneKeyDownStream {
    rx: ZoneEvents,
    zone_id: String,
    done: CancellationToken,
}

impl ZoneKeyDownStream {
    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Next buffered event for this zone, without waiting.
    pub fn try_next(&mut self) -> Option<KeybindingEvent> {
        if self.done.is_cancelled() {
            return None;
        }
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.zone_id() == Some(self.zone_id.as_str()) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("zone '{}' key-down stream lagged by {skipped} events", self.zone_id);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Waits for the next event for this zone. `None` once the handle is done.
    pub async fn next(&mut self) -> Option<KeybindingEvent> {
        let Self { rx, zone_id, done } = self;
        loop {
            tokio::select! {
                biased;
                _ = done.cancelled() => return None,
                received = rx.recv() => match received {
                    Ok(event) if event.zone_id() == Some(zone_id.as_str()) => return Some(event),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("zone '{zone_id}' key-down stream lagged by {skipped} events");
                    }
                    Err(RecvError::Closed) => return None,
                },
            }
        }
    }
}
