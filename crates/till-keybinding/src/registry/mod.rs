//! The session-wide keybinding registry.
//!
//! Owns every registered zone, the single active-zone pointer, the
//! activation history, and the shared key-down source that fans out to one
//! pipeline per zone. All zone state is private; callers go through the
//! methods here (or a [`KeybindingZone`](crate::KeybindingZone) handle).

mod dispatch;
mod state;


use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use till_common::ActionItem;
use till_config::KeybindingConfig;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::hooks::{HookId, HookList, PayloadHook, PayloadRequest, PendingAction, PendingActionHook};
use crate::keymap::{parse, KeyLike};
use crate::switch::KeybindingSwitch;
use crate::zone::{closed_stream, KeybindingEvent, Zone, ZoneEvents, ZoneNotice};

pub use dispatch::DispatchOutcome;

use state::{build_cache, derive_actions, RegistryState, ZoneEntry};

struct RegistryInner {
    switch: KeybindingSwitch,
    ignore_repeats: bool,
    event_capacity: usize,
    state: RefCell<RegistryState>,
    payload_hooks: HookList<PayloadHook>,
    pending_hooks: HookList<PendingActionHook>,
    next_hook: Cell<u64>,
    notices: broadcast::Sender<ZoneNotice>,
    key_downs: broadcast::Sender<KeybindingEvent>,
    shutdown: CancellationToken,
}

/// Shared handle to the registry. Clones refer to the same registry.
#[derive(Clone)]
pub struct KeybindingRegistry {
    inner: Rc<RegistryInner>,
}

impl KeybindingRegistry {
    pub fn new(switch: KeybindingSwitch, config: &KeybindingConfig) -> Self {
        let event_capacity = config.event_capacity.max(1);
        let (notices, _) = broadcast::channel(event_capacity);
        let (key_downs, _) = broadcast::channel(event_capacity);
        Self {
            inner: Rc::new(RegistryInner {
                switch,
                ignore_repeats: config.ignore_repeats,
                event_capacity,
                state: RefCell::new(RegistryState::new(config.history_limit)),
                payload_hooks: HookList::new(),
                pending_hooks: HookList::new(),
                next_hook: Cell::new(0),
                notices,
                key_downs,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn switch(&self) -> &KeybindingSwitch {
        &self.inner.switch
    }

    fn enabled(&self) -> bool {
        self.inner.switch.is_enabled() && !self.inner.shutdown.is_cancelled()
    }

    /// Registers a zone and starts its pipeline.
    ///
    /// The pipeline consumes key-downs from now on whether or not anyone
    /// holds the returned stream. Registering an id that is already
    /// registered updates that zone instead.
    pub fn register(&self, zone: impl Into<Zone>) -> ZoneEvents {
        let mut zone = zone.into();
        if !self.enabled() {
            debug!("keybindings disabled, not registering zone '{}'", zone.id);
            return closed_stream();
        }
        if zone.id.is_empty() {
            warn!("cannot register a keybinding zone without an id");
            return closed_stream();
        }
        if self.is_registered(&zone.id) {
            warn!("keybinding zone '{}' is already registered, updating it", zone.id);
            return self.update(zone);
        }

        derive_actions(&mut zone);
        let (pipeline, receiver) = broadcast::channel(self.inner.event_capacity);
        let id = zone.id.clone();
        debug!("registering keybinding zone '{id}' ({} actions)", zone.actions.len());

        let entry = ZoneEntry {
            cache: build_cache(&zone.actions),
            zone,
            pipeline,
            recent: VecDeque::with_capacity(self.inner.event_capacity),
            stop: self.inner.shutdown.child_token(),
        };
        let mut state = self.inner.state.borrow_mut();
        state.order.push(id.clone());
        state.zones.insert(id, entry);
        ZoneEvents::new(receiver)
    }

    /// Replaces a registered zone, keeping its pipeline and subscribers.
    ///
    /// The returned stream replays the zone's recent events like
    /// [`key_down_zone_action_events`](Self::key_down_zone_action_events).
    pub fn update(&self, zone: Zone) -> ZoneEvents {
        let mut zone = zone;
        if !self.enabled() {
            debug!("keybindings disabled, not updating zone '{}'", zone.id);
            return closed_stream();
        }
        derive_actions(&mut zone);

        let mut state = self.inner.state.borrow_mut();
        let Some(entry) = state.zones.get_mut(&zone.id) else {
            warn!("cannot update unknown keybinding zone '{}'", zone.id);
            return closed_stream();
        };
        debug!("updating keybinding zone '{}' ({} actions)", zone.id, zone.actions.len());
        entry.replace_zone(zone);
        entry.subscribe()
    }

    /// Deactivates (if active), stops the pipeline, and forgets the zone.
    pub fn unregister(&self, zone_id: &str) -> Option<Zone> {
        if !self.is_registered(zone_id) {
            warn!("cannot unregister unknown keybinding zone '{zone_id}'");
            return None;
        }
        if self.is_active(zone_id) {
            self.deactivate(zone_id);
        }

        let mut state = self.inner.state.borrow_mut();
        if let Some(entry) = state.zones.get(zone_id) {
            entry.stop.cancel();
        }
        let entry = state.remove(zone_id)?;
        debug!("unregistered keybinding zone '{zone_id}'");
        Some(entry.zone)
    }

    /// Makes `zone_id` the single active zone, deactivating any other first.
    pub fn activate(&self, zone_id: &str) {
        let current = self.inner.state.borrow().active.clone();
        match current {
            Some(current) if current == zone_id => {
                debug!("keybinding zone '{zone_id}' is already active");
                return;
            }
            Some(current) => self.deactivate(&current),
            None => {}
        }

        {
            let mut state = self.inner.state.borrow_mut();
            if !state.zones.contains_key(zone_id) {
                warn!("cannot activate unknown keybinding zone '{zone_id}'");
                return;
            }
            state.active = Some(zone_id.to_string());
            state.record_activation(zone_id);
        }
        debug!("activated keybinding zone '{zone_id}'");
        let _ = self
            .inner
            .notices
            .send(ZoneNotice::Activated(zone_id.to_string()));
    }

    /// Deactivates `zone_id`, which must be the active zone.
    pub fn deactivate(&self, zone_id: &str) {
        {
            let mut state = self.inner.state.borrow_mut();
            if !state.zones.contains_key(zone_id) {
                warn!("cannot deactivate unknown keybinding zone '{zone_id}'");
                return;
            }
            match state.active.as_deref() {
                None => {
                    warn!("cannot deactivate '{zone_id}': no keybinding zone is active");
                    return;
                }
                Some(active) if active != zone_id => {
                    warn!("cannot deactivate '{zone_id}': active keybinding zone is '{active}'");
                    return;
                }
                Some(_) => state.active = None,
            }
        }
        debug!("deactivated keybinding zone '{zone_id}'");
        let _ = self
            .inner
            .notices
            .send(ZoneNotice::Deactivated(zone_id.to_string()));
    }

    /// Deactivates the current zone and reactivates the one active before it.
    pub fn restore_previous_activation(&self) {
        if let Some(active) = self.active_zone_id() {
            self.deactivate(&active);
        }

        let previous = self
            .inner
            .state
            .borrow()
            .previous_activation()
            .map(str::to_string);
        match previous {
            Some(previous) if self.is_registered(&previous) => self.activate(&previous),
            Some(previous) => {
                debug!("previous keybinding zone '{previous}' is no longer registered")
            }
            None => debug!("no previous keybinding zone activation to restore"),
        }
    }

    pub fn is_registered(&self, zone_id: &str) -> bool {
        self.inner.state.borrow().zones.contains_key(zone_id)
    }

    pub fn is_active(&self, zone_id: &str) -> bool {
        self.inner.state.borrow().is_active(zone_id)
    }

    pub fn active_zone_id(&self) -> Option<String> {
        self.inner.state.borrow().active.clone()
    }

    pub fn active_zone(&self) -> Option<Zone> {
        let state = self.inner.state.borrow();
        let id = state.active.as_deref()?;
        state.zones.get(id).map(|entry| entry.zone.clone())
    }

    pub fn zone(&self, zone_id: &str) -> Option<Zone> {
        self.inner
            .state
            .borrow()
            .zones
            .get(zone_id)
            .map(|entry| entry.zone.clone())
    }

    pub fn zone_ids(&self) -> Vec<String> {
        self.inner.state.borrow().order.clone()
    }

    /// Appends an action to a registered zone.
    pub fn add_keybinding(&self, zone_id: &str, item: ActionItem) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let Some(entry) = state.zones.get_mut(zone_id) else {
            warn!("cannot add keybinding to unknown zone '{zone_id}'");
            return false;
        };
        entry.zone.actions.push(item);
        entry.rebuild_cache();
        true
    }

    /// Removes the zone's actions with the same name and keybind as `item`.
    pub fn remove_keybinding(&self, zone_id: &str, item: &ActionItem) -> bool {
        let mut state = self.inner.state.borrow_mut();
        let Some(entry) = state.zones.get_mut(zone_id) else {
            warn!("cannot remove keybinding from unknown zone '{zone_id}'");
            return false;
        };
        let target = keybind_chords(item);
        let before = entry.zone.actions.len();
        entry
            .zone
            .actions
            .retain(|a| !(a.action == item.action && keybind_chords(a) == target));
        let removed = entry.zone.actions.len() != before;
        if removed {
            entry.rebuild_cache();
        }
        removed
    }

    /// `true` when the zone has an action bound to `key`.
    pub fn zone_has_key<K: KeyLike + ?Sized>(&self, zone_id: &str, key: &K) -> bool {
        let Some(normalized) = key.normalized_key() else {
            return false;
        };
        self.inner
            .state
            .borrow()
            .zones
            .get(zone_id)
            .is_some_and(|entry| entry.cache.contains_key(&normalized))
    }

    /// Matched events of one zone's pipeline. Closed for an unknown zone.
    ///
    /// The stream starts with the last `event_capacity` events the pipeline
    /// dispatched, so a consumer attaching after registration does not miss
    /// them.
    pub fn key_down_zone_action_events(&self, zone_id: &str) -> ZoneEvents {
        match self.inner.state.borrow().zones.get(zone_id) {
            Some(entry) => entry.subscribe(),
            None => {
                warn!("no keybinding pipeline for unknown zone '{zone_id}'");
                closed_stream()
            }
        }
    }

    /// Every key-down, resolved against whichever zone is active at the time.
    pub fn key_down_events(&self) -> ZoneEvents {
        ZoneEvents::new(self.inner.key_downs.subscribe())
    }

    pub fn zone_notices(&self) -> broadcast::Receiver<ZoneNotice> {
        self.inner.notices.subscribe()
    }

    /// Adds a payload provider hook.
    pub fn on_payload_request<F>(&self, hook: F) -> HookId
    where
        F: FnMut(&mut PayloadRequest) -> Result<(), till_common::KeybindingError> + 'static,
    {
        let id = self.next_hook_id();
        self.inner.payload_hooks.add(id, Box::new(hook));
        id
    }

    /// Adds a pending-action hook; setting `cancel` vetoes the action.
    pub fn on_pending_action<F>(&self, hook: F) -> HookId
    where
        F: FnMut(&mut PendingAction) + 'static,
    {
        let id = self.next_hook_id();
        self.inner.pending_hooks.add(id, Box::new(hook));
        id
    }

    pub fn remove_hook(&self, id: HookId) -> bool {
        self.inner.payload_hooks.remove(id) || self.inner.pending_hooks.remove(id)
    }

    fn next_hook_id(&self) -> HookId {
        let id = self.inner.next_hook.get() + 1;
        self.inner.next_hook.set(id);
        HookId(id)
    }

    /// The session-wide teardown token; every zone pipeline is its child.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Stops every pipeline. Nothing is dispatched afterwards.
    pub fn shutdown(&self) {
        debug!("shutting down keybinding registry");
        self.inner.shutdown.cancel();
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new(KeybindingSwitch::default(), &KeybindingConfig::default())
    }
}

fn keybind_chords(item: &ActionItem) -> Vec<String> {
    item.keybind
        .as_deref()
        .map(|spec| parse(spec).iter().map(|c| c.normalized()).collect())
        .unwrap_or_default()
}
