use std::rc::Rc;

use till_common::{ActionGate, MessageType, SessionMessage};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::feed::FeedSubscription;
use crate::registry::KeybindingRegistry;
use crate::zone::Zone;
use crate::zone_handle::KeybindingZone;

/// Keeps one zone in step with the screen (or dialog) pushes of one type.
pub struct ZoneScreenBinder {
    zone: KeybindingZone,
    message_type: MessageType,
    message_id: Option<String>,
    action_gate: Option<Rc<dyn ActionGate>>,
}

impl ZoneScreenBinder {
    pub fn new(
        registry: KeybindingRegistry,
        message_type: MessageType,
        action_gate: Option<Rc<dyn ActionGate>>,
    ) -> Self {
        Self {
            zone: KeybindingZone::new(registry),
            message_type,
            message_id: None,
            action_gate,
        }
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Id of the message the zone was last built from.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn zone(&self) -> &KeybindingZone {
        &self.zone
    }

    pub fn zone_mut(&mut self) -> &mut KeybindingZone {
        &mut self.zone
    }

    pub fn handle_message(&mut self, message: &SessionMessage) {
        if !message.is_ui_push() {
            return;
        }
        // A push of the other type covers this zone. It stays registered,
        // since nothing will re-send it when a client-side overlay closes.
        if message.kind != self.message_type {
            if self.zone.is_active() {
                debug!(
                    "{:?} push covers {:?} zone {:?}, deactivating",
                    message.kind, self.message_type, self.message_id
                );
                self.zone.deactivate();
            }
            return;
        }
        let Some(id) = message.id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("ignoring {:?} push without an id", message.kind);
            return;
        };

        if !self.zone.is_registered() {
            debug!("registering zone for {:?} '{id}'", self.message_type);
            self.bind(message, id);
        } else if self.message_id.as_deref() != Some(id) {
            debug!(
                "{:?} '{id}' replaces {:?}, re-registering",
                self.message_type, self.message_id
            );
            self.zone.unregister();
            self.bind(message, id);
        } else if self.zone.is_active() {
            self.zone.update(self.zone_for(message, id));
        } else {
            debug!("reactivating zone for {:?} '{id}'", self.message_type);
            self.zone.activate();
        }
    }

    fn bind(&mut self, message: &SessionMessage, id: &str) {
        self.message_id = Some(id.to_string());
        let zone = self.zone_for(message, id);
        self.zone.register(zone);
        self.zone.activate();
    }

    fn zone_for(&self, message: &SessionMessage, id: &str) -> Zone {
        let zone = Zone::new(id).with_actions_obj(message.to_value());
        match &self.action_gate {
            Some(gate) => zone.with_action_gate(Rc::clone(gate)),
            None => zone,
        }
    }

    /// Handles every message already buffered on `feed`.
    pub fn drain(&mut self, feed: &mut FeedSubscription) -> usize {
        let mut handled = 0;
        while let Some(message) = feed.try_next() {
            self.handle_message(&message);
            handled += 1;
        }
        handled
    }

    /// Follows `feed` until it closes or `cancel` fires.
    pub async fn run(&mut self, mut feed: FeedSubscription, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                message = feed.next() => match message {
                    Some(message) => self.handle_message(&message),
                    None => break,
                },
            }
        }
        debug!("{:?} binder stopped", self.message_type);
    }
}
