//! Messages pushed by the transaction server over the session connection.
//!
//! Only the fields the client core routes on are typed; everything else
//! stays in `body` as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Screen,
    Dialog,
    LifeCycleEvent,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeCycleEventType {
    DialogOpening,
    DialogClosing,
    #[serde(other)]
    Other,
}

/// A tagged server message such as `{"type": "Screen", "id": "sale", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl SessionMessage {
    pub fn new(kind: MessageType, id: Option<&str>) -> Self {
        Self {
            kind,
            id: id.map(str::to_string),
            body: Map::new(),
        }
    }

    pub fn screen(id: &str) -> Self {
        Self::new(MessageType::Screen, Some(id))
    }

    pub fn dialog(id: &str) -> Self {
        Self::new(MessageType::Dialog, Some(id))
    }

    pub fn life_cycle(event: LifeCycleEventType) -> Self {
        let mut msg = Self::new(MessageType::LifeCycleEvent, None);
        if let Ok(value) = serde_json::to_value(event) {
            msg.body.insert("eventType".into(), value);
        }
        msg
    }

    pub fn with_field(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    /// `true` for the screen/dialog pushes that carry actionable UI.
    pub fn is_ui_push(&self) -> bool {
        matches!(self.kind, MessageType::Screen | MessageType::Dialog)
    }

    pub fn event_type(&self) -> Option<LifeCycleEventType> {
        if self.kind != MessageType::LifeCycleEvent {
            return None;
        }
        self.body
            .get("eventType")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// The server's explicit `willUnblock` declaration, if present.
    pub fn will_unblock(&self) -> Option<bool> {
        self.body.get("willUnblock").and_then(Value::as_bool)
    }

    /// The whole message as a JSON tree.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Fan-out of inbound session messages to every interested consumer.
pub struct MessageBus {
    sender: broadcast::Sender<SessionMessage>,
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionMessage> {
        self.sender.subscribe()
    }

    pub fn publish(&self, message: SessionMessage) -> usize {
        tracing::trace!("publishing {:?} message {:?}", message.kind, message.id);
        self.sender.send(message).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_screen_message() {
        let msg: SessionMessage = serde_json::from_value(json!({
            "type": "Screen",
            "id": "sale",
            "screenType": "Sale",
            "willUnblock": false
        }))
        .unwrap();

        assert_eq!(msg.kind, MessageType::Screen);
        assert_eq!(msg.id.as_deref(), Some("sale"));
        assert_eq!(msg.will_unblock(), Some(false));
        assert!(msg.is_ui_push());
    }

    #[test]
    fn unknown_type_is_other() {
        let msg: SessionMessage =
            serde_json::from_value(json!({"type": "Toast", "message": "hi"})).unwrap();
        assert_eq!(msg.kind, MessageType::Other);
        assert!(msg.id.is_none());
        assert!(!msg.is_ui_push());
    }

    #[test]
    fn life_cycle_event_type() {
        let msg = SessionMessage::life_cycle(LifeCycleEventType::DialogClosing);
        assert_eq!(msg.event_type(), Some(LifeCycleEventType::DialogClosing));

        let msg: SessionMessage = serde_json::from_value(
            json!({"type": "LifeCycleEvent", "eventType": "SomethingElse"}),
        )
        .unwrap();
        assert_eq!(msg.event_type(), Some(LifeCycleEventType::Other));

        assert_eq!(SessionMessage::screen("s").event_type(), None);
    }

    #[test]
    fn to_value_keeps_type_id_and_body() {
        let msg = SessionMessage::dialog("confirm").with_field("title", json!("Void?"));
        assert_eq!(
            msg.to_value(),
            json!({"type": "Dialog", "id": "confirm", "title": "Void?"})
        );
    }

    #[tokio::test]
    async fn bus_fans_out_to_subscribers() {
        let bus = MessageBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(SessionMessage::screen("home")), 2);

        assert_eq!(rx1.recv().await.unwrap().id.as_deref(), Some("home"));
        assert_eq!(rx2.recv().await.unwrap().id.as_deref(), Some("home"));
    }

    #[test]
    fn publish_without_subscribers_returns_zero() {
        let bus = MessageBus::new(8);
        assert_eq!(bus.publish(SessionMessage::screen("home")), 0);
    }
}
