use std::collections::VecDeque;

use till_common::{LifeCycleEventType, MessageType, SessionMessage};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, trace, warn};

/// The current screen and the current dialog, each latched to the most
/// recent push, merged into one stream.
pub struct ScreenDialogFeed {
    screen: Option<SessionMessage>,
    dialog: Option<SessionMessage>,
    sender: broadcast::Sender<SessionMessage>,
}

impl ScreenDialogFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            screen: None,
            dialog: None,
            sender,
        }
    }

    /// Routes one inbound session message.
    ///
    /// Screen and dialog pushes are latched and forwarded. A `DialogClosing`
    /// life-cycle event clears the dialog latch and re-sends the latched
    /// screen. Anything else is ignored.
    pub fn publish(&mut self, message: &SessionMessage) {
        match message.kind {
            MessageType::Screen => {
                self.screen = Some(message.clone());
                self.forward(message.clone());
            }
            MessageType::Dialog => {
                self.dialog = Some(message.clone());
                self.forward(message.clone());
            }
            MessageType::LifeCycleEvent
                if message.event_type() == Some(LifeCycleEventType::DialogClosing) =>
            {
                debug!("dialog closing, restoring latched screen");
                self.dialog = None;
                if let Some(screen) = self.screen.clone() {
                    self.forward(screen);
                }
            }
            _ => trace!("feed ignoring {:?} message", message.kind),
        }
    }

    fn forward(&self, message: SessionMessage) {
        let _ = self.sender.send(message);
    }

    /// Live messages, preceded by the latched screen and then dialog.
    pub fn subscribe(&self) -> FeedSubscription {
        let replay = self.screen.iter().chain(self.dialog.iter()).cloned().collect();
        FeedSubscription {
            replay,
            receiver: self.sender.subscribe(),
        }
    }

    pub fn latest_screen(&self) -> Option<&SessionMessage> {
        self.screen.as_ref()
    }

    pub fn latest_dialog(&self) -> Option<&SessionMessage> {
        self.dialog.as_ref()
    }
}

pub struct FeedSubscription {
    replay: VecDeque<SessionMessage>,
    receiver: broadcast::Receiver<SessionMessage>,
}

impl FeedSubscription {
    pub fn try_next(&mut self) -> Option<SessionMessage> {
        if let Some(message) = self.replay.pop_front() {
            return Some(message);
        }
        loop {
            match self.receiver.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("screen/dialog feed lagged by {skipped} messages");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// `None` once the feed is dropped.
    pub async fn next(&mut self) -> Option<SessionMessage> {
        if let Some(message) = self.replay.pop_front() {
            return Some(message);
        }
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("screen/dialog feed lagged by {skipped} messages");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(sub: &mut FeedSubscription) -> Vec<String> {
        std::iter::from_fn(|| sub.try_next())
            .map(|m| format!("{:?}:{}", m.kind, m.id.unwrap_or_default()))
            .collect()
    }

    #[test]
    fn subscribe_replays_screen_then_dialog() {
        let mut feed = ScreenDialogFeed::new(8);
        feed.publish(&SessionMessage::dialog("confirm"));
        feed.publish(&SessionMessage::screen("sale"));

        let mut sub = feed.subscribe();
        feed.publish(&SessionMessage::screen("tender"));

        assert_eq!(ids(&mut sub), ["Screen:sale", "Dialog:confirm", "Screen:tender"]);
    }

    #[test]
    fn dialog_closing_clears_dialog_and_resends_screen() {
        let mut feed = ScreenDialogFeed::new(8);
        feed.publish(&SessionMessage::screen("sale"));
        feed.publish(&SessionMessage::dialog("confirm"));
        let mut sub = feed.subscribe();
        ids(&mut sub);

        feed.publish(&SessionMessage::life_cycle(LifeCycleEventType::DialogClosing));

        assert!(feed.latest_dialog().is_none());
        assert_eq!(feed.latest_screen().and_then(|m| m.id.as_deref()), Some("sale"));
        assert_eq!(ids(&mut sub), ["Screen:sale"]);
    }

    #[test]
    fn other_messages_are_not_forwarded() {
        let mut feed = ScreenDialogFeed::new(8);
        let mut sub = feed.subscribe();
        feed.publish(&SessionMessage::new(MessageType::Other, None));
        feed.publish(&SessionMessage::life_cycle(LifeCycleEventType::DialogOpening));
        feed.publish(&SessionMessage::life_cycle(LifeCycleEventType::DialogClosing));
        assert!(sub.try_next().is_none());
    }

    #[tokio::test]
    async fn next_ends_when_feed_is_dropped() {
        let mut feed = ScreenDialogFeed::new(8);
        feed.publish(&SessionMessage::screen("sale"));
        let mut sub = feed.subscribe();
        drop(feed);

        assert_eq!(sub.next().await.and_then(|m| m.id), Some("sale".to_string()));
        assert!(sub.next().await.is_none());
    }
}
