use std::rc::Rc;

use till_actions::{ActionService, OutboundAction};
use till_common::{ActionGate, MessageBus, MessageType, Result, SessionMessage};
use till_config::TillConfig;
use till_keybinding::{
    FeedSubscription, KeybindingRegistry, KeybindingSwitch, ScreenDialogFeed, ZoneScreenBinder,
};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::script::Step;

/// One till session: registry, action gate and the screen/dialog binders,
/// wired the way the client wires them.
///
/// Inbound messages go through one [`MessageBus`]; the screen/dialog feed and
/// the action service each hold their own subscription, drained in that
/// order so zones are rebound before the gate unblocks.
pub struct Session {
    registry: KeybindingRegistry,
    actions: Rc<ActionService>,
    outbound: mpsc::UnboundedReceiver<OutboundAction>,
    bus: MessageBus,
    feed_inbox: broadcast::Receiver<SessionMessage>,
    actions_inbox: broadcast::Receiver<SessionMessage>,
    feed: ScreenDialogFeed,
    screens: (ZoneScreenBinder, FeedSubscription),
    dialogs: (ZoneScreenBinder, FeedSubscription),
}

impl Session {
    pub fn new(config: &TillConfig) -> Self {
        let switch = KeybindingSwitch::from_config(&config.keybindings);
        let registry = KeybindingRegistry::new(switch, &config.keybindings);
        let (actions, outbound) = ActionService::new(&config.actions);
        let actions = Rc::new(actions);
        let gate = || Some(Rc::clone(&actions) as Rc<dyn ActionGate>);

        let bus = MessageBus::new(config.keybindings.event_capacity.max(1));
        let feed_inbox = bus.subscribe();
        let actions_inbox = bus.subscribe();
        let feed = ScreenDialogFeed::new(config.keybindings.event_capacity);
        let screens = (
            ZoneScreenBinder::new(registry.clone(), MessageType::Screen, gate()),
            feed.subscribe(),
        );
        let dialogs = (
            ZoneScreenBinder::new(registry.clone(), MessageType::Dialog, gate()),
            feed.subscribe(),
        );

        Self {
            registry,
            actions,
            outbound,
            bus,
            feed_inbox,
            actions_inbox,
            feed,
            screens,
            dialogs,
        }
    }

    /// Runs one step and returns the outbound actions it produced.
    pub fn step(&mut self, step: &Step) -> Vec<OutboundAction> {
        match step {
            Step::Message(message) => {
                self.bus.publish(message.clone());
                self.pump_messages();
            }
            Step::Key(key) => {
                let outcome = self.registry.dispatch_key_down(key);
                debug!("key {:?} -> {outcome:?}", key.key);
            }
            Step::Unblock(true) => {
                self.actions.unblock();
            }
            Step::Unblock(false) => {}
            Step::Confirm(confirmed) => {
                if let Err(e) = self.actions.resolve_confirmation(*confirmed) {
                    warn!("{e}");
                }
            }
        }

        let mut produced = Vec::new();
        while let Ok(action) = self.outbound.try_recv() {
            produced.push(action);
        }
        produced
    }

    fn pump_messages(&mut self) {
        while let Some(message) = next_message(&mut self.feed_inbox, "feed") {
            self.feed.publish(&message);
        }
        let (binder, sub) = &mut self.screens;
        binder.drain(sub);
        let (binder, sub) = &mut self.dialogs;
        binder.drain(sub);

        while let Some(message) = next_message(&mut self.actions_inbox, "action service") {
            if let Some(outcome) = self.actions.handle_message(&message) {
                debug!("message replayed queued action: {outcome:?}");
            }
        }
    }

    /// Runs every step, handing each outbound action to `emit`.
    pub fn replay<F>(&mut self, steps: &[Step], mut emit: F) -> Result<usize>
    where
        F: FnMut(&OutboundAction) -> Result<()>,
    {
        let mut count = 0;
        for step in steps {
            for action in self.step(step) {
                emit(&action)?;
                count += 1;
            }
        }
        info!("replayed {} steps, {count} outbound actions", steps.len());
        Ok(count)
    }

    pub fn shutdown(&self) {
        self.registry.shutdown();
    }
}

fn next_message(
    inbox: &mut broadcast::Receiver<SessionMessage>,
    name: &str,
) -> Option<SessionMessage> {
    loop {
        match inbox.try_recv() {
            Ok(message) => return Some(message),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!("{name} inbox lagged by {skipped} messages");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
        }
    }
}
