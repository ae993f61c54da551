use std::collections::{HashMap, VecDeque};

use till_common::ActionItem;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::crawler::crawl;
use crate::keymap::parse;
use crate::zone::{KeybindingEvent, Zone, ZoneEvents};

/// Everything the registry keeps per registered zone.
pub(super) struct ZoneEntry {
    pub(super) zone: Zone,
    /// Normalized chord -> action. Derived from `zone.actions`, never edited.
    pub(super) cache: HashMap<String, ActionItem>,
    pub(super) pipeline: broadcast::Sender<KeybindingEvent>,
    /// The last dispatched events, replayed to streams that attach later.
    pub(super) recent: VecDeque<KeybindingEvent>,
    pub(super) stop: CancellationToken,
}

impl ZoneEntry {
    /// Sends `event` down the pipeline and keeps it for late subscribers.
    pub(super) fn dispatch(&mut self, event: KeybindingEvent, limit: usize) {
        while self.recent.len() >= limit {
            self.recent.pop_front();
        }
        self.recent.push_back(event.clone());
        let _ = self.pipeline.send(event);
    }

    /// A new stream on the pipeline that first replays `recent`.
    pub(super) fn subscribe(&self) -> ZoneEvents {
        ZoneEvents::with_backlog(self.recent.clone(), self.pipeline.subscribe())
    }

    pub(super) fn replace_zone(&mut self, zone: Zone) {
        self.cache = build_cache(&zone.actions);
        self.zone = zone;
    }

    pub(super) fn rebuild_cache(&mut self) {
        self.cache = build_cache(&self.zone.actions);
    }
}

pub(super) struct RegistryState {
    pub(super) zones: HashMap<String, ZoneEntry>,
    /// Pipeline subscription order, which is also dispatch order.
    pub(super) order: Vec<String>,
    pub(super) active: Option<String>,
    pub(super) history: VecDeque<String>,
    pub(super) history_limit: usize,
}

impl RegistryState {
    pub(super) fn new(history_limit: usize) -> Self {
        Self {
            zones: HashMap::new(),
            order: Vec::new(),
            active: None,
            history: VecDeque::with_capacity(history_limit),
            history_limit: history_limit.max(1),
        }
    }

    pub(super) fn is_active(&self, zone_id: &str) -> bool {
        self.active.as_deref() == Some(zone_id)
    }

    pub(super) fn record_activation(&mut self, zone_id: &str) {
        if self.history.len() >= self.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(zone_id.to_string());
    }

    /// The zone activated before the most recent activation.
    pub(super) fn previous_activation(&self) -> Option<&str> {
        let len = self.history.len();
        if len < 2 {
            return None;
        }
        self.history.get(len - 2).map(String::as_str)
    }

    pub(super) fn remove(&mut self, zone_id: &str) -> Option<ZoneEntry> {
        self.order.retain(|id| id != zone_id);
        self.zones.remove(zone_id)
    }
}

/// Replaces `actions` with the crawl of `actions_obj` when a source is set.
pub(super) fn derive_actions(zone: &mut Zone) {
    if let Some(source) = &zone.actions_obj {
        zone.actions = crawl(source);
    }
}

/// First chord wins, matching the crawler's policy for hand-built lists.
pub(super) fn build_cache(actions: &[ActionItem]) -> HashMap<String, ActionItem> {
    let mut cache = HashMap::new();
    for item in actions {
        let Some(keybind) = item.keybind.as_deref() else {
            continue;
        };
        for chord in parse(keybind) {
            cache.entry(chord.normalized()).or_insert_with(|| item.clone());
        }
    }
    cache
}
