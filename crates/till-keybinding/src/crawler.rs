//! Extraction of keybound action items from server payloads.
//!
//! Screens arrive as arbitrary JSON trees with action items nested at any
//! depth (toolbar buttons, list rows, menu entries). [`crawl`] walks the
//! tree depth-first in document order and collects every object that has
//! both an `action` and a `keybind`.
//!
//! Each comma-separated chord of a keybind becomes its own entry. When two
//! items claim the same normalized chord, the first one encountered wins,
//! so a binding declared higher up the tree (a screen-level "Back")
//! shadows one nested deeper (a row-level "Back").

use std::collections::HashSet;

use serde_json::{Map, Value};
use till_common::ActionItem;
use tracing::warn;

use crate::keymap::{split_keys, KeyLike};

/// Collects the keybound action items in `root`, one per distinct chord.
pub fn crawl(root: &Value) -> Vec<ActionItem> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();
    visit(root, &mut found, &mut seen);
    found
}

fn visit(node: &Value, found: &mut Vec<ActionItem>, seen: &mut HashSet<String>) {
    match node {
        Value::Object(map) => {
            if looks_like_action_item(map) {
                collect(map, found, seen);
            }
            for value in map.values() {
                visit(value, found, seen);
            }
        }
        Value::Array(items) => {
            for value in items {
                visit(value, found, seen);
            }
        }
        _ => {}
    }
}

fn looks_like_action_item(map: &Map<String, Value>) -> bool {
    let non_empty = |field: &str| {
        map.get(field)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.is_empty())
    };
    non_empty("action") && non_empty("keybind")
}

fn collect(map: &Map<String, Value>, found: &mut Vec<ActionItem>, seen: &mut HashSet<String>) {
    let item: ActionItem = match serde_json::from_value(Value::Object(map.clone())) {
        Ok(item) => item,
        Err(e) => {
            warn!("skipping malformed action item {:?}: {e}", map.get("action"));
            return;
        }
    };
    let Some(keybind) = item.keybind.as_deref() else {
        return;
    };

    for spec in split_keys(keybind) {
        let Some(key) = spec.normalized_key() else {
            continue;
        };
        if seen.insert(key) {
            let mut entry = item.clone();
            entry.keybind = Some(spec);
            found.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actions(items: &[ActionItem]) -> Vec<(&str, &str)> {
        items
            .iter()
            .map(|i| (i.action.as_str(), i.keybind.as_deref().unwrap_or("")))
            .collect()
    }

    #[test]
    fn finds_nested_items_in_document_order() {
        let screen = json!({
            "type": "Screen",
            "id": "sale",
            "toolbar": {
                "back": {"action": "Back", "keybind": "Escape", "title": "Back"}
            },
            "items": [
                {"action": "Void", "keybind": "F6"},
                {"label": "no keybind", "action": "Noop"},
                {"nested": [{"action": "Tender", "keybind": "F10"}]}
            ]
        });

        let found = crawl(&screen);
        assert_eq!(
            actions(&found),
            vec![("Back", "Escape"), ("Void", "F6"), ("Tender", "F10")]
        );
        assert_eq!(found[0].extra.get("title"), Some(&json!("Back")));
    }

    #[test]
    fn shallower_binding_wins_over_deeper_one() {
        let screen = json!({
            "close": {"action": "Close", "keybind": "Escape"},
            "list": [
                {"action": "CloseRow", "keybind": "Esc"},
                {"action": "Close2", "keybind": "escape"}
            ]
        });

        let found = crawl(&screen);
        assert_eq!(actions(&found), vec![("Close", "Escape")]);
    }

    #[test]
    fn first_of_two_actions_on_the_same_key_wins() {
        let tree = json!({
            "a": {"action": "X", "keybind": "F5"},
            "b": {"action": "Y", "keybind": "F5"}
        });

        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("X", "F5")]);
    }

    #[test]
    fn multi_chord_keybind_expands() {
        let tree = json!({"action": "Next", "keybind": "Enter, Tab"});
        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("Next", "Enter"), ("Next", "Tab")]);
    }

    #[test]
    fn partial_overlap_keeps_only_the_new_chords() {
        let tree = json!([
            {"action": "Back", "keybind": "Escape"},
            {"action": "Cancel", "keybind": "Escape,Ctrl+Z"}
        ]);
        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("Back", "Escape"), ("Cancel", "Ctrl+Z")]);
    }

    #[test]
    fn matched_items_are_still_descended_into() {
        let tree = json!({
            "action": "Menu",
            "keybind": "F1",
            "children": [{"action": "Help", "keybind": "F2"}]
        });
        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("Menu", "F1"), ("Help", "F2")]);
    }

    #[test]
    fn scalars_and_empty_fields_yield_nothing() {
        assert!(crawl(&json!(null)).is_empty());
        assert!(crawl(&json!("F5")).is_empty());
        assert!(crawl(&json!(42)).is_empty());
        assert!(crawl(&json!({"action": "", "keybind": "F5"})).is_empty());
        assert!(crawl(&json!({"action": "X", "keybind": ""})).is_empty());
        assert!(crawl(&json!({"action": "X", "keybind": true})).is_empty());
    }

    #[test]
    fn malformed_item_is_skipped_but_children_are_crawled() {
        let tree = json!({
            "action": "Broken",
            "keybind": "F3",
            "enabled": "yes",
            "inner": {"action": "Fine", "keybind": "F4"}
        });
        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("Fine", "F4")]);
    }

    #[test]
    fn unparseable_chords_are_dropped() {
        let tree = json!({"action": "X", "keybind": "Hyper+Q,F8"});
        let found = crawl(&tree);
        assert_eq!(actions(&found), vec![("X", "F8")]);
    }
}
