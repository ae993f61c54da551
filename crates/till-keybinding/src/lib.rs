//! Zone-based keyboard routing for the till client.
//!
//! Screens, dialogs and local UI components register *zones* of
//! keyboard-triggerable actions with a single [`KeybindingRegistry`]. At most
//! one zone is active at a time; a key press that matches one of the active
//! zone's chords runs the action-invocation protocol and, if nothing vetoes
//! it, reaches the zone's [`ActionGate`](till_common::ActionGate).

pub mod crawler;
pub mod hooks;
pub mod key_event;
pub mod keymap;
pub mod registry;
pub mod screen_binder;
pub mod switch;
pub mod zone;
pub mod zone_handle;

pub use crawler::crawl;
pub use hooks::{HookId, PayloadRequest, PendingAction};
pub use key_event::KeyDown;
pub use keymap::{equal, has_key, normalize, parse, split_keys, Chord, KeyLike, Modifier};
pub use registry::{DispatchOutcome, KeybindingRegistry};
pub use screen_binder::{FeedSubscription, ScreenDialogFeed, ZoneScreenBinder};
pub use switch::KeybindingSwitch;
pub use zone::{KeybindingEvent, Zone, ZoneEvents, ZoneNotice};
pub use zone_handle::{KeybindingZone, ZoneKeyDownStream};
