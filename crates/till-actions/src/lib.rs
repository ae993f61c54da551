//! Outbound action dispatch for the till client.
//!
//! [`ActionService`] is the concrete [`ActionGate`](till_common::ActionGate):
//! it sends actions to the session transport, blocks further actions while a
//! response is outstanding, keeps a single queued action, asks for
//! confirmation where an item requires it, and tracks reactive disablers.

pub mod disablers;
pub mod outbound;
pub mod service;

pub use disablers::DisablerSet;
pub use outbound::{ActionOutcome, OutboundAction};
pub use service::ActionService;
