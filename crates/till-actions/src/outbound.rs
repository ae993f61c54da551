use serde::Serialize;
use serde_json::Value;
use till_common::ActionItem;

/// What the service hands to the session transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundAction {
    /// Send the action to the server.
    Send {
        item: ActionItem,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// Show the item's confirmation dialog and report back through
    /// `ActionService::resolve_confirmation`.
    ConfirmationRequested { item: ActionItem, dialog: Value },
}

/// How one `do_action` call was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionOutcome {
    Sent,
    /// Parked in the single queue slot until the service unblocks.
    Queued,
    /// Refused because a response is outstanding.
    Blocked,
    Disabled,
    AwaitingConfirmation,
    /// The confirmation dialog was declined.
    Cancelled,
    /// The transport receiver is gone.
    Dropped,
}
