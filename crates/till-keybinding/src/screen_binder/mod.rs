//! Screen and dialog pushes driving zone lifecycle.
//!
//! [`ScreenDialogFeed`] latches the newest screen and dialog message and
//! fans them out. Each [`ZoneScreenBinder`] owns one zone handle and keeps it
//! registered, updated and activated in step with the messages of its type.

mod binder;
mod feed;

pub use binder::ZoneScreenBinder;
pub use feed::{FeedSubscription, ScreenDialogFeed};
