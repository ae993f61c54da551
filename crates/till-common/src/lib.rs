pub mod actions;
pub mod errors;
pub mod messages;

pub use actions::{ActionGate, ActionItem};
pub use errors::{ActionError, ConfigError, KeybindingError, TillError};
pub use messages::{LifeCycleEventType, MessageBus, MessageType, SessionMessage};

pub type Result<T> = std::result::Result<T, TillError>;
