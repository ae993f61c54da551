use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum KeybindingError {
    #[error("invalid keybind '{spec}': {reason}")]
    InvalidChord { spec: String, reason: String },

    #[error("unrecognized modifier '{modifier}' in keybind '{spec}'")]
    UnknownModifier { spec: String, modifier: String },

    #[error("payload provider for action '{action}' failed: {message}")]
    PayloadProvider { action: String, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("outbound action channel closed, dropped action '{0}'")]
    ChannelClosed(String),

    #[error("no action is awaiting confirmation")]
    NothingPending,
}

#[derive(Debug, thiserror::Error)]
pub enum TillError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Keybinding(#[from] KeybindingError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("history_limit must be > 0".into());
        assert_eq!(
            err.to_string(),
            "config validation error: history_limit must be > 0"
        );
    }

    #[test]
    fn payload_provider_error_names_the_action() {
        let err = KeybindingError::PayloadProvider {
            action: "Tender".into(),
            message: "no amount entered".into(),
        };
        assert_eq!(
            err.to_string(),
            "payload provider for action 'Tender' failed: no amount entered"
        );
    }

    #[test]
    fn keybinding_error_display() {
        let err = KeybindingError::UnknownModifier {
            spec: "Hyper+K".into(),
            modifier: "Hyper".into(),
        };
        assert_eq!(
            err.to_string(),
            "unrecognized modifier 'Hyper' in keybind 'Hyper+K'"
        );
    }

    #[test]
    fn till_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: TillError = config_err.into();
        assert!(matches!(err, TillError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn till_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: TillError = io_err.into();
        assert!(matches!(err, TillError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn action_error_display() {
        let err = ActionError::ChannelClosed("Sell".into());
        assert_eq!(
            err.to_string(),
            "outbound action channel closed, dropped action 'Sell'"
        );
        assert_eq!(
            ActionError::NothingPending.to_string(),
            "no action is awaiting confirmation"
        );
    }
}
