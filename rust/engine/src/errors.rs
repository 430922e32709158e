use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    /// Malformed, out-of-turn or rule-violating action that could not be
    /// converted into a legal one.
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    /// The player cannot perform even a reduced version of the action.
    #[error("Insufficient chips: needed {needed}, available {available}")]
    InsufficientChips { needed: u32, available: u32 },
    /// Internal invariant violation or an operation issued in the wrong
    /// lifecycle state (no hand in progress, empty deck, ...).
    #[error("Game state error: {0}")]
    GameState(String),
    #[error("Phase transition error: {0}")]
    PhaseTransition(String),
    #[error("Invalid hand: {0}")]
    InvalidHand(String),
    #[error("Invalid card: {0:?}")]
    InvalidCard(String),
}

impl GameError {
    /// True for errors caused by the submitted input rather than by the
    /// caller driving the engine incorrectly.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            GameError::InvalidAction(_) | GameError::InsufficientChips { .. }
        )
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GameError::InvalidAction(msg.into())
    }

    pub(crate) fn state(msg: impl Into<String>) -> Self {
        GameError::GameState(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
