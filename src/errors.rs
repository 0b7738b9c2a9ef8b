use thiserror::Error;

/// Error type covering the four failure families of the player:
/// unparseable playlist data, fetch/store failures, pairing rejections,
/// and malformed user input.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayerError {
    /// Playlist payload (M3U text or Xtream JSON) could not be interpreted
    #[error("invalid playlist data: {0}")]
    Format(String),

    /// HTTP fetch or store operation failed
    #[error("network error: {0}")]
    Network(String),

    /// Device unknown or PIN mismatch during pairing
    #[error("pairing failed: {0}")]
    Pairing(String),

    /// Malformed MAC/PIN input
    #[error("invalid input: {0}")]
    Validation(String),
}

impl PlayerError {
    /// One-line message suitable for the status area of the UI
    pub fn user_message(&self) -> String {
        match self {
            PlayerError::Format(_) => "Playlist could not be read. Check the source.".to_string(),
            PlayerError::Network(_) => "Connection failed. Try again.".to_string(),
            PlayerError::Pairing(reason) => reason.clone(),
            PlayerError::Validation(reason) => reason.clone(),
        }
    }
}

impl From<reqwest::Error> for PlayerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PlayerError::Format(err.to_string())
        } else {
            PlayerError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        PlayerError::Format(err.to_string())
    }
}
