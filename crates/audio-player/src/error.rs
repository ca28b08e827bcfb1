//! Player error types
//!
//! Every variant is recoverable: the orchestrator stores the `Display` text as the single
//! user-visible status line and keeps running.

use thiserror::Error;

/// Why an imported playlist payload was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Imported data must be an array")]
    NotAnArray,

    #[error("No valid tracks found in the imported data")]
    NoValidTracks,

    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
}

/// Where a rejected play request came from; the message differs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOrigin {
    /// Explicit play/pause toggle
    Resume,
    /// Autoplay after the current track changed
    TrackChange,
}

/// Errors surfaced by the playback orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    /// Audio context / analyser setup failed
    #[error("Failed to initialize audio. Please try again.")]
    Initialization(String),

    /// The platform rejected a play request
    #[error("{}", playback_message(.origin))]
    Playback { origin: PlayOrigin, detail: String },

    /// The source could not be loaded (missing, unsupported or blocked by CORS)
    #[error("Failed to load audio. The file may be unavailable or blocked by CORS policy.")]
    Load(String),

    #[error(transparent)]
    ImportFormat(#[from] ImportError),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn playback_message(origin: &PlayOrigin) -> &'static str {
    match origin {
        PlayOrigin::Resume => {
            "Failed to play audio. The file may be unavailable or blocked by CORS policy."
        }
        PlayOrigin::TrackChange => {
            "Failed to play audio. Please try again or select another track."
        }
    }
}

impl PlayerError {
    /// Underlying platform detail, for logs only
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Initialization(d) | Self::Load(d) | Self::Playback { detail: d, .. } => Some(d),
            Self::ImportFormat(_) => None,
        }
    }
}

/// Result type for player operations
pub type PlayerResult<T> = Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_message_depends_on_origin() {
        let resume = PlayerError::Playback {
            origin: PlayOrigin::Resume,
            detail: "NotAllowedError".into(),
        };
        let change = PlayerError::Playback {
            origin: PlayOrigin::TrackChange,
            detail: "NotAllowedError".into(),
        };
        assert!(resume.to_string().contains("blocked by CORS"));
        assert!(change.to_string().contains("select another track"));
        assert_eq!(resume.detail(), Some("NotAllowedError"));
    }

    #[test]
    fn import_errors_pass_through() {
        let e: PlayerError = ImportError::NotAnArray.into();
        assert_eq!(e.to_string(), "Imported data must be an array");
        assert_eq!(e.detail(), None);
    }
}
