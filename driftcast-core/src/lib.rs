//! Driftcast Core - Media publishing lifecycle and playback selection
//!
//! This crate provides the framework-independent heart of a media-publishing
//! CMS: the status/lifecycle state machine that decides whether a media item
//! is draft, reviewed, encoded, and publishable; the ordering rules that
//! pick a primary file; and the player/file selection policy that matches
//! uploaded or embedded files against a client's playback capabilities.
//!
//! The web layer, ORM, and templating of a full deployment are external
//! collaborators: they load media rows, call into these pure functions, and
//! persist the results.

pub mod config;
pub mod media;
pub mod playback;
pub mod status;

// Re-export main types for convenient access
pub use config::{DriftcastConfig, LifecycleConfig, PlaybackConfig};
pub use media::{Media, MediaError, MediaFile};
pub use playback::{PlaybackRequest, SelectedPlayer, pick_media_file_player};
pub use status::{StatusCatalog, StatusError, StatusSet};

/// Core errors that can bubble up from any Driftcast subsystem.
#[derive(Debug, thiserror::Error)]
pub enum DriftcastError {
    #[error("Status error: {0}")]
    Status(#[from] StatusError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },
}

impl DriftcastError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            DriftcastError::Status(_) => "Status configuration error occurred".to_string(),
            DriftcastError::Media(e) => match e {
                MediaError::FileNotFound { .. } => "File not found".to_string(),
                MediaError::NotReadyToPublish { blocking, .. } => {
                    format!("Not ready to publish, still blocked by: {blocking}")
                }
                MediaError::LastFeedFile { .. } => {
                    "A published podcast episode must keep at least one feed file".to_string()
                }
                MediaError::InvalidSlug { slug } => format!("Invalid URL slug: {slug}"),
            },
            DriftcastError::Configuration { reason } => {
                format!("Configuration error: {reason}")
            }
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            DriftcastError::Media(MediaError::InvalidSlug { .. })
                | DriftcastError::Media(MediaError::NotReadyToPublish { .. })
                | DriftcastError::Media(MediaError::LastFeedFile { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, DriftcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions_and_user_messages() {
        let status_error: DriftcastError = StatusError::UnknownFlag {
            name: "bogus".to_string(),
        }
        .into();
        assert!(!status_error.is_user_error());

        let media_error: DriftcastError = MediaError::InvalidSlug {
            slug: "Bad Slug".to_string(),
        }
        .into();
        assert!(media_error.is_user_error());
        assert_eq!(media_error.user_message(), "Invalid URL slug: Bad Slug");
    }
}
