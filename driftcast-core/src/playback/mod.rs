//! Playback selection: browser identification, capability tables, and the
//! player/file selection policy.

mod browser;
mod selection;
mod support;

pub use browser::{Browser, parse_user_agent};
pub use selection::{
    PlaybackRequest, SelectedPlayer, ordered_playable_files, pick_media_file_player,
};
pub use support::{EmbedHostSupport, Html5Support, PlayerPreference, PlayerTech};
