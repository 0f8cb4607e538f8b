//! Centralized configuration for Driftcast.
//!
//! All operator-tunable tables live here: which container formats count as
//! "encoded" per medium, which browsers play what natively, and how embeds
//! map to player technologies. Defaults reflect the stock deployment;
//! operators can load replacements from JSON/TOML via serde.

use serde::{Deserialize, Serialize};

use crate::media::{Container, EmbedHost, MediaType};
use crate::playback::{Browser, EmbedHostSupport, Html5Support, PlayerPreference, PlayerTech};

/// Central configuration for all Driftcast components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftcastConfig {
    pub lifecycle: LifecycleConfig,
    pub playback: PlaybackConfig,
}

/// Media lifecycle configuration.
///
/// The encoded-container lists decide when the `unencoded` flag clears: a
/// file is playable by the site's own players exactly when its container is
/// listed for its medium.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Containers playable as locally hosted audio.
    pub encoded_audio: Vec<Container>,
    /// Containers playable as locally hosted video.
    pub encoded_video: Vec<Container>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            encoded_audio: vec![
                Container::Mp3,
                Container::M4a,
                Container::Flac,
                Container::Oga,
            ],
            encoded_video: vec![
                Container::Mp4,
                Container::M4v,
                Container::Ogv,
                Container::WebM,
                Container::Flv,
                Container::F4v,
            ],
        }
    }
}

impl LifecycleConfig {
    /// Returns whether a container counts as encoded for the given medium.
    pub fn is_encoded(&self, media_type: MediaType, container: Container) -> bool {
        match media_type {
            MediaType::Audio => self.encoded_audio.contains(&container),
            MediaType::Video => self.encoded_video.contains(&container),
        }
    }
}

/// Playback selection configuration.
///
/// Holds the per-browser native support table, the Flash capability data,
/// and the embed host registry consumed by the selection policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Active selection strategy.
    pub preference: PlayerPreference,
    /// Native HTML5 playback support rows.
    pub html5_support: Vec<Html5Support>,
    /// Containers the Flash player can play.
    pub flash_containers: Vec<Container>,
    /// Browser families assumed to have the Flash plugin available.
    pub flash_browsers: Vec<Browser>,
    /// Player technology required by each known embed host.
    pub embed_hosts: Vec<EmbedHostSupport>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            preference: PlayerPreference::Best,
            html5_support: vec![
                Html5Support::new(Browser::Firefox, 3.5, Container::Ogv, &["theora", "vorbis"]),
                Html5Support::new(Browser::Firefox, 3.5, Container::Oga, &["vorbis"]),
                Html5Support::new(Browser::Firefox, 4.0, Container::WebM, &["vp8", "vorbis"]),
                Html5Support::new(Browser::Opera, 10.5, Container::Ogv, &["theora", "vorbis"]),
                Html5Support::new(Browser::Opera, 10.5, Container::Oga, &["vorbis"]),
                Html5Support::new(Browser::Opera, 10.6, Container::WebM, &["vp8", "vorbis"]),
                Html5Support::new(Browser::Chrome, 3.0, Container::Ogv, &["theora", "vorbis"]),
                Html5Support::new(Browser::Chrome, 3.0, Container::Oga, &["vorbis"]),
                Html5Support::new(Browser::Chrome, 6.0, Container::WebM, &["vp8", "vorbis"]),
                Html5Support::new(Browser::Chrome, 5.0, Container::Mp4, &["h264", "aac"]),
                Html5Support::new(Browser::Chrome, 5.0, Container::M4a, &["aac"]),
                Html5Support::new(Browser::Chrome, 5.0, Container::Mp3, &["mp3"]),
                // Safari capability is keyed on WebKit build numbers
                Html5Support::new(Browser::Safari, 522.0, Container::Mp4, &["h264", "aac"]),
                Html5Support::new(Browser::Safari, 522.0, Container::M4v, &["h264", "aac"]),
                Html5Support::new(Browser::Safari, 522.0, Container::M4a, &["aac"]),
                Html5Support::new(Browser::Safari, 522.0, Container::Mp3, &["mp3"]),
                Html5Support::new(Browser::Iphone, 0.0, Container::Mp4, &["h264", "aac"]),
                Html5Support::new(Browser::Iphone, 0.0, Container::M4v, &["h264", "aac"]),
                Html5Support::new(Browser::Iphone, 0.0, Container::M4a, &["aac"]),
                Html5Support::new(Browser::Iphone, 0.0, Container::Mp3, &["mp3"]),
                Html5Support::new(Browser::Android, 0.0, Container::Mp4, &["h264", "aac"]),
                Html5Support::new(Browser::Android, 0.0, Container::M4v, &["h264", "aac"]),
                Html5Support::new(Browser::Itunes, 0.0, Container::Mp4, &["h264", "aac"]),
                Html5Support::new(Browser::Itunes, 0.0, Container::M4v, &["h264", "aac"]),
                Html5Support::new(Browser::Itunes, 0.0, Container::M4a, &["aac"]),
                Html5Support::new(Browser::Itunes, 0.0, Container::Mp3, &["mp3"]),
            ],
            flash_containers: vec![
                Container::Mp3,
                Container::Mp4,
                Container::M4v,
                Container::M4a,
                Container::Flv,
                Container::F4v,
            ],
            flash_browsers: vec![
                Browser::Firefox,
                Browser::Opera,
                Browser::Chrome,
                Browser::Safari,
                Browser::Msie,
                Browser::Unknown,
            ],
            embed_hosts: vec![
                EmbedHostSupport {
                    host: EmbedHost::YouTube,
                    tech: PlayerTech::Flash,
                },
                EmbedHostSupport {
                    host: EmbedHost::Vimeo,
                    tech: PlayerTech::Html5,
                },
                EmbedHostSupport {
                    host: EmbedHost::GoogleVideo,
                    tech: PlayerTech::Flash,
                },
            ],
        }
    }
}

impl PlaybackConfig {
    /// Containers the given client plays natively.
    pub fn html5_containers_for(&self, browser: Browser, version: f64) -> Vec<Container> {
        self.html5_support
            .iter()
            .filter(|row| row.applies_to(browser, version))
            .map(|row| row.container)
            .collect()
    }

    /// Returns whether the client's browser family is assumed Flash-capable.
    pub fn is_flash_capable(&self, browser: Browser) -> bool {
        self.flash_browsers.contains(&browser)
    }

    /// Returns whether the Flash player plays the given container.
    pub fn flash_supports(&self, container: Container) -> bool {
        self.flash_containers.contains(&container)
    }

    /// Player technology required by the given embed host, when known.
    pub fn embed_tech(&self, host: EmbedHost) -> Option<PlayerTech> {
        self.embed_hosts
            .iter()
            .find(|entry| entry.host == host)
            .map(|entry| entry.tech)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoded_lists() {
        let config = LifecycleConfig::default();
        assert!(config.is_encoded(MediaType::Audio, Container::Mp3));
        assert!(config.is_encoded(MediaType::Video, Container::WebM));
        assert!(!config.is_encoded(MediaType::Video, Container::Avi));
        // Medium matters: mp3 is not encoded video
        assert!(!config.is_encoded(MediaType::Video, Container::Mp3));
    }

    #[test]
    fn test_html5_lookup_respects_min_version() {
        let config = PlaybackConfig::default();

        let firefox35 = config.html5_containers_for(Browser::Firefox, 3.5);
        assert!(firefox35.contains(&Container::Ogv));
        assert!(!firefox35.contains(&Container::WebM));

        let firefox4 = config.html5_containers_for(Browser::Firefox, 4.0);
        assert!(firefox4.contains(&Container::WebM));

        assert!(
            config
                .html5_containers_for(Browser::Msie, 8.0)
                .is_empty()
        );
    }

    #[test]
    fn test_flash_capability_table() {
        let config = PlaybackConfig::default();
        assert!(config.is_flash_capable(Browser::Firefox));
        assert!(config.is_flash_capable(Browser::Unknown));
        assert!(!config.is_flash_capable(Browser::Iphone));
        assert!(config.flash_supports(Container::Flv));
        assert!(!config.flash_supports(Container::WebM));
    }

    #[test]
    fn test_embed_host_registry() {
        let config = PlaybackConfig::default();
        assert_eq!(config.embed_tech(EmbedHost::YouTube), Some(PlayerTech::Flash));
        assert_eq!(config.embed_tech(EmbedHost::Vimeo), Some(PlayerTech::Html5));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = DriftcastConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DriftcastConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
