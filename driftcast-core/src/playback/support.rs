//! Client capability reference data.
//!
//! Which container formats a browser can play natively, and which embed
//! hosts map to which player technology, is operator-configurable reference
//! data rather than computed state. The types here are the rows of those
//! tables; the default tables live in [`crate::config::PlaybackConfig`].

use serde::{Deserialize, Serialize};

use super::browser::Browser;
use crate::media::{Container, EmbedHost};

/// Player implementation technology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerTech {
    Html5,
    Flash,
}

impl PlayerTech {
    /// The alternate technology, used when building fallback players.
    pub fn alternate(&self) -> PlayerTech {
        match self {
            PlayerTech::Html5 => PlayerTech::Flash,
            PlayerTech::Flash => PlayerTech::Html5,
        }
    }
}

/// Configured preference for which selection strategy serves playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerPreference {
    /// HTML5 players only.
    Html5,
    /// Flash players only.
    Flash,
    /// Ordered fallback search across embeds, HTML5, and Flash.
    #[default]
    Best,
}

/// One row of the native HTML5 support table: the given browser, from the
/// given minimum version, plays the given container with the listed codecs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Html5Support {
    pub browser: Browser,
    pub min_version: f64,
    pub container: Container,
    pub codecs: Vec<String>,
}

impl Html5Support {
    pub fn new(browser: Browser, min_version: f64, container: Container, codecs: &[&str]) -> Self {
        Self {
            browser,
            min_version,
            container,
            codecs: codecs.iter().map(|codec| codec.to_string()).collect(),
        }
    }

    /// Returns whether this row applies to the given client.
    pub fn applies_to(&self, browser: Browser, version: f64) -> bool {
        self.browser == browser && version >= self.min_version
    }
}

/// Mapping from an embed host to the player technology its embedded player
/// requires on the viewing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedHostSupport {
    pub host: EmbedHost,
    pub tech: PlayerTech,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html5_support_row_applies_from_min_version() {
        let row = Html5Support::new(Browser::Firefox, 3.5, Container::Ogv, &["theora", "vorbis"]);
        assert!(row.applies_to(Browser::Firefox, 3.5));
        assert!(row.applies_to(Browser::Firefox, 4.0));
        assert!(!row.applies_to(Browser::Firefox, 3.0));
        assert!(!row.applies_to(Browser::Chrome, 5.0));
    }

    #[test]
    fn test_player_tech_alternate() {
        assert_eq!(PlayerTech::Html5.alternate(), PlayerTech::Flash);
        assert_eq!(PlayerTech::Flash.alternate(), PlayerTech::Html5);
    }

    #[test]
    fn test_support_row_deserializes_from_operator_json() {
        let row: Html5Support = serde_json::from_str(
            r#"{"browser": "firefox", "min_version": 4.0, "container": "webm",
                "codecs": ["vp8", "vorbis"]}"#,
        )
        .unwrap();
        assert_eq!(row.browser, Browser::Firefox);
        assert_eq!(row.container, Container::WebM);
    }
}
