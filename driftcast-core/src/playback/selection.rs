//! Player and file selection policy.
//!
//! Given a media item's files and a requesting client, pick one file and a
//! player technology through an ordered fallback search. Selection is a pure
//! function of (files, browser identity, configuration); "nothing playable"
//! is the ordinary value `None`, never an error.

use tracing::{debug, trace};

use super::browser::{Browser, parse_user_agent};
use super::support::{PlayerPreference, PlayerTech};
use crate::config::PlaybackConfig;
use crate::media::{Container, EmbedHost, FileId, FileSource, Media, MediaFile};

/// The client and caller context a selection runs against.
#[derive(Debug, Clone, Default)]
pub struct PlaybackRequest<'a> {
    user_agent: Option<&'a str>,
    browser: Option<(Browser, f64)>,
    preference: Option<PlayerPreference>,
    exclude_embedded: bool,
}

impl<'a> PlaybackRequest<'a> {
    /// Builds a request that identifies the client from a user-agent string.
    pub fn from_user_agent(user_agent: &'a str) -> Self {
        Self {
            user_agent: Some(user_agent),
            ..Self::default()
        }
    }

    /// Builds a request with a pre-parsed browser identity.
    pub fn from_browser(browser: Browser, version: f64) -> Self {
        Self {
            browser: Some((browser, version)),
            ..Self::default()
        }
    }

    /// Overrides the configured player preference for this request.
    pub fn with_preference(mut self, preference: PlayerPreference) -> Self {
        self.preference = Some(preference);
        self
    }

    /// Controls whether embedded third-party players are eligible at all.
    pub fn include_embedded(mut self, include: bool) -> Self {
        self.exclude_embedded = !include;
        self
    }

    fn resolve_browser(&self) -> (Browser, f64) {
        match (self.browser, self.user_agent) {
            (Some(identity), _) => identity,
            (None, Some(user_agent)) => parse_user_agent(user_agent),
            (None, None) => (Browser::Unknown, 0.0),
        }
    }
}

/// A player bound to a chosen file and browser context.
///
/// When the chosen technology might fail to initialize client-side, the
/// viable alternate technology for the same file is attached as `fallback`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPlayer {
    pub tech: PlayerTech,
    pub file_id: FileId,
    pub container: Option<Container>,
    pub embed: Option<(EmbedHost, String)>,
    pub browser: Browser,
    pub version: f64,
    pub fallback: Option<Box<SelectedPlayer>>,
}

impl SelectedPlayer {
    fn for_file(tech: PlayerTech, file: &MediaFile, browser: Browser, version: f64) -> Self {
        let embed = match file.source() {
            FileSource::Embed { host, ref_id } => Some((*host, ref_id.clone())),
            FileSource::Local { .. } => None,
        };
        Self {
            tech,
            file_id: file.id(),
            container: file.container(),
            embed,
            browser,
            version,
            fallback: None,
        }
    }
}

/// Player-enabled files in canonical candidate order: video before audio,
/// larger (richer) files first within each group. Caption/metadata files are
/// never candidates.
pub fn ordered_playable_files(media: &Media) -> Vec<&MediaFile> {
    let mut candidates: Vec<&MediaFile> = media
        .files()
        .iter()
        .filter(|file| file.player_enabled() && file.media_type().is_some())
        .collect();
    candidates.sort_by_key(|file| {
        let video_first = match file.media_type() {
            Some(media_type) if media_type.is_video() => 0u8,
            _ => 1,
        };
        // Descending size within each group; unknown size sorts last
        (video_first, u64::MAX - file.size().unwrap_or(0))
    });
    candidates
}

/// Selects a file and player for the given client, or `None` when no
/// combination works.
///
/// The strategy comes from the request override or else the configured
/// preference. The search never mutates anything; replaying it with the
/// same inputs gives the same answer.
pub fn pick_media_file_player(
    media: &Media,
    request: &PlaybackRequest<'_>,
    config: &PlaybackConfig,
) -> Option<SelectedPlayer> {
    let (browser, version) = request.resolve_browser();
    let preference = request.preference.unwrap_or(config.preference);
    let include_embedded = !request.exclude_embedded;
    let candidates = ordered_playable_files(media);

    trace!(
        media_id = %media.id(),
        %browser,
        version,
        ?preference,
        candidates = candidates.len(),
        "selecting player"
    );

    let selection = Selection {
        config,
        browser,
        version,
        html5_containers: config.html5_containers_for(browser, version),
    };

    let picked = match preference {
        PlayerPreference::Html5 => selection.html5_local(&candidates),
        PlayerPreference::Flash => selection.flash_local(&candidates),
        PlayerPreference::Best => selection.best(&candidates, include_embedded),
    };

    match &picked {
        Some(player) => debug!(
            media_id = %media.id(),
            file_id = %player.file_id,
            tech = ?player.tech,
            fallback = player.fallback.is_some(),
            "player selected"
        ),
        None => debug!(media_id = %media.id(), %browser, "no playable file/player combination"),
    }
    picked
}

/// One selection run: the client identity plus pre-computed support data.
struct Selection<'c> {
    config: &'c PlaybackConfig,
    browser: Browser,
    version: f64,
    html5_containers: Vec<Container>,
}

impl Selection<'_> {
    /// First locally hosted candidate the client plays natively.
    fn html5_local(&self, candidates: &[&MediaFile]) -> Option<SelectedPlayer> {
        let file = candidates.iter().find(|file| {
            !file.is_embed()
                && file
                    .container()
                    .is_some_and(|container| self.html5_containers.contains(&container))
        })?;
        Some(self.build(PlayerTech::Html5, file))
    }

    /// First locally hosted Flash-playable candidate, gated on the client
    /// being Flash-capable.
    fn flash_local(&self, candidates: &[&MediaFile]) -> Option<SelectedPlayer> {
        if !self.config.is_flash_capable(self.browser) {
            return None;
        }
        let file = candidates.iter().find(|file| {
            !file.is_embed()
                && file
                    .container()
                    .is_some_and(|container| self.config.flash_supports(container))
        })?;
        Some(self.build(PlayerTech::Flash, file))
    }

    /// First embedded candidate whose host player uses the given technology.
    fn embed_with_tech(&self, candidates: &[&MediaFile], tech: PlayerTech) -> Option<SelectedPlayer> {
        let file = candidates.iter().find(|file| match file.source() {
            FileSource::Embed { host, .. } => self.config.embed_tech(*host) == Some(tech),
            FileSource::Local { .. } => false,
        })?;
        Some(SelectedPlayer::for_file(tech, file, self.browser, self.version))
    }

    /// The "best" fallback chain. Each step runs only when every earlier
    /// step yielded nothing.
    fn best(&self, candidates: &[&MediaFile], include_embedded: bool) -> Option<SelectedPlayer> {
        if include_embedded {
            if let Some(player) = self.embed_with_tech(candidates, PlayerTech::Html5) {
                return Some(player);
            }
        }
        if let Some(player) = self.html5_local(candidates) {
            return Some(player);
        }
        if include_embedded && self.config.is_flash_capable(self.browser) {
            if let Some(player) = self.embed_with_tech(candidates, PlayerTech::Flash) {
                return Some(player);
            }
        }
        if let Some(player) = self.flash_local(candidates) {
            return Some(player);
        }
        // Last resort: serve a Flash embed even without generic Flash
        // support, so a device's native handling of a known host can take
        // over.
        if include_embedded {
            return self.embed_with_tech(candidates, PlayerTech::Flash);
        }
        None
    }

    /// Builds a player for a local file, attaching the alternate technology
    /// as a fallback when it is also viable for the same file.
    fn build(&self, tech: PlayerTech, file: &MediaFile) -> SelectedPlayer {
        let mut player = SelectedPlayer::for_file(tech, file, self.browser, self.version);
        if let Some(container) = file.container() {
            let alternate_viable = match tech.alternate() {
                PlayerTech::Flash => {
                    self.config.is_flash_capable(self.browser)
                        && self.config.flash_supports(container)
                }
                PlayerTech::Html5 => self.html5_containers.contains(&container),
            };
            if alternate_viable {
                player.fallback = Some(Box::new(SelectedPlayer::for_file(
                    tech.alternate(),
                    file,
                    self.browser,
                    self.version,
                )));
            }
        }
        player
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LifecycleConfig;
    use crate::media::{Author, MediaId};

    fn local(id: i64, container: Container, size: u64) -> MediaFile {
        MediaFile::new(
            FileId(id),
            FileSource::Local {
                url: format!("/media/{id}.{}", container.extension()),
                container,
            },
        )
        .with_size(size)
    }

    fn embed(id: i64, host: EmbedHost) -> MediaFile {
        MediaFile::new(
            FileId(id),
            FileSource::Embed {
                host,
                ref_id: format!("ref-{id}"),
            },
        )
    }

    fn media_with(files: Vec<MediaFile>) -> Media {
        let lifecycle = LifecycleConfig::default();
        let mut media =
            Media::new(MediaId(9), "selection-test", Author::new("Ada", "ada@example.com"))
                .unwrap();
        for file in files {
            media.add_file(file, &lifecycle);
        }
        media
    }

    #[test]
    fn test_canonical_order_is_video_first_then_size_descending() {
        let media = media_with(vec![
            local(1, Container::Mp3, 900),
            local(2, Container::Mp4, 500),
            local(3, Container::WebM, 800),
            local(4, Container::M4a, 100),
        ]);

        let order: Vec<FileId> = ordered_playable_files(&media)
            .iter()
            .map(|file| file.id())
            .collect();
        assert_eq!(order, vec![FileId(3), FileId(2), FileId(1), FileId(4)]);
    }

    #[test]
    fn test_player_disabled_and_caption_files_are_not_candidates() {
        let media = media_with(vec![
            local(1, Container::Mp4, 500).with_player_enabled(false),
            local(2, Container::Srt, 10),
            local(3, Container::Ogv, 300),
        ]);

        let order: Vec<FileId> = ordered_playable_files(&media)
            .iter()
            .map(|file| file.id())
            .collect();
        assert_eq!(order, vec![FileId(3)]);
    }

    #[test]
    fn test_html5_skips_unsupported_container_despite_richer_size() {
        // Firefox 3.5 plays only ogg/theora+vorbis in the default table
        let media = media_with(vec![
            local(1, Container::Mp4, 500_000),
            local(2, Container::Ogv, 300_000),
        ]);
        let request =
            PlaybackRequest::from_browser(Browser::Firefox, 3.5).with_preference(PlayerPreference::Html5);

        let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
        assert_eq!(player.file_id, FileId(2));
        assert_eq!(player.tech, PlayerTech::Html5);
        assert_eq!(player.container, Some(Container::Ogv));
    }

    #[test]
    fn test_html5_returns_none_when_nothing_supported() {
        let media = media_with(vec![local(1, Container::Flv, 500)]);
        let request = PlaybackRequest::from_browser(Browser::Firefox, 4.0)
            .with_preference(PlayerPreference::Html5);

        assert_eq!(
            pick_media_file_player(&media, &request, &PlaybackConfig::default()),
            None
        );
    }

    #[test]
    fn test_flash_strategy_is_gated_on_flash_capability() {
        let media = media_with(vec![local(1, Container::Flv, 500)]);
        let config = PlaybackConfig::default();

        let capable = PlaybackRequest::from_browser(Browser::Firefox, 4.0)
            .with_preference(PlayerPreference::Flash);
        let player = pick_media_file_player(&media, &capable, &config).unwrap();
        assert_eq!(player.tech, PlayerTech::Flash);

        let incapable = PlaybackRequest::from_browser(Browser::Iphone, 4.2)
            .with_preference(PlayerPreference::Flash);
        assert_eq!(pick_media_file_player(&media, &incapable, &config), None);
    }

    #[test]
    fn test_best_prefers_html5_native_embed() {
        let media = media_with(vec![
            embed(1, EmbedHost::Vimeo),
            local(2, Container::Mp4, 500),
        ]);
        let request = PlaybackRequest::from_browser(Browser::Safari, 531.0);

        let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
        assert_eq!(player.file_id, FileId(1));
        assert_eq!(player.tech, PlayerTech::Html5);
        assert_eq!(player.embed, Some((EmbedHost::Vimeo, "ref-1".to_string())));
    }

    #[test]
    fn test_best_falls_back_to_local_html5_then_flash() {
        let config = PlaybackConfig::default();

        // Local HTML5 wins when no HTML5-native embed exists
        let media = media_with(vec![
            embed(1, EmbedHost::YouTube),
            local(2, Container::Ogv, 500),
        ]);
        let firefox = PlaybackRequest::from_browser(Browser::Firefox, 3.5);
        let player = pick_media_file_player(&media, &firefox, &config).unwrap();
        assert_eq!(player.file_id, FileId(2));
        assert_eq!(player.tech, PlayerTech::Html5);

        // Flash embed beats local Flash for a Flash-capable client
        let flash_only = media_with(vec![
            embed(1, EmbedHost::YouTube),
            local(2, Container::Flv, 500),
        ]);
        let player = pick_media_file_player(&flash_only, &firefox, &config).unwrap();
        assert_eq!(player.file_id, FileId(1));
        assert_eq!(player.tech, PlayerTech::Flash);
    }

    #[test]
    fn test_best_serves_flash_embed_as_last_resort_without_flash_support() {
        // An iPhone has no Flash, but a YouTube embed is still the only
        // option and the device may handle the host natively.
        let media = media_with(vec![embed(1, EmbedHost::YouTube)]);
        let request = PlaybackRequest::from_browser(Browser::Iphone, 4.2);

        let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
        assert_eq!(player.file_id, FileId(1));
        assert_eq!(player.tech, PlayerTech::Flash);
    }

    #[test]
    fn test_best_with_embeds_excluded_returns_none() {
        let media = media_with(vec![embed(1, EmbedHost::YouTube)]);
        let request = PlaybackRequest::from_browser(Browser::Firefox, 4.0).include_embedded(false);

        assert_eq!(
            pick_media_file_player(&media, &request, &PlaybackConfig::default()),
            None
        );
    }

    #[test]
    fn test_fallback_player_attached_when_both_technologies_viable() {
        // mp4 on Safari: HTML5-native and Flash-playable
        let media = media_with(vec![local(1, Container::Mp4, 500)]);
        let request = PlaybackRequest::from_browser(Browser::Safari, 531.0);

        let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
        assert_eq!(player.tech, PlayerTech::Html5);
        let fallback = player.fallback.as_deref().unwrap();
        assert_eq!(fallback.tech, PlayerTech::Flash);
        assert_eq!(fallback.file_id, player.file_id);
        assert!(fallback.fallback.is_none());

        // ogv on Firefox has no Flash alternative
        let ogv = media_with(vec![local(1, Container::Ogv, 500)]);
        let firefox = PlaybackRequest::from_browser(Browser::Firefox, 3.5);
        let player = pick_media_file_player(&ogv, &firefox, &PlaybackConfig::default()).unwrap();
        assert!(player.fallback.is_none());
    }

    #[test]
    fn test_selection_parses_user_agent_when_no_browser_given() {
        let media = media_with(vec![local(1, Container::Ogv, 500)]);
        let request = PlaybackRequest::from_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64; rv:3.5) Gecko/20090624 Firefox/3.5",
        );

        let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
        assert_eq!(player.browser, Browser::Firefox);
        assert_eq!(player.tech, PlayerTech::Html5);
    }

    #[test]
    fn test_selection_is_replayable() {
        let media = media_with(vec![
            embed(1, EmbedHost::YouTube),
            local(2, Container::Mp4, 500),
        ]);
        let config = PlaybackConfig::default();
        let request = PlaybackRequest::from_browser(Browser::Chrome, 6.0);

        let first = pick_media_file_player(&media, &request, &config);
        let second = pick_media_file_player(&media, &request, &config);
        assert_eq!(first, second);
    }
}
