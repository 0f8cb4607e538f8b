//! Playback selection against realistic clients and file sets.

use driftcast_core::config::{LifecycleConfig, PlaybackConfig};
use driftcast_core::media::{
    Author, Container, EmbedHost, FileId, FileSource, Media, MediaFile, MediaId,
};
use driftcast_core::playback::{
    Browser, PlaybackRequest, PlayerPreference, PlayerTech, pick_media_file_player,
};

const FIREFOX_35: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:3.5) Gecko/20090624 Firefox/3.5";
const IPHONE: &str = "Mozilla/5.0 (iPhone; U; CPU iPhone OS 4_2 like Mac OS X) AppleWebKit/533.17.9";
const MSIE_8: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1)";

fn local(id: i64, container: Container, size: u64) -> MediaFile {
    MediaFile::new(
        FileId(id),
        FileSource::Local {
            url: format!("/uploads/{id}.{}", container.extension()),
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
    let mut media = Media::new(
        MediaId(21),
        "selection-flow",
        Author::new("Ada", "ada@example.com"),
    )
    .unwrap();
    for file in files {
        media.add_file(file, &lifecycle);
    }
    media
}

#[test]
fn html5_preference_skips_unsupported_richer_file() {
    // Spec'd scenario: [mp4 500KB, ogg 300KB] on a theora/vorbis-only client
    let media = media_with(vec![
        local(1, Container::Mp4, 500_000),
        local(2, Container::Ogv, 300_000),
    ]);
    let request =
        PlaybackRequest::from_user_agent(FIREFOX_35).with_preference(PlayerPreference::Html5);

    let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
    assert_eq!(player.file_id, FileId(2));
    assert_eq!(player.tech, PlayerTech::Html5);
    assert_eq!(player.browser, Browser::Firefox);
}

#[test]
fn best_without_embeds_and_without_local_playable_is_none() {
    let media = media_with(vec![embed(1, EmbedHost::YouTube)]);
    let request = PlaybackRequest::from_user_agent(FIREFOX_35).include_embedded(false);

    assert_eq!(
        pick_media_file_player(&media, &request, &PlaybackConfig::default()),
        None
    );
}

#[test]
fn legacy_browser_gets_flash_with_no_html5_route() {
    // MSIE 8 has no native HTML5 rows in the default table
    let media = media_with(vec![
        local(1, Container::Ogv, 900_000),
        local(2, Container::Mp4, 500_000),
    ]);
    let request = PlaybackRequest::from_user_agent(MSIE_8);

    let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
    assert_eq!(player.tech, PlayerTech::Flash);
    assert_eq!(player.file_id, FileId(2));
}

#[test]
fn iphone_prefers_native_mp4_and_never_gets_flash_for_local_files() {
    let media = media_with(vec![
        local(1, Container::Flv, 900_000),
        local(2, Container::Mp4, 500_000),
    ]);
    let request = PlaybackRequest::from_user_agent(IPHONE);

    let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
    assert_eq!(player.tech, PlayerTech::Html5);
    assert_eq!(player.file_id, FileId(2));
    // No Flash fallback on a Flash-less device
    assert!(player.fallback.is_none());
}

#[test]
fn fallback_player_carries_the_alternate_technology() {
    let media = media_with(vec![local(1, Container::Mp4, 500_000)]);
    let request = PlaybackRequest::from_browser(Browser::Chrome, 6.0);

    let player = pick_media_file_player(&media, &request, &PlaybackConfig::default()).unwrap();
    assert_eq!(player.tech, PlayerTech::Html5);
    let fallback = player.fallback.as_deref().unwrap();
    assert_eq!(fallback.tech, PlayerTech::Flash);
    assert_eq!(fallback.file_id, player.file_id);
}

#[test]
fn operator_supplied_support_table_overrides_defaults() {
    // An operator who disables every HTML5 row forces the Flash route
    let mut config = PlaybackConfig::default();
    config.html5_support.clear();

    let media = media_with(vec![local(1, Container::Mp4, 500_000)]);
    let request = PlaybackRequest::from_browser(Browser::Chrome, 6.0);

    let player = pick_media_file_player(&media, &request, &config).unwrap();
    assert_eq!(player.tech, PlayerTech::Flash);
}

#[test]
fn playback_config_loads_from_operator_json() {
    let json = r#"{
        "preference": "html5",
        "html5_support": [
            {"browser": "firefox", "min_version": 3.5, "container": "ogv",
             "codecs": ["theora", "vorbis"]}
        ],
        "flash_containers": [],
        "flash_browsers": [],
        "embed_hosts": []
    }"#;
    let config: PlaybackConfig = serde_json::from_str(json).unwrap();

    let media = media_with(vec![
        local(1, Container::Mp4, 500_000),
        local(2, Container::Ogv, 300_000),
    ]);
    let request = PlaybackRequest::from_user_agent(FIREFOX_35);

    let player = pick_media_file_player(&media, &request, &config).unwrap();
    assert_eq!(player.file_id, FileId(2));
    assert_eq!(player.tech, PlayerTech::Html5);
}

#[test]
fn unplayable_combination_is_a_value_not_an_error() {
    // Audio-only upload, client with no audio support configured
    let mut config = PlaybackConfig::default();
    config.flash_browsers.clear();

    let media = media_with(vec![local(1, Container::Flac, 900_000)]);
    let request = PlaybackRequest::from_browser(Browser::Msie, 8.0);

    assert_eq!(pick_media_file_player(&media, &request, &config), None);
}
