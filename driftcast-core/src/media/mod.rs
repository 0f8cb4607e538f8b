//! Media items, their attached files, and the publishing lifecycle.
//!
//! A `Media` item is one audio/video asset or podcast episode. It owns an
//! ordered sequence of `MediaFile`s (locally hosted uploads or references to
//! third-party hosts) and a status bitmask that the lifecycle engine keeps
//! consistent with the attached files. The derived audio/video type and the
//! `unencoded`/`unreviewed`/`draft`/`publish` flags are never set free-hand;
//! they flow through the operations in [`lifecycle`] and [`ordering`].

pub mod lifecycle;
pub mod ordering;
pub mod slug;

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::{self, StatusCatalog, StatusError, StatusSet, bits};

/// Identifier of a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaId(pub i64);

/// Identifier of a file attached to a media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub i64);

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised by media model operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediaError {
    #[error("file {file_id} does not belong to media {media_id}")]
    FileNotFound { media_id: MediaId, file_id: FileId },

    #[error("media {media_id} is not ready to publish, blocked by: {blocking}")]
    NotReadyToPublish { media_id: MediaId, blocking: String },

    #[error("file {file_id} is the last feed-enabled file of a published podcast episode")]
    LastFeedFile { file_id: FileId },

    #[error("invalid slug: {slug:?}")]
    InvalidSlug { slug: String },
}

/// Derived medium of a media item or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
}

impl MediaType {
    /// Returns whether this is the video medium.
    pub fn is_video(&self) -> bool {
        matches!(self, MediaType::Video)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Audio => write!(f, "audio"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// Container format of a locally hosted file, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    // Audio
    Mp3,
    M4a,
    Flac,
    Oga,
    // Video
    Mp4,
    M4v,
    Ogv,
    WebM,
    Flv,
    F4v,
    Avi,
    Mov,
    Wmv,
    // Captions and metadata, not playable media
    Srt,
    Xml,
}

impl Container {
    /// Parses a container from a file extension, case-insensitive.
    pub fn from_extension(extension: &str) -> Option<Container> {
        match extension.to_ascii_lowercase().as_str() {
            "mp3" => Some(Container::Mp3),
            "m4a" => Some(Container::M4a),
            "flac" => Some(Container::Flac),
            "oga" | "ogg" => Some(Container::Oga),
            "mp4" => Some(Container::Mp4),
            "m4v" => Some(Container::M4v),
            "ogv" => Some(Container::Ogv),
            "webm" => Some(Container::WebM),
            "flv" => Some(Container::Flv),
            "f4v" => Some(Container::F4v),
            "avi" => Some(Container::Avi),
            "mov" => Some(Container::Mov),
            "wmv" => Some(Container::Wmv),
            "srt" => Some(Container::Srt),
            "xml" => Some(Container::Xml),
            _ => None,
        }
    }

    /// Canonical file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp3 => "mp3",
            Container::M4a => "m4a",
            Container::Flac => "flac",
            Container::Oga => "oga",
            Container::Mp4 => "mp4",
            Container::M4v => "m4v",
            Container::Ogv => "ogv",
            Container::WebM => "webm",
            Container::Flv => "flv",
            Container::F4v => "f4v",
            Container::Avi => "avi",
            Container::Mov => "mov",
            Container::Wmv => "wmv",
            Container::Srt => "srt",
            Container::Xml => "xml",
        }
    }

    /// MIME type for HTTP responses.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Container::Mp3 => "audio/mpeg",
            Container::M4a => "audio/mp4",
            Container::Flac => "audio/flac",
            Container::Oga => "audio/ogg",
            Container::Mp4 => "video/mp4",
            Container::M4v => "video/x-m4v",
            Container::Ogv => "video/ogg",
            Container::WebM => "video/webm",
            Container::Flv => "video/x-flv",
            Container::F4v => "video/mp4",
            Container::Avi => "video/x-msvideo",
            Container::Mov => "video/quicktime",
            Container::Wmv => "video/x-ms-wmv",
            Container::Srt => "text/plain",
            Container::Xml => "application/xml",
        }
    }

    /// Medium this container holds, or `None` for captions/metadata.
    pub fn media_type(&self) -> Option<MediaType> {
        match self {
            Container::Mp3 | Container::M4a | Container::Flac | Container::Oga => {
                Some(MediaType::Audio)
            }
            Container::Mp4
            | Container::M4v
            | Container::Ogv
            | Container::WebM
            | Container::Flv
            | Container::F4v
            | Container::Avi
            | Container::Mov
            | Container::Wmv => Some(MediaType::Video),
            Container::Srt | Container::Xml => None,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Third-party hosting service an embedded file points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedHost {
    YouTube,
    Vimeo,
    GoogleVideo,
}

impl fmt::Display for EmbedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedHost::YouTube => write!(f, "youtube"),
            EmbedHost::Vimeo => write!(f, "vimeo"),
            EmbedHost::GoogleVideo => write!(f, "googlevideo"),
        }
    }
}

/// Where a file's bytes actually live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileSource {
    /// Locally served file with a known container format.
    Local { url: String, container: Container },
    /// Reference into a third-party hosting service.
    Embed { host: EmbedHost, ref_id: String },
}

/// One physical or embedded file belonging to a media item.
///
/// Position and feed enablement are owned by the parent [`Media`]; they can
/// only change through its methods so ordering and feed invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    id: FileId,
    source: FileSource,
    size: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
    bitrate: Option<u32>,
    enable_player: bool,
    enable_feed: bool,
    position: u32,
}

impl MediaFile {
    /// Creates a new file, player- and feed-enabled, not yet attached.
    pub fn new(id: FileId, source: FileSource) -> Self {
        Self {
            id,
            source,
            size: None,
            width: None,
            height: None,
            bitrate: None,
            enable_player: true,
            enable_feed: true,
            position: 0,
        }
    }

    /// Sets the file size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Sets pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the bitrate in kbit/s.
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = Some(bitrate);
        self
    }

    /// Sets player enablement at construction time.
    pub fn with_player_enabled(mut self, enabled: bool) -> Self {
        self.enable_player = enabled;
        self
    }

    /// Sets feed enablement at construction time.
    pub fn with_feed_enabled(mut self, enabled: bool) -> Self {
        self.enable_feed = enabled;
        self
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Container format, `None` for embedded files.
    pub fn container(&self) -> Option<Container> {
        match &self.source {
            FileSource::Local { container, .. } => Some(*container),
            FileSource::Embed { .. } => None,
        }
    }

    /// Medium of this file. Embedded files are treated as video.
    pub fn media_type(&self) -> Option<MediaType> {
        match &self.source {
            FileSource::Local { container, .. } => container.media_type(),
            FileSource::Embed { .. } => Some(MediaType::Video),
        }
    }

    /// Returns whether this file is a reference into a third-party host.
    pub fn is_embed(&self) -> bool {
        matches!(self.source, FileSource::Embed { .. })
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn bitrate(&self) -> Option<u32> {
        self.bitrate
    }

    pub fn player_enabled(&self) -> bool {
        self.enable_player
    }

    pub fn feed_enabled(&self) -> bool {
        self.enable_feed
    }

    /// Position within the parent's ordered file sequence. Unique per parent
    /// but not necessarily contiguous.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    pub(crate) fn set_feed_enabled_raw(&mut self, enabled: bool) {
        self.enable_feed = enabled;
    }

    pub(crate) fn set_player_enabled_raw(&mut self, enabled: bool) {
        self.enable_player = enabled;
    }
}

/// Author attribution for a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One audio/video asset or podcast episode.
///
/// New media starts as `draft,unencoded,unreviewed`; the flags and the
/// derived type converge toward the attached files through
/// [`Media::update_status`] and [`Media::update_type`].
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    id: MediaId,
    slug: String,
    status: StatusSet,
    media_type: Option<MediaType>,
    files: Vec<MediaFile>,

    /// Member of a podcast, subject to feed-enablement invariants.
    pub podcast_episode: bool,
    pub duration: Option<Duration>,
    pub views: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub publish_on: Option<DateTime<Utc>>,
    pub publish_until: Option<DateTime<Utc>>,
    pub author: Author,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

impl Media {
    /// Creates a new media item in the initial `draft,unencoded,unreviewed`
    /// state.
    ///
    /// # Errors
    /// - `MediaError::InvalidSlug` - Slug is not a valid URL slug
    pub fn new(id: MediaId, slug: &str, author: Author) -> Result<Self, MediaError> {
        if !slug::is_valid_slug(slug) {
            return Err(MediaError::InvalidSlug {
                slug: slug.to_string(),
            });
        }

        let mut status = StatusSet::empty(StatusCatalog::media());
        status.insert_bits(bits::DRAFT | bits::UNENCODED | bits::UNREVIEWED);

        Ok(Self {
            id,
            slug: slug.to_string(),
            status,
            media_type: None,
            files: Vec::new(),
            podcast_episode: false,
            duration: None,
            views: 0,
            likes: 0,
            dislikes: 0,
            publish_on: None,
            publish_until: None,
            author,
            title: String::new(),
            description: String::new(),
            tags: Vec::new(),
            categories: Vec::new(),
        })
    }

    pub fn id(&self) -> MediaId {
        self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Replaces the slug.
    ///
    /// # Errors
    /// - `MediaError::InvalidSlug` - Slug is not a valid URL slug
    pub fn set_slug(&mut self, slug: &str) -> Result<(), MediaError> {
        if !slug::is_valid_slug(slug) {
            return Err(MediaError::InvalidSlug {
                slug: slug.to_string(),
            });
        }
        self.slug = slug.to_string();
        Ok(())
    }

    /// Current status flags.
    pub fn status(&self) -> &StatusSet {
        &self.status
    }

    /// Replaces the status wholesale, e.g. when rehydrating from storage.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Set is not over the media catalog
    pub fn set_status(&mut self, status: StatusSet) -> Result<(), StatusError> {
        if **status.catalog() != *StatusCatalog::media() {
            return Err(StatusError::CatalogMismatch);
        }
        self.status = status;
        Ok(())
    }

    /// Derived medium: always the medium of the current primary file, or
    /// `None` when there is none.
    pub fn media_type(&self) -> Option<MediaType> {
        self.media_type
    }

    /// Attached files in position order.
    pub fn files(&self) -> &[MediaFile] {
        &self.files
    }

    /// Looks up an attached file by id.
    pub fn file(&self, id: FileId) -> Option<&MediaFile> {
        self.files.iter().find(|file| file.id == id)
    }

    /// The primary file: lowest-position player-enabled file.
    pub fn primary_file(&self) -> Option<&MediaFile> {
        self.files.iter().find(|file| file.enable_player)
    }

    /// Returns whether the item is publicly visible at `now`: published,
    /// not trashed, and inside the publish window.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        if !self.status.contains_bits(bits::PUBLISH) || self.status.contains_bits(bits::TRASH) {
            return false;
        }
        let opened = self.publish_on.is_some_and(|on| on <= now);
        let unelapsed = self.publish_until.is_none_or(|until| now < until);
        opened && unelapsed
    }

    /// Records one view.
    pub fn record_view(&mut self) {
        self.views += 1;
    }

    /// Records a positive rating.
    pub fn rate_up(&mut self) {
        self.likes += 1;
    }

    /// Records a negative rating.
    pub fn rate_down(&mut self) {
        self.dislikes += 1;
    }

    pub(crate) fn status_mut(&mut self) -> &mut StatusSet {
        &mut self.status
    }

    pub(crate) fn set_media_type(&mut self, media_type: Option<MediaType>) {
        self.media_type = media_type;
    }

    pub(crate) fn files_mut(&mut self) -> &mut Vec<MediaFile> {
        &mut self.files
    }

    /// Names of flags currently blocking publication.
    pub fn blocking_flags(&self) -> Vec<&'static str> {
        let mut blocking = Vec::new();
        if self.status.contains_bits(bits::UNENCODED) {
            blocking.push(status::UNENCODED);
        }
        if self.status.contains_bits(bits::UNREVIEWED) {
            blocking.push(status::UNREVIEWED);
        }
        if self.status.contains_bits(bits::DRAFT) {
            blocking.push(status::DRAFT);
        }
        blocking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> Media {
        Media::new(
            MediaId(1),
            "the-daily-drip",
            Author::new("Ada", "ada@example.com"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_media_starts_draft_unencoded_unreviewed() {
        let media = media();
        assert_eq!(media.status().to_string(), "draft,unencoded,unreviewed");
        assert_eq!(media.media_type(), None);
        assert!(media.files().is_empty());
    }

    #[test]
    fn test_new_media_rejects_invalid_slug() {
        let result = Media::new(MediaId(1), "Not A Slug!", Author::new("a", "a@b.c"));
        assert!(matches!(result, Err(MediaError::InvalidSlug { .. })));
    }

    #[test]
    fn test_container_extension_round_trip() {
        for container in [
            Container::Mp3,
            Container::M4a,
            Container::Oga,
            Container::Mp4,
            Container::WebM,
            Container::Flv,
        ] {
            assert_eq!(
                Container::from_extension(container.extension()),
                Some(container)
            );
        }
        assert_eq!(Container::from_extension("OGG"), Some(Container::Oga));
        assert_eq!(Container::from_extension("docx"), None);
    }

    #[test]
    fn test_embed_files_count_as_video() {
        let file = MediaFile::new(
            FileId(1),
            FileSource::Embed {
                host: EmbedHost::YouTube,
                ref_id: "dQw4w9WgXcQ".to_string(),
            },
        );
        assert!(file.is_embed());
        assert_eq!(file.container(), None);
        assert_eq!(file.media_type(), Some(MediaType::Video));
    }

    #[test]
    fn test_is_published_honors_window_and_trash() {
        let mut media = media();
        let now = Utc::now();

        // Not published at all
        assert!(!media.is_published(now));

        let mut status = StatusSet::empty(StatusCatalog::media());
        status.add(status::PUBLISH).unwrap();
        media.set_status(status).unwrap();
        media.publish_on = Some(now - chrono::Duration::hours(1));
        assert!(media.is_published(now));

        // Window closed
        media.publish_until = Some(now - chrono::Duration::minutes(5));
        assert!(!media.is_published(now));
        media.publish_until = Some(now + chrono::Duration::hours(1));
        assert!(media.is_published(now));

        // Trashed
        media.status_mut().insert_bits(bits::TRASH);
        assert!(!media.is_published(now));
    }

    #[test]
    fn test_counters() {
        let mut media = media();
        media.record_view();
        media.record_view();
        media.rate_up();
        media.rate_down();
        assert_eq!((media.views, media.likes, media.dislikes), (2, 1, 1));
    }
}
