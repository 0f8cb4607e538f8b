//! File attachment, removal, and position management.
//!
//! Files are kept sorted by position in the parent's sequence. Positions are
//! unique per media item but not necessarily contiguous; reordering bumps
//! positions rather than renumbering the whole sequence, so a reorder
//! persists as a bounded batch of row updates.

use tracing::{debug, trace};

use super::{FileId, Media, MediaError, MediaFile};
use crate::config::LifecycleConfig;
use crate::status::bits;

impl Media {
    /// Attaches a file at the end of the sequence and re-derives type and
    /// status. Returns the assigned position.
    pub fn add_file(&mut self, mut file: MediaFile, config: &LifecycleConfig) -> u32 {
        let position = self.next_position();
        file.set_position(position);
        trace!(media_id = %self.id(), file_id = %file.id(), position, "file attached");
        self.files_mut().push(file);
        self.update_type();
        self.update_status(config);
        position
    }

    /// Detaches a file and re-derives type and status.
    ///
    /// # Errors
    /// - `MediaError::FileNotFound` - No such file on this media item
    /// - `MediaError::LastFeedFile` - Removing it would leave a published
    ///   podcast episode with no feed-enabled file
    pub fn remove_file(
        &mut self,
        file_id: FileId,
        config: &LifecycleConfig,
    ) -> Result<MediaFile, MediaError> {
        let index = self.file_index(file_id)?;
        if self.files()[index].feed_enabled() && self.is_last_feed_file(file_id) {
            return Err(MediaError::LastFeedFile { file_id });
        }

        let removed = self.files_mut().remove(index);
        debug!(media_id = %self.id(), file_id = %file_id, "file detached");
        self.update_type();
        self.update_status(config);
        Ok(removed)
    }

    /// Moves a file to the end of the sequence, or immediately in front of
    /// `before`, budging the anchor and everything at or after its old
    /// position back by one slot. Returns the new position.
    ///
    /// The adjustment is computed in one pass over the in-memory sequence;
    /// the storage layer is expected to persist it as a single transaction.
    ///
    /// # Errors
    /// - `MediaError::FileNotFound` - File or anchor does not belong to this
    ///   media item
    pub fn reposition_file(
        &mut self,
        file_id: FileId,
        before: Option<FileId>,
    ) -> Result<u32, MediaError> {
        let moved_index = self.file_index(file_id)?;
        let previous_primary = self.primary_file().map(MediaFile::id);

        let new_position = match before {
            None => {
                let position = self.next_position();
                self.files_mut()[moved_index].set_position(position);
                position
            }
            Some(anchor_id) => {
                let anchor_index = self.file_index(anchor_id)?;
                let anchor_position = self.files()[anchor_index].position();

                for file in self.files_mut() {
                    if file.id() != file_id && file.position() >= anchor_position {
                        file.set_position(file.position() + 1);
                    }
                }
                self.files_mut()[moved_index].set_position(anchor_position);
                anchor_position
            }
        };

        self.files_mut().sort_by_key(MediaFile::position);
        debug!(
            media_id = %self.id(),
            file_id = %file_id,
            position = new_position,
            "file repositioned"
        );

        if self.primary_file().map(MediaFile::id) != previous_primary {
            self.update_type();
        }
        Ok(new_position)
    }

    /// Enables or disables a file for playback and re-derives type and
    /// status.
    ///
    /// # Errors
    /// - `MediaError::FileNotFound` - No such file on this media item
    pub fn set_player_enabled(
        &mut self,
        file_id: FileId,
        enabled: bool,
        config: &LifecycleConfig,
    ) -> Result<(), MediaError> {
        let index = self.file_index(file_id)?;
        self.files_mut()[index].set_player_enabled_raw(enabled);
        self.update_type();
        self.update_status(config);
        Ok(())
    }

    /// Enables or disables a file for podcast feeds.
    ///
    /// # Errors
    /// - `MediaError::FileNotFound` - No such file on this media item
    /// - `MediaError::LastFeedFile` - Disabling the last feed-enabled file
    ///   of a published podcast episode
    pub fn set_feed_enabled(&mut self, file_id: FileId, enabled: bool) -> Result<(), MediaError> {
        let index = self.file_index(file_id)?;
        if !enabled && self.files()[index].feed_enabled() && self.is_last_feed_file(file_id) {
            return Err(MediaError::LastFeedFile { file_id });
        }
        self.files_mut()[index].set_feed_enabled_raw(enabled);
        Ok(())
    }

    /// Re-attaches a file at a stored position without re-deriving state.
    ///
    /// For storage-layer rehydration only: the stored status and type are
    /// trusted as already consistent.
    pub fn attach_existing(&mut self, mut file: MediaFile, position: u32) {
        file.set_position(position);
        self.files_mut().push(file);
        self.files_mut().sort_by_key(MediaFile::position);
    }

    fn next_position(&self) -> u32 {
        self.files()
            .iter()
            .map(MediaFile::position)
            .max()
            .map_or(1, |max| max + 1)
    }

    fn file_index(&self, file_id: FileId) -> Result<usize, MediaError> {
        self.files()
            .iter()
            .position(|file| file.id() == file_id)
            .ok_or(MediaError::FileNotFound {
                media_id: self.id(),
                file_id,
            })
    }

    /// Returns whether unsetting or removing this file would leave a
    /// published podcast episode without any feed entry.
    fn is_last_feed_file(&self, file_id: FileId) -> bool {
        if !self.podcast_episode || !self.status().contains_bits(bits::PUBLISH) {
            return false;
        }
        !self
            .files()
            .iter()
            .any(|file| file.id() != file_id && file.feed_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{Author, Container, FileSource, MediaId, MediaType};

    fn local(id: i64, container: Container) -> MediaFile {
        MediaFile::new(
            FileId(id),
            FileSource::Local {
                url: format!("/media/{id}.{}", container.extension()),
                container,
            },
        )
    }

    fn media_with_files(containers: &[Container]) -> Media {
        let config = LifecycleConfig::default();
        let mut media =
            Media::new(MediaId(3), "ordering-test", Author::new("Ada", "ada@example.com"))
                .unwrap();
        for (index, container) in containers.iter().enumerate() {
            media.add_file(local(index as i64 + 1, *container), &config);
        }
        media
    }

    fn positions(media: &Media) -> Vec<(FileId, u32)> {
        media
            .files()
            .iter()
            .map(|file| (file.id(), file.position()))
            .collect()
    }

    #[test]
    fn test_add_file_appends_after_current_maximum() {
        let media = media_with_files(&[Container::Mp4, Container::WebM, Container::Ogv]);
        assert_eq!(
            positions(&media),
            vec![(FileId(1), 1), (FileId(2), 2), (FileId(3), 3)]
        );
    }

    #[test]
    fn test_reposition_in_front_of_anchor_budges_anchor_and_later_files() {
        // [1:A, 2:B, 3:C], move B in front of A
        let mut media = media_with_files(&[Container::Mp4, Container::WebM, Container::Ogv]);
        let new_position = media.reposition_file(FileId(2), Some(FileId(1))).unwrap();

        assert_eq!(new_position, 1);
        // B takes A's old slot; A and C advance by one
        assert_eq!(
            positions(&media),
            vec![(FileId(2), 1), (FileId(1), 2), (FileId(3), 4)]
        );
    }

    #[test]
    fn test_reposition_leaves_earlier_files_untouched() {
        let mut media = media_with_files(&[
            Container::Mp4,
            Container::WebM,
            Container::Ogv,
            Container::Flv,
        ]);
        media.reposition_file(FileId(4), Some(FileId(3))).unwrap();

        assert_eq!(
            positions(&media),
            vec![(FileId(1), 1), (FileId(2), 2), (FileId(4), 3), (FileId(3), 4)]
        );
    }

    #[test]
    fn test_reposition_without_anchor_appends_to_end() {
        let mut media = media_with_files(&[Container::Mp4, Container::WebM, Container::Ogv]);
        let new_position = media.reposition_file(FileId(1), None).unwrap();

        assert_eq!(new_position, 4);
        assert_eq!(
            positions(&media),
            vec![(FileId(2), 2), (FileId(3), 3), (FileId(1), 4)]
        );
    }

    #[test]
    fn test_reposition_rederives_type_when_primary_changes() {
        let config = LifecycleConfig::default();
        let mut media = media_with_files(&[Container::Mp4]);
        media.add_file(local(2, Container::Mp3), &config);
        assert_eq!(media.media_type(), Some(MediaType::Video));

        media.reposition_file(FileId(2), Some(FileId(1))).unwrap();
        assert_eq!(media.media_type(), Some(MediaType::Audio));
    }

    #[test]
    fn test_reposition_unknown_file_or_anchor_fails() {
        let mut media = media_with_files(&[Container::Mp4]);

        let missing_file = media.reposition_file(FileId(99), None);
        assert!(matches!(
            missing_file,
            Err(MediaError::FileNotFound { .. })
        ));

        let missing_anchor = media.reposition_file(FileId(1), Some(FileId(99)));
        assert!(matches!(
            missing_anchor,
            Err(MediaError::FileNotFound { .. })
        ));
        // Failed reposition leaves positions untouched
        assert_eq!(positions(&media), vec![(FileId(1), 1)]);
    }

    #[test]
    fn test_remove_file_rederives_type() {
        let config = LifecycleConfig::default();
        let mut media = media_with_files(&[Container::Mp4, Container::Mp3]);

        media.remove_file(FileId(1), &config).unwrap();
        assert_eq!(media.media_type(), Some(MediaType::Audio));

        media.remove_file(FileId(2), &config).unwrap();
        assert_eq!(media.media_type(), None);
    }

    #[test]
    fn test_disabling_player_moves_primary() {
        let config = LifecycleConfig::default();
        let mut media = media_with_files(&[Container::Mp4, Container::Mp3]);

        media
            .set_player_enabled(FileId(1), false, &config)
            .unwrap();
        assert_eq!(media.primary_file().map(MediaFile::id), Some(FileId(2)));
        assert_eq!(media.media_type(), Some(MediaType::Audio));
    }

    #[test]
    fn test_last_feed_file_of_published_episode_is_protected() {
        let config = LifecycleConfig::default();
        let mut media = media_with_files(&[Container::Mp3, Container::Mp4]);
        media.podcast_episode = true;
        media.set_feed_enabled(FileId(2), false).unwrap();
        media.review_complete(&config);
        media.publish_now(chrono::Utc::now(), &config).unwrap();

        assert_eq!(
            media.set_feed_enabled(FileId(1), false),
            Err(MediaError::LastFeedFile { file_id: FileId(1) })
        );
        assert_eq!(
            media.remove_file(FileId(1), &config).unwrap_err(),
            MediaError::LastFeedFile { file_id: FileId(1) }
        );

        // Unpublished items are free to drop feed files
        media.status_mut().clear_bits(bits::PUBLISH);
        assert!(media.set_feed_enabled(FileId(1), false).is_ok());
    }

    #[test]
    fn test_attach_existing_preserves_stored_positions() {
        let mut media =
            Media::new(MediaId(4), "rehydrated", Author::new("Ada", "ada@example.com")).unwrap();
        media.attach_existing(local(2, Container::Mp3), 5);
        media.attach_existing(local(1, Container::Mp4), 2);

        assert_eq!(positions(&media), vec![(FileId(1), 2), (FileId(2), 5)]);
    }
}
