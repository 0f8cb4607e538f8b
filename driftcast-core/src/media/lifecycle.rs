//! Status and type derivation for media items.
//!
//! The flags `unreviewed`, `unencoded`, `draft` and the audio/video type are
//! derived from the attached files and must be recomputed whenever files,
//! their flags, or the publish window change. Both derivations are
//! idempotent: running them twice with no intervening change yields the same
//! result.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::{Media, MediaError};
use crate::config::LifecycleConfig;
use crate::status::bits;

impl Media {
    /// Re-derives the audio/video type from the current primary file.
    ///
    /// The type is never set by callers directly; it always equals the
    /// medium of the lowest-position player-enabled file, or `None` when no
    /// such file exists.
    pub fn update_type(&mut self) {
        let derived = self.primary_file().and_then(|file| file.media_type());
        if derived != self.media_type() {
            trace!(media_id = %self.id(), ?derived, "media type re-derived");
            self.set_media_type(derived);
        }
    }

    /// Re-validates the derived status flags, in fixed order.
    ///
    /// 1. Review: with no attached files the item is `unreviewed`. Review
    ///    completion is a human action; this routine never clears the flag.
    /// 2. Encoding: `unencoded` is cleared exactly when some file is
    ///    playable under `config`, or (for non-podcast media) embeddable.
    /// 3. Publish guard: while any of `unencoded`, `unreviewed`, `draft`
    ///    remain, `publish` is withdrawn and the item falls back to `draft`.
    ///    The guard never *sets* `publish`; only [`Media::publish_now`]
    ///    does.
    pub fn update_status(&mut self, config: &LifecycleConfig) {
        self.validate_review_status();
        self.validate_encoding_status(config);
        self.validate_publish_status();
    }

    /// Marks editorial review as complete and re-validates.
    pub fn review_complete(&mut self, config: &LifecycleConfig) {
        self.status_mut().clear_bits(bits::UNREVIEWED);
        self.update_status(config);
        debug!(media_id = %self.id(), status = %self.status(), "review complete");
    }

    /// Publishes the item now, stamping `publish_on` if it is unset.
    ///
    /// Publication is always an explicit action: clearing of the last
    /// blocking flag never auto-publishes.
    ///
    /// # Errors
    /// - `MediaError::NotReadyToPublish` - A blocking flag
    ///   (`unencoded`/`unreviewed`) remains after re-validation
    pub fn publish_now(
        &mut self,
        now: DateTime<Utc>,
        config: &LifecycleConfig,
    ) -> Result<(), MediaError> {
        self.status_mut().clear_bits(bits::DRAFT);
        self.update_status(config);

        let blocking = self.blocking_flags();
        if !blocking.is_empty() {
            // A refused publish must leave the item a draft, not half-way
            self.status_mut().insert_bits(bits::DRAFT);
            self.update_status(config);
            debug!(media_id = %self.id(), ?blocking, "publish refused");
            return Err(MediaError::NotReadyToPublish {
                media_id: self.id(),
                blocking: blocking.join(","),
            });
        }

        self.status_mut().insert_bits(bits::PUBLISH);
        if self.publish_on.is_none() {
            self.publish_on = Some(now);
        }
        self.update_status(config);
        debug!(media_id = %self.id(), publish_on = ?self.publish_on, "published");
        Ok(())
    }

    /// Logically deletes the item. The row survives until purged.
    pub fn trash(&mut self) {
        self.status_mut().insert_bits(bits::TRASH);
        debug!(media_id = %self.id(), "trashed");
    }

    /// Restores a logically deleted item.
    pub fn restore(&mut self) {
        self.status_mut().clear_bits(bits::TRASH);
        debug!(media_id = %self.id(), "restored from trash");
    }

    /// Returns whether some attached file is playable by the site's own
    /// players under `config`.
    pub fn can_play(&self, config: &LifecycleConfig) -> bool {
        self.files().iter().any(|file| {
            file.container()
                .zip(file.media_type())
                .is_some_and(|(container, media_type)| config.is_encoded(media_type, container))
        })
    }

    /// Returns whether some attached file is an embed into a third-party
    /// host.
    pub fn can_embed(&self) -> bool {
        self.files().iter().any(|file| file.is_embed())
    }

    fn validate_review_status(&mut self) {
        if self.files().is_empty() {
            self.status_mut().insert_bits(bits::UNREVIEWED);
        }
    }

    fn validate_encoding_status(&mut self, config: &LifecycleConfig) {
        let encoded = self.can_play(config) || (!self.podcast_episode && self.can_embed());
        if encoded {
            self.status_mut().clear_bits(bits::UNENCODED);
        } else {
            self.status_mut().insert_bits(bits::UNENCODED);
        }
    }

    fn validate_publish_status(&mut self) {
        let blocked = self
            .status()
            .intersects_bits(bits::UNENCODED | bits::UNREVIEWED | bits::DRAFT);
        if blocked && self.status().contains_bits(bits::PUBLISH) {
            debug!(media_id = %self.id(), status = %self.status(), "publish withdrawn");
            self.status_mut().clear_bits(bits::PUBLISH);
            self.status_mut().insert_bits(bits::DRAFT);
        }
    }
}
