//! End-to-end lifecycle flows: upload, encode, review, publish, and the
//! invariants that hold throughout.

use chrono::Utc;
use driftcast_core::config::LifecycleConfig;
use driftcast_core::media::{
    Author, Container, FileId, FileSource, Media, MediaError, MediaFile, MediaId, MediaType,
};
use driftcast_core::status::{StatusCatalog, StatusSet};
use proptest::prelude::*;

fn new_media(slug: &str) -> Media {
    Media::new(MediaId(1), slug, Author::new("Ada", "ada@example.com")).unwrap()
}

fn upload(id: i64, container: Container) -> MediaFile {
    MediaFile::new(
        FileId(id),
        FileSource::Local {
            url: format!("/uploads/{id}.{}", container.extension()),
            container,
        },
    )
    .with_size(1_000_000)
}

#[test]
fn upload_to_publish_happy_path() {
    let config = LifecycleConfig::default();
    let mut media = new_media("first-episode");

    // Fresh upload: everything blocks publication
    assert_eq!(media.status().to_string(), "draft,unencoded,unreviewed");

    // Encoded file arrives
    media.add_file(upload(1, Container::Mp4), &config);
    assert_eq!(media.media_type(), Some(MediaType::Video));
    assert!(!media.status().contains("unencoded").unwrap());
    // Review is a human action; adding files never clears it
    assert!(media.status().contains("unreviewed").unwrap());

    media.review_complete(&config);
    assert!(!media.status().contains("unreviewed").unwrap());
    // Still a draft: nothing auto-publishes
    assert!(!media.status().contains("publish").unwrap());

    let now = Utc::now();
    media.publish_now(now, &config).unwrap();
    assert!(media.status().contains("publish").unwrap());
    assert!(!media.status().contains("draft").unwrap());
    assert_eq!(media.publish_on, Some(now));
    assert!(media.is_published(now));
}

#[test]
fn publish_refused_until_blockers_clear() {
    let config = LifecycleConfig::default();
    let mut media = new_media("not-ready");

    // No files at all
    let err = media.publish_now(Utc::now(), &config).unwrap_err();
    match err {
        MediaError::NotReadyToPublish { blocking, .. } => {
            assert!(blocking.contains("unreviewed"));
            assert!(blocking.contains("unencoded"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Unplayable upload still blocks on encoding
    media.add_file(upload(1, Container::Avi), &config);
    media.review_complete(&config);
    let err = media.publish_now(Utc::now(), &config).unwrap_err();
    match err {
        MediaError::NotReadyToPublish { blocking, .. } => {
            assert_eq!(blocking, "unencoded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn losing_all_files_withdraws_publication() {
    let config = LifecycleConfig::default();
    let mut media = new_media("short-lived");
    media.add_file(upload(1, Container::Mp3), &config);
    media.review_complete(&config);
    media.publish_now(Utc::now(), &config).unwrap();

    media.remove_file(FileId(1), &config).unwrap();

    assert!(!media.status().contains("publish").unwrap());
    assert!(media.status().contains("draft").unwrap());
    assert!(media.status().contains("unreviewed").unwrap());
    assert!(media.status().contains("unencoded").unwrap());
    assert_eq!(media.media_type(), None);
}

#[test]
fn storage_round_trip_via_mask() {
    // Simulates the repository boundary: persist the mask, rehydrate later
    let config = LifecycleConfig::default();
    let mut media = new_media("persisted");
    media.add_file(upload(1, Container::M4a), &config);
    media.review_complete(&config);

    let stored_mask = media.status().mask();

    let mut rehydrated = new_media("persisted");
    rehydrated
        .set_status(StatusSet::from_mask(StatusCatalog::media(), stored_mask).unwrap())
        .unwrap();
    rehydrated.attach_existing(upload(1, Container::M4a), 1);

    assert_eq!(rehydrated.status(), media.status());
    rehydrated.update_type();
    assert_eq!(rehydrated.media_type(), Some(MediaType::Audio));
}

fn arbitrary_containers() -> impl Strategy<Value = Vec<Container>> {
    let container = proptest::sample::select(vec![
        Container::Mp3,
        Container::M4a,
        Container::Oga,
        Container::Mp4,
        Container::WebM,
        Container::Ogv,
        Container::Flv,
        Container::Avi,
        Container::Mov,
        Container::Srt,
    ]);
    proptest::collection::vec(container, 0..6)
}

proptest! {
    /// update_status is idempotent for any mix of uploads.
    #[test]
    fn update_status_is_idempotent(containers in arbitrary_containers(), reviewed in any::<bool>()) {
        let config = LifecycleConfig::default();
        let mut media = new_media("prop-idempotent");
        for (index, container) in containers.iter().enumerate() {
            media.add_file(upload(index as i64 + 1, *container), &config);
        }
        if reviewed {
            media.review_complete(&config);
        }

        media.update_status(&config);
        let first = media.status().clone();
        media.update_status(&config);
        prop_assert_eq!(media.status(), &first);
    }

    /// publish never coexists with a blocking flag, whatever happens.
    #[test]
    fn publish_excludes_blocking_flags(containers in arbitrary_containers()) {
        let config = LifecycleConfig::default();
        let mut media = new_media("prop-exclusion");
        for (index, container) in containers.iter().enumerate() {
            media.add_file(upload(index as i64 + 1, *container), &config);
        }
        media.review_complete(&config);
        let _ = media.publish_now(Utc::now(), &config);

        let status = media.status();
        if status.contains("publish").unwrap() {
            prop_assert!(!status.contains("draft").unwrap());
            prop_assert!(!status.contains("unencoded").unwrap());
            prop_assert!(!status.contains("unreviewed").unwrap());
        }
    }
}
