//! Reordering files under a live lifecycle: positions, primary file, and
//! derived type all stay consistent.

use driftcast_core::config::LifecycleConfig;
use driftcast_core::media::{
    Author, Container, FileId, FileSource, Media, MediaError, MediaFile, MediaId, MediaType,
};

fn upload(id: i64, container: Container) -> MediaFile {
    MediaFile::new(
        FileId(id),
        FileSource::Local {
            url: format!("/uploads/{id}.{}", container.extension()),
            container,
        },
    )
}

fn media_with(containers: &[Container]) -> Media {
    let config = LifecycleConfig::default();
    let mut media = Media::new(
        MediaId(11),
        "ordering-flow",
        Author::new("Ada", "ada@example.com"),
    )
    .unwrap();
    for (index, container) in containers.iter().enumerate() {
        media.add_file(upload(index as i64 + 1, *container), &config);
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
fn reposition_budges_anchor_and_everything_after_it() {
    let mut media = media_with(&[Container::Mp4, Container::WebM, Container::Ogv]);

    let new_position = media.reposition_file(FileId(2), Some(FileId(1))).unwrap();

    // B takes A's old position; A and C (old position >= 1) advance by one
    assert_eq!(new_position, 1);
    assert_eq!(
        positions(&media),
        vec![(FileId(2), 1), (FileId(1), 2), (FileId(3), 4)]
    );

    // Files ahead of the anchor are untouched by a later reorder
    let mut media = media_with(&[Container::Mp4, Container::WebM, Container::Ogv]);
    media.reposition_file(FileId(3), Some(FileId(2))).unwrap();
    assert_eq!(
        positions(&media),
        vec![(FileId(1), 1), (FileId(3), 2), (FileId(2), 3)]
    );
}

#[test]
fn repeated_reorders_keep_positions_unique() {
    let mut media = media_with(&[
        Container::Mp4,
        Container::WebM,
        Container::Ogv,
        Container::M4v,
    ]);

    media.reposition_file(FileId(4), Some(FileId(1))).unwrap();
    media.reposition_file(FileId(2), None).unwrap();
    media.reposition_file(FileId(3), Some(FileId(4))).unwrap();

    let mut seen: Vec<u32> = media.files().iter().map(|file| file.position()).collect();
    let ordered = seen.clone();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), media.files().len(), "positions must be unique");
    assert_eq!(
        ordered,
        {
            let mut sorted = ordered.clone();
            sorted.sort_unstable();
            sorted
        },
        "files() must come back position-ordered"
    );
}

#[test]
fn moving_an_audio_file_to_front_flips_the_derived_type() {
    let mut media = media_with(&[Container::Mp4, Container::Mp3]);
    assert_eq!(media.media_type(), Some(MediaType::Video));

    media.reposition_file(FileId(2), Some(FileId(1))).unwrap();
    assert_eq!(media.media_type(), Some(MediaType::Audio));

    media.reposition_file(FileId(2), None).unwrap();
    assert_eq!(media.media_type(), Some(MediaType::Video));
}

#[test]
fn reposition_with_foreign_ids_fails_cleanly() {
    let mut media = media_with(&[Container::Mp4, Container::WebM]);
    let before = positions(&media);

    assert!(matches!(
        media.reposition_file(FileId(77), Some(FileId(1))),
        Err(MediaError::FileNotFound { .. })
    ));
    assert!(matches!(
        media.reposition_file(FileId(1), Some(FileId(77))),
        Err(MediaError::FileNotFound { .. })
    ));
    assert_eq!(positions(&media), before);
}
