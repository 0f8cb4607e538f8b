//! Property tests for the status bitmask collection.

use driftcast_core::status::{StatusCatalog, StatusSet};
use proptest::prelude::*;

const MEDIA_FLAGS: [&str; 5] = ["trash", "publish", "draft", "unencoded", "unreviewed"];

fn arbitrary_flag_subset() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::collection::vec(proptest::sample::select(&MEDIA_FLAGS[..]), 0..=5)
}

proptest! {
    /// Encoding to an integer and decoding again is lossless for every
    /// valid subset of the catalog, duplicates included.
    #[test]
    fn status_set_round_trips_through_integer(flags in arbitrary_flag_subset()) {
        let set = StatusSet::from_names(StatusCatalog::media(), &flags).unwrap();
        let decoded = StatusSet::from_mask(StatusCatalog::media(), set.mask()).unwrap();
        prop_assert_eq!(&decoded, &set);
        prop_assert_eq!(decoded.mask(), set.mask());
    }

    /// The mask is always the OR of the member bits and never contains a
    /// bit outside the catalog.
    #[test]
    fn mask_is_or_of_member_bits(flags in arbitrary_flag_subset()) {
        let catalog = StatusCatalog::media();
        let set = StatusSet::from_names(catalog.clone(), &flags).unwrap();

        let mut expected = 0u64;
        for flag in &flags {
            expected |= catalog.bit(flag).unwrap();
        }
        prop_assert_eq!(set.mask(), expected);
        prop_assert_eq!(set.mask() & !catalog.full_mask(), 0);
    }

    /// Mutating with an invalid name fails and leaves the set untouched.
    #[test]
    fn invalid_names_never_corrupt_a_set(flags in arbitrary_flag_subset(), bogus in "[a-z]{1,12}") {
        prop_assume!(!MEDIA_FLAGS.contains(&bogus.as_str()));

        let mut set = StatusSet::from_names(StatusCatalog::media(), &flags).unwrap();
        let before = set.clone();

        prop_assert!(set.add(&bogus).is_err());
        prop_assert!(set.remove(&bogus).is_err());
        prop_assert!(set.discard(&bogus).is_err());
        prop_assert!(set.contains(&bogus).is_err());
        prop_assert_eq!(set, before);
    }

    /// Parsing the display form reproduces the set.
    #[test]
    fn display_form_parses_back(flags in arbitrary_flag_subset()) {
        let set = StatusSet::from_names(StatusCatalog::media(), &flags).unwrap();
        let reparsed = StatusSet::parse(StatusCatalog::media(), &set.to_string()).unwrap();
        prop_assert_eq!(reparsed, set);
    }
}

#[test]
fn documented_bit_layout_is_stable() {
    // The storage layer depends on this exact layout
    let set = StatusSet::parse(StatusCatalog::media(), "draft,unencoded,unreviewed").unwrap();
    assert_eq!(set.mask(), 28);

    let catalog = StatusCatalog::media();
    assert_eq!(catalog.bit("trash").unwrap(), 1);
    assert_eq!(catalog.bit("publish").unwrap(), 2);
    assert_eq!(catalog.bit("draft").unwrap(), 4);
    assert_eq!(catalog.bit("unencoded").unwrap(), 8);
    assert_eq!(catalog.bit("unreviewed").unwrap(), 16);
}
