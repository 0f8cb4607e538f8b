//! Integration tests for Driftcast
//!
//! These tests exercise the public API of driftcast-core the way a hosting
//! application would: full upload/review/publish flows, reordering under a
//! lifecycle, and playback selection against realistic client identities.

#[path = "integration/status_properties.rs"]
mod status_properties;

#[path = "integration/publish_flow.rs"]
mod publish_flow;

#[path = "integration/file_ordering.rs"]
mod file_ordering;

#[path = "integration/player_selection.rs"]
mod player_selection;
