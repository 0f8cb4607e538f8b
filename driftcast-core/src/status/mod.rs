//! Status flag catalogs and bitmask sets.
//!
//! A media item carries several independent boolean flags (trash, publish,
//! draft, unencoded, unreviewed) packed into one integer column. The types
//! here are the single authority on that bit layout: `StatusCatalog` assigns
//! each named flag a power-of-two bit, and `StatusSet` is a mutable set of
//! active flags with set-algebra queries that validate every flag name
//! against the catalog before touching the mask.

mod predicate;

use std::fmt;
use std::sync::{Arc, LazyLock};

pub use predicate::StatusPredicate;

/// Logical-deletion flag. Trashed media stays in storage until purged.
pub const TRASH: &str = "trash";
/// Visible on the public site once the publish window opens.
pub const PUBLISH: &str = "publish";
/// Explicitly held back by an editor, or blocked from publishing.
pub const DRAFT: &str = "draft";
/// No attached file is playable or embeddable yet.
pub const UNENCODED: &str = "unencoded";
/// Awaiting editorial review.
pub const UNREVIEWED: &str = "unreviewed";

/// Bit values for the standard media catalog.
///
/// Only meaningful for sets built over [`StatusCatalog::media`]. The media
/// lifecycle code manipulates flags through these so that compile-time
/// constants, rather than runtime name lookups, carry the proof of validity.
pub(crate) mod bits {
    pub const TRASH: u64 = 1;
    pub const PUBLISH: u64 = 1 << 1;
    pub const DRAFT: u64 = 1 << 2;
    pub const UNENCODED: u64 = 1 << 3;
    pub const UNREVIEWED: u64 = 1 << 4;
}

/// Errors raised by status catalog and set operations.
///
/// Every variant signals a programmer or configuration error. None of them
/// are recoverable by retry and none should be silently swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown status flag: {name}")]
    UnknownFlag { name: String },

    #[error("bitmask {bits:#x} contains bits outside the catalog")]
    UnknownBits { bits: u64 },

    #[error("status flag not set: {name}")]
    FlagNotSet { name: String },

    #[error("status sets belong to different catalogs")]
    CatalogMismatch,

    #[error("invalid status catalog: {reason}")]
    InvalidCatalog { reason: String },
}

/// Immutable catalog of named boolean flags.
///
/// Each flag is assigned a distinct power-of-two bit in declaration order.
/// A catalog never changes after construction; sets hold an `Arc` to it and
/// validate every operation against it.
#[derive(Debug, PartialEq, Eq)]
pub struct StatusCatalog {
    flags: Vec<String>,
}

static MEDIA_CATALOG: LazyLock<Arc<StatusCatalog>> = LazyLock::new(|| {
    let catalog = StatusCatalog::new([TRASH, PUBLISH, DRAFT, UNENCODED, UNREVIEWED])
        .expect("standard media catalog is well formed");
    Arc::new(catalog)
});

impl StatusCatalog {
    /// Builds a catalog from an ordered list of flag names.
    ///
    /// The first name receives bit 1, the second bit 2, and so on.
    ///
    /// # Errors
    /// - `StatusError::InvalidCatalog` - Empty catalog, empty name, duplicate
    ///   name, or more than 64 flags
    pub fn new<I, S>(names: I) -> Result<Self, StatusError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut flags: Vec<String> = Vec::new();

        for name in names {
            let name = name.into();
            if name.is_empty() {
                return Err(StatusError::InvalidCatalog {
                    reason: "flag names must be non-empty".to_string(),
                });
            }
            if flags.contains(&name) {
                return Err(StatusError::InvalidCatalog {
                    reason: format!("duplicate flag name: {name}"),
                });
            }
            flags.push(name);
        }

        if flags.is_empty() {
            return Err(StatusError::InvalidCatalog {
                reason: "catalog must define at least one flag".to_string(),
            });
        }
        if flags.len() > 64 {
            return Err(StatusError::InvalidCatalog {
                reason: format!("catalog defines {} flags, maximum is 64", flags.len()),
            });
        }

        Ok(Self { flags })
    }

    /// Returns the shared standard catalog for media items:
    /// `{trash: 1, publish: 2, draft: 4, unencoded: 8, unreviewed: 16}`.
    pub fn media() -> Arc<StatusCatalog> {
        Arc::clone(&MEDIA_CATALOG)
    }

    /// Returns the bit value assigned to a flag name.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Name is not in the catalog
    pub fn bit(&self, name: &str) -> Result<u64, StatusError> {
        self.flags
            .iter()
            .position(|flag| flag == name)
            .map(|index| 1 << index)
            .ok_or_else(|| StatusError::UnknownFlag {
                name: name.to_string(),
            })
    }

    /// Returns whether the catalog defines the given flag name.
    pub fn defines(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag == name)
    }

    /// Flag names in bit order.
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Number of flags defined by the catalog.
    pub fn flag_count(&self) -> usize {
        self.flags.len()
    }

    /// Bitwise OR of every flag the catalog defines.
    pub fn full_mask(&self) -> u64 {
        if self.flags.len() == 64 {
            u64::MAX
        } else {
            (1 << self.flags.len()) - 1
        }
    }
}

/// Mutable set of active flags over a shared catalog.
///
/// The integer encoding is always the bitwise OR of the active flags' bit
/// values, and decoding an integer never yields a flag outside the catalog.
/// All name-taking operations fail fast on unknown names and leave the set
/// unmodified on error.
#[derive(Debug, Clone)]
pub struct StatusSet {
    catalog: Arc<StatusCatalog>,
    mask: u64,
}

impl StatusSet {
    /// Creates an empty set over the given catalog.
    pub fn empty(catalog: Arc<StatusCatalog>) -> Self {
        Self { catalog, mask: 0 }
    }

    /// Decodes an integer bitmask into a set.
    ///
    /// Round-trips exactly with [`StatusSet::mask`]:
    /// `StatusSet::from_mask(cat, s.mask()) == s`.
    ///
    /// # Errors
    /// - `StatusError::UnknownBits` - Mask has bits outside the catalog
    pub fn from_mask(catalog: Arc<StatusCatalog>, mask: u64) -> Result<Self, StatusError> {
        if mask & !catalog.full_mask() != 0 {
            return Err(StatusError::UnknownBits { bits: mask });
        }
        Ok(Self { catalog, mask })
    }

    /// Builds a set from a list of flag names.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Any name not in the catalog
    pub fn from_names<I, S>(catalog: Arc<StatusCatalog>, names: I) -> Result<Self, StatusError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::empty(catalog);
        for name in names {
            set.add(name.as_ref())?;
        }
        Ok(set)
    }

    /// Parses a comma-separated list of flag names, e.g. `"draft,unencoded"`.
    ///
    /// Whitespace around names is ignored; an empty string yields an empty
    /// set.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Any name not in the catalog
    pub fn parse(catalog: Arc<StatusCatalog>, text: &str) -> Result<Self, StatusError> {
        let names = text
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty());
        Self::from_names(catalog, names)
    }

    /// The catalog this set validates against.
    pub fn catalog(&self) -> &Arc<StatusCatalog> {
        &self.catalog
    }

    /// Integer encoding: bitwise OR of the active flags' bit values.
    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Returns whether no flags are active.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }

    /// Number of active flags.
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Activates a flag.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Name is not in the catalog
    pub fn add(&mut self, flag: &str) -> Result<(), StatusError> {
        let bit = self.catalog.bit(flag)?;
        self.mask |= bit;
        Ok(())
    }

    /// Deactivates a flag; a no-op when the flag is not active.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Name is not in the catalog
    pub fn discard(&mut self, flag: &str) -> Result<(), StatusError> {
        let bit = self.catalog.bit(flag)?;
        self.mask &= !bit;
        Ok(())
    }

    /// Deactivates a flag that must currently be active.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Name is not in the catalog
    /// - `StatusError::FlagNotSet` - Flag is valid but not active
    pub fn remove(&mut self, flag: &str) -> Result<(), StatusError> {
        let bit = self.catalog.bit(flag)?;
        if self.mask & bit == 0 {
            return Err(StatusError::FlagNotSet {
                name: flag.to_string(),
            });
        }
        self.mask &= !bit;
        Ok(())
    }

    /// Returns whether a flag is active.
    ///
    /// # Errors
    /// - `StatusError::UnknownFlag` - Name is not in the catalog
    pub fn contains(&self, flag: &str) -> Result<bool, StatusError> {
        let bit = self.catalog.bit(flag)?;
        Ok(self.mask & bit != 0)
    }

    /// Returns whether any flag is active in both sets.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn intersects(&self, other: &StatusSet) -> Result<bool, StatusError> {
        self.check_catalog(other)?;
        Ok(self.mask & other.mask != 0)
    }

    /// Returns whether no flag is active in both sets.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn excludes(&self, other: &StatusSet) -> Result<bool, StatusError> {
        self.check_catalog(other)?;
        Ok(self.mask & other.mask == 0)
    }

    /// Returns whether this set contains at least every flag of `other`.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn is_superset(&self, other: &StatusSet) -> Result<bool, StatusError> {
        self.check_catalog(other)?;
        Ok(self.mask & other.mask == other.mask)
    }

    /// Returns whether every flag of this set is also in `other`.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn is_subset(&self, other: &StatusSet) -> Result<bool, StatusError> {
        self.check_catalog(other)?;
        Ok(self.mask & other.mask == self.mask)
    }

    /// Set union over the same catalog.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn union(&self, other: &StatusSet) -> Result<StatusSet, StatusError> {
        self.check_catalog(other)?;
        Ok(Self {
            catalog: Arc::clone(&self.catalog),
            mask: self.mask | other.mask,
        })
    }

    /// Set intersection over the same catalog.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn intersection(&self, other: &StatusSet) -> Result<StatusSet, StatusError> {
        self.check_catalog(other)?;
        Ok(Self {
            catalog: Arc::clone(&self.catalog),
            mask: self.mask & other.mask,
        })
    }

    /// Flags of this set that are not in `other`.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn difference(&self, other: &StatusSet) -> Result<StatusSet, StatusError> {
        self.check_catalog(other)?;
        Ok(Self {
            catalog: Arc::clone(&self.catalog),
            mask: self.mask & !other.mask,
        })
    }

    /// Active flag names in bit order.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.catalog
            .flag_names()
            .enumerate()
            .filter(|(index, _)| self.mask & (1 << index) != 0)
            .map(|(_, name)| name)
    }

    fn check_catalog(&self, other: &StatusSet) -> Result<(), StatusError> {
        if Arc::ptr_eq(&self.catalog, &other.catalog) || self.catalog == other.catalog {
            Ok(())
        } else {
            Err(StatusError::CatalogMismatch)
        }
    }

    /// Activates bits known at compile time to belong to the catalog.
    pub(crate) fn insert_bits(&mut self, bits: u64) {
        debug_assert_eq!(bits & !self.catalog.full_mask(), 0);
        self.mask |= bits;
    }

    /// Deactivates bits known at compile time to belong to the catalog.
    pub(crate) fn clear_bits(&mut self, bits: u64) {
        debug_assert_eq!(bits & !self.catalog.full_mask(), 0);
        self.mask &= !bits;
    }

    /// Returns whether all of the given bits are active.
    pub(crate) fn contains_bits(&self, bits: u64) -> bool {
        self.mask & bits == bits
    }

    /// Returns whether any of the given bits are active.
    pub(crate) fn intersects_bits(&self, bits: u64) -> bool {
        self.mask & bits != 0
    }
}

impl PartialEq for StatusSet {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask
            && (Arc::ptr_eq(&self.catalog, &other.catalog) || self.catalog == other.catalog)
    }
}

impl Eq for StatusSet {}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for flag in self.flags() {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{flag}")?;
            first = false;
        }
        Ok(())
    }
}
