//! Storage-layer predicates over status bitmask columns.
//!
//! The database stores a status set as a single integer column. Queries that
//! filter on flags ("published and not trashed") are expressed as bitwise
//! predicates built here, so the bit layout never leaks into calling code.

use super::{StatusError, StatusSet};

/// A boolean condition over a stored status bitmask.
///
/// Built from an include set ("must contain at least these flags") and an
/// exclude set ("must contain none of these flags"). Evaluates in memory via
/// [`StatusPredicate::matches`] or renders to a SQL fragment via
/// [`StatusPredicate::to_sql`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPredicate {
    include: u64,
    exclude: u64,
}

impl StatusPredicate {
    /// Builds a predicate from include and exclude flag sets.
    ///
    /// # Errors
    /// - `StatusError::CatalogMismatch` - Sets use different catalogs
    pub fn new(include: &StatusSet, exclude: &StatusSet) -> Result<Self, StatusError> {
        // Catalog agreement is the only structural requirement. Overlapping
        // include/exclude sets yield a valid, always-false condition.
        include.excludes(exclude)?;
        Ok(Self {
            include: include.mask(),
            exclude: exclude.mask(),
        })
    }

    /// Mask of flags that must all be present.
    pub fn include_mask(&self) -> u64 {
        self.include
    }

    /// Mask of flags that must all be absent.
    pub fn exclude_mask(&self) -> u64 {
        self.exclude
    }

    /// Evaluates the predicate against a stored bitmask value.
    pub fn matches(&self, stored: u64) -> bool {
        stored & self.include == self.include && stored & self.exclude == 0
    }

    /// Renders the predicate as a SQL condition over the named column.
    ///
    /// Produces `(column & include) = include AND (column & exclude) = 0`,
    /// omitting whichever side is empty. `column` must be a trusted
    /// identifier; it is interpolated verbatim.
    pub fn to_sql(&self, column: &str) -> String {
        let mut clauses = Vec::with_capacity(2);
        if self.include != 0 {
            clauses.push(format!("({column} & {0}) = {0}", self.include));
        }
        if self.exclude != 0 {
            clauses.push(format!("({column} & {}) = 0", self.exclude));
        }
        if clauses.is_empty() {
            "1 = 1".to_string()
        } else {
            clauses.join(" AND ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusCatalog;

    fn predicate(include: &str, exclude: &str) -> StatusPredicate {
        let include = StatusSet::parse(StatusCatalog::media(), include).unwrap();
        let exclude = StatusSet::parse(StatusCatalog::media(), exclude).unwrap();
        StatusPredicate::new(&include, &exclude).unwrap()
    }

    #[test]
    fn test_published_not_trashed_sql() {
        let predicate = predicate("publish", "trash");
        assert_eq!(
            predicate.to_sql("media.status"),
            "(media.status & 2) = 2 AND (media.status & 1) = 0"
        );
    }

    #[test]
    fn test_matches_mirrors_sql_semantics() {
        let predicate = predicate("publish", "trash,unreviewed");

        // publish only
        assert!(predicate.matches(2));
        // publish + draft: draft is not excluded here
        assert!(predicate.matches(2 | 4));
        // publish + trash
        assert!(!predicate.matches(2 | 1));
        // no publish
        assert!(!predicate.matches(4));
    }

    #[test]
    fn test_empty_sides_are_omitted() {
        assert_eq!(predicate("", "trash").to_sql("status"), "(status & 1) = 0");
        assert_eq!(
            predicate("publish", "").to_sql("status"),
            "(status & 2) = 2"
        );
        assert_eq!(predicate("", "").to_sql("status"), "1 = 1");
    }
}
