//! Facet kinds, interned facet values and per-facet value tables

use crate::arena::StrSpan;
use crate::buffer::GrowBuf;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Number of facet kinds
pub const FACET_COUNT: usize = 10;

/// A classification dimension records can be drilled down by
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum FacetKind {
    #[default]
    Developer,
    Publisher,
    ReleaseYear,
    PlayerCount,
    Genre,
    Origin,
    Region,
    Franchise,
    Tags,
    /// Derived from the core registry rather than the metadata database
    System,
}

/// Static description of a facet kind
#[derive(Debug, Clone, Copy)]
pub struct FacetInfo {
    /// Display name
    pub name: &'static str,
    /// Metadata field the value is read from; `None` for derived facets
    pub db_key: Option<&'static str>,
    /// One record may carry several values, split on `/`, `,` and `|`
    pub multi_valued: bool,
    /// Values are company names and get corporate suffixes stripped
    pub company: bool,
    /// Values are integers in the database and formatted as decimal text
    pub numeric: bool,
}

const fn info(
    name: &'static str,
    db_key: Option<&'static str>,
    multi_valued: bool,
    company: bool,
    numeric: bool,
) -> FacetInfo {
    FacetInfo { name, db_key, multi_valued, company, numeric }
}

const FACET_INFO: [FacetInfo; FACET_COUNT] = [
    info("Developer", Some("developer"), true, true, false),
    info("Publisher", Some("publisher"), true, true, false),
    info("Release Year", Some("releaseyear"), false, false, true),
    info("Player Count", Some("users"), false, false, true),
    info("Genre", Some("genre"), true, false, false),
    info("Origin", Some("origin"), false, false, false),
    info("Region", Some("region"), false, false, false),
    info("Franchise", Some("franchise"), false, false, false),
    info("Tags", Some("tags"), true, false, false),
    info("System", None, false, false, false),
];

impl FacetKind {
    /// Every facet kind, in table order
    pub const ALL: [FacetKind; FACET_COUNT] = [
        FacetKind::Developer,
        FacetKind::Publisher,
        FacetKind::ReleaseYear,
        FacetKind::PlayerCount,
        FacetKind::Genre,
        FacetKind::Origin,
        FacetKind::Region,
        FacetKind::Franchise,
        FacetKind::Tags,
        FacetKind::System,
    ];

    /// Position in [`FacetKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Static description of this kind
    pub fn info(self) -> &'static FacetInfo {
        &FACET_INFO[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn db_key(self) -> Option<&'static str> {
        self.info().db_key
    }

    pub fn is_multi_valued(self) -> bool {
        self.info().multi_valued
    }

    pub fn is_company(self) -> bool {
        self.info().company
    }

    pub fn is_numeric(self) -> bool {
        self.info().numeric
    }

    /// Find the facet a metadata field feeds
    pub fn from_db_key(key: &str) -> Option<FacetKind> {
        Self::ALL.into_iter().find(|kind| kind.db_key() == Some(key))
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a value within its facet
///
/// While an index is being built this is the insertion position; once the
/// build completes it is the value's rank in the sorted table.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ValueId(pub u32);

impl ValueId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A value identity qualified by its facet, as stored in overflow lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValueRef {
    pub facet: FacetKind,
    pub id: ValueId,
}

/// An interned facet value
#[derive(Debug, Clone, Copy)]
pub struct FacetValue {
    pub(crate) text: StrSpan,
    pub(crate) rank: u32,
}

impl FacetValue {
    /// Position in the sorted facet table
    pub fn rank(&self) -> u32 {
        self.rank
    }
}

/// All values seen for one facet
#[derive(Debug)]
pub struct FacetTable {
    pub(crate) values: GrowBuf<FacetValue>,
    pub(crate) has_unknown: bool,
}

impl Default for FacetTable {
    fn default() -> Self {
        Self { values: GrowBuf::new("facet table"), has_unknown: false }
    }
}

impl FacetTable {
    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether at least one record had no value for this facet
    pub fn has_unknown(&self) -> bool {
        self.has_unknown
    }

    pub fn values(&self) -> &[FacetValue] {
        &self.values
    }
}

/// Display ordering shared by facet values and record labels
///
/// Strings with different first bytes order by that byte; otherwise they
/// compare ASCII case-insensitively.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    match (a.first(), b.first()) {
        (Some(x), Some(y)) if x != y => x.cmp(y),
        _ => a
            .iter()
            .map(u8::to_ascii_lowercase)
            .cmp(b.iter().map(u8::to_ascii_lowercase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facet_table_flags() {
        assert!(FacetKind::Developer.is_company());
        assert!(FacetKind::Developer.is_multi_valued());
        assert!(FacetKind::Genre.is_multi_valued());
        assert!(!FacetKind::Genre.is_company());
        assert!(FacetKind::ReleaseYear.is_numeric());
        assert!(!FacetKind::Region.is_multi_valued());
        assert_eq!(FacetKind::System.db_key(), None);
    }

    #[test]
    fn test_from_db_key() {
        assert_eq!(FacetKind::from_db_key("users"), Some(FacetKind::PlayerCount));
        assert_eq!(FacetKind::from_db_key("tags"), Some(FacetKind::Tags));
        assert_eq!(FacetKind::from_db_key("system"), None);
        assert_eq!(FacetKind::from_db_key("name"), None);
    }

    #[test]
    fn test_all_matches_index() {
        for (i, kind) in FacetKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(FacetKind::PlayerCount.to_string(), "Player Count");
    }

    #[test]
    fn test_compare_text_first_byte_then_nocase() {
        assert_eq!(compare_text("action", "Platform"), Ordering::Greater); // 'a' > 'P'
        assert_eq!(compare_text("Action", "Platform"), Ordering::Less);
        assert_eq!(compare_text("ACTION", "Action"), Ordering::Equal);
        assert_eq!(compare_text("Action", "Action RPG"), Ordering::Less);
        assert_eq!(compare_text("", "A"), Ordering::Less);
    }
}
