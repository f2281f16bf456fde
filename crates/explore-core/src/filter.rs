//! Filter evaluation over a built index
//!
//! A [`Query`] is a stack of facet selections plus an optional search text.
//! Selections are ANDed. A selection on a multi-valued facet also matches
//! values held in a record's overflow list. Search is an ASCII
//! case-insensitive substring test against the playlist label.

use crate::error::ExploreResult;
use crate::facet::{FacetKind, ValueId, ValueRef, compare_text};
use crate::hash_map32::HashMap32;
use crate::index::{Index, Record, RecordId};
use serde::{Deserialize, Serialize};

/// One drill-down level: a facet and the value required for it
///
/// `value: None` selects the records with no value for the facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub facet: FacetKind,
    pub value: Option<ValueId>,
}

/// Active selections and search text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    selections: Vec<Selection>,
    #[serde(default)]
    search: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `facet` to be `value`
    #[must_use]
    pub fn select(mut self, facet: FacetKind, value: ValueId) -> Self {
        self.selections.push(Selection { facet, value: Some(value) });
        self
    }

    /// Require `facet` to have no value
    #[must_use]
    pub fn select_unknown(mut self, facet: FacetKind) -> Self {
        self.selections.push(Selection { facet, value: None });
        self
    }

    /// Filter by label substring; empty text clears the search
    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = (!text.is_empty()).then_some(text);
        self
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether some selection already constrains `facet`
    pub fn is_constrained(&self, facet: FacetKind) -> bool {
        self.selections.iter().any(|s| s.facet == facet)
    }
}

/// A facet value in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueEntry<'a> {
    pub id: ValueId,
    pub text: &'a str,
}

/// Values of one facet, plus whether an "unknown" bucket applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueListing<'a> {
    pub facet: FacetKind,
    pub values: Vec<ValueEntry<'a>>,
    pub has_unknown: bool,
}

impl<'a> ValueListing<'a> {
    pub(crate) fn empty(facet: FacetKind) -> Self {
        Self { facet, values: Vec::new(), has_unknown: false }
    }
}

/// A record in a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordEntry<'a> {
    pub id: RecordId,
    /// Override title if the metadata has one, else the playlist label
    pub title: &'a str,
}

/// Evaluates selections and search text against an [`Index`]
///
/// Listings borrow from the index only, so they outlive the query.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a, 'q> {
    index: &'a Index,
    selections: &'q [Selection],
    search: Option<&'q str>,
}

impl<'a, 'q> FilterEvaluator<'a, 'q> {
    pub fn new(index: &'a Index, query: &'q Query) -> Self {
        Self { index, selections: query.selections(), search: query.search_text() }
    }

    /// Replace the search text, e.g. with a length-clamped copy
    #[must_use]
    pub fn with_search(mut self, search: Option<&'q str>) -> Self {
        self.search = search.filter(|s| !s.is_empty());
        self
    }

    fn selection_matches(&self, record: &Record, selection: &Selection) -> bool {
        if record.primary(selection.facet) == selection.value {
            return true;
        }
        match selection.value {
            Some(id) if selection.facet.is_multi_valued() => self
                .index
                .overflow(record)
                .contains(&ValueRef { facet: selection.facet, id }),
            _ => false,
        }
    }

    /// Whether a record passes every selection and the search text
    pub fn matches(&self, record: &Record) -> bool {
        self.selections.iter().all(|s| self.selection_matches(record, s))
            && self
                .search
                .is_none_or(|needle| contains_ignore_ascii_case(self.index.label(record), needle))
    }

    /// Matching records with their ids, in label order
    pub fn records(&self) -> impl Iterator<Item = (RecordId, &'a Record)> + '_ {
        let index = self.index;
        index
            .records()
            .iter()
            .enumerate()
            .filter(move |(_, record)| self.matches(record))
            .map(|(i, record)| (RecordId(i as u32), record))
    }

    /// Matching records with their display titles
    pub fn list_records(&self) -> Vec<RecordEntry<'a>> {
        let index = self.index;
        self.records()
            .map(|(id, record)| RecordEntry { id, title: index.display_title(record) })
            .collect()
    }

    /// Distinct values of `facet` among the matching records, sorted by text
    ///
    /// `has_unknown` is set when a matching record has no value for the facet.
    pub fn list_values(&self, facet: FacetKind) -> ExploreResult<ValueListing<'a>> {
        let index = self.index;
        let mut listing = ValueListing::empty(facet);
        // keyed by rank + 1; zero is the empty-slot key
        let mut emitted: HashMap32<bool> = HashMap32::new();

        for (_, record) in self.records() {
            if record.primary(facet).is_none() {
                listing.has_unknown = true;
                continue;
            }
            for id in index.values_of(record, facet) {
                let key = id.0 + 1;
                if emitted.contains_key(key) {
                    continue;
                }
                emitted.insert(key, true)?;
                if let Some(text) = index.value_text(facet, id) {
                    listing.values.push(ValueEntry { id, text });
                }
            }
        }

        listing.values.sort_by(|a, b| compare_text(a.text, b.text));
        Ok(listing)
    }
}

/// ASCII case-insensitive substring test
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let (haystack, needle) = (haystack.as_bytes(), needle.as_bytes());
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle))
}
