//! Owned explore handle
//!
//! An [`Explorer`] holds zero or one live [`Index`]. `build` creates it,
//! `teardown` destroys it along with the playlists it retains, and every
//! query against an explorer without an index returns an empty result.

use crate::builder::build_index;
use crate::config::ExploreConfig;
use crate::error::ExploreResult;
use crate::facet::{FacetKind, ValueId, compare_text};
use crate::filter::{FilterEvaluator, Query, RecordEntry, ValueEntry, ValueListing};
use crate::index::{Index, IndexStats, RecordId};
use crate::provider::CatalogSources;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info, instrument};

/// A facet that has at least one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetSummary<'a> {
    pub kind: FacetKind,
    pub name: &'static str,
    pub value_count: usize,
    /// Smallest and largest value of a numeric facet, compared as integers
    pub range: Option<(&'a str, &'a str)>,
}

/// Everything known about one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord<'a> {
    pub id: RecordId,
    pub label: &'a str,
    pub title: &'a str,
    pub path: &'a str,
    pub playlist: &'a str,
    pub entry_index: u32,
    pub core_name: Option<&'a str>,
    pub db_name: Option<&'a str>,
    /// Values per facet, primary first; facets without values are left out
    pub facets: Vec<(FacetKind, Vec<&'a str>)>,
}

#[derive(Debug, Default)]
pub struct Explorer {
    config: ExploreConfig,
    index: Option<Index>,
}

impl Explorer {
    /// Explorer with a validated configuration
    pub fn new(config: ExploreConfig) -> ExploreResult<Self> {
        config.validate()?;
        Ok(Self { config, index: None })
    }

    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Build the index unless one is already live
    ///
    /// Call [`Explorer::teardown`] first to force a rebuild.
    #[instrument(skip_all)]
    pub fn build(&mut self, sources: CatalogSources<'_>) -> ExploreResult<()> {
        if self.index.is_some() {
            debug!("Explore index already built");
            return Ok(());
        }
        self.index = Some(build_index(&self.config, sources)?);
        Ok(())
    }

    /// Release the index and every playlist it retains
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        if let Some(index) = self.index.take() {
            info!(
                records = index.record_count(),
                playlists = index.playlists().len(),
                "Tearing down explore index"
            );
        }
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    /// Facets with at least one value
    pub fn list_facets(&self) -> Vec<FacetSummary<'_>> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        FacetKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let table = index.table(kind);
                if table.is_empty() {
                    return None;
                }
                let range = if kind.is_numeric() { numeric_range(index, kind) } else { None };
                Some(FacetSummary { kind, name: kind.name(), value_count: table.len(), range })
            })
            .collect()
    }

    /// Facets that can still be added as a drill-down level under `query`
    pub fn available_facets(&self, query: &Query) -> Vec<FacetSummary<'_>> {
        let mut facets = self.list_facets();
        facets.retain(|f| !query.is_constrained(f.kind));
        facets
    }

    /// Every value of a facet, in sorted order
    pub fn list_values(&self, facet: FacetKind) -> ValueListing<'_> {
        let Some(index) = &self.index else {
            return ValueListing::empty(facet);
        };
        let table = index.table(facet);
        let values = (0..table.len() as u32)
            .map(ValueId)
            .filter_map(|id| Some(ValueEntry { id, text: index.value_text(facet, id)? }))
            .collect();
        ValueListing { facet, values, has_unknown: table.has_unknown() }
    }

    /// Values of a facet among the records matching `query`
    #[instrument(skip(self, query))]
    pub fn list_values_filtered(
        &self,
        facet: FacetKind,
        query: &Query,
    ) -> ExploreResult<ValueListing<'_>> {
        match &self.index {
            Some(index) => self.evaluator(index, query).list_values(facet),
            None => Ok(ValueListing::empty(facet)),
        }
    }

    /// Records matching `query`, in label order
    #[instrument(skip(self, query))]
    pub fn list_records(&self, query: &Query) -> Vec<RecordEntry<'_>> {
        match &self.index {
            Some(index) => self.evaluator(index, query).list_records(),
            None => Vec::new(),
        }
    }

    /// Details of a record returned by [`Explorer::list_records`]
    pub fn resolve_record(&self, id: RecordId) -> Option<ResolvedRecord<'_>> {
        let index = self.index.as_ref()?;
        let record = index.record(id)?;
        let entry = index.entry(record)?;
        let playlist = index.playlists().get(record.entry_ref().playlist as usize)?;

        let facets = FacetKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let values: Vec<&str> = index
                    .values_of(record, kind)
                    .filter_map(|v| index.value_text(kind, v))
                    .collect();
                (!values.is_empty()).then_some((kind, values))
            })
            .collect();

        Some(ResolvedRecord {
            id,
            label: index.label(record),
            title: index.display_title(record),
            path: &entry.path,
            playlist: playlist.name(),
            entry_index: record.entry_ref().entry,
            core_name: entry.core_name.as_deref(),
            db_name: entry.db_name.as_deref(),
            facets,
        })
    }

    pub fn stats(&self) -> IndexStats {
        self.index.as_ref().map(Index::stats).unwrap_or_default()
    }

    fn evaluator<'a, 'q>(
        &'a self,
        index: &'a Index,
        query: &'q Query,
    ) -> FilterEvaluator<'a, 'q> {
        let search = query.search_text().map(|s| self.config.clamp_search(s));
        FilterEvaluator::new(index, query).with_search(search)
    }
}

fn numeric_range(index: &Index, kind: FacetKind) -> Option<(&str, &str)> {
    let texts = || {
        (0..index.table(kind).len() as u32).filter_map(move |id| index.value_text(kind, ValueId(id)))
    };
    let min = texts().min_by(|a, b| compare_numeric(a, b))?;
    let max = texts().max_by(|a, b| compare_numeric(a, b))?;
    Some((min, max))
}

/// Integer order where both sides parse, text order otherwise
fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => compare_text(a, b),
    }
}
