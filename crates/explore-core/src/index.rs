//! The built faceted index
//!
//! An [`Index`] owns the string arena, one [`FacetTable`] per facet kind, the
//! sorted record list and the playlists those records point into. It is built
//! once by [`crate::builder::build_index`] and then only read.

use crate::arena::{Arena, Span, StrSpan};
use crate::buffer::GrowBuf;
use crate::config::ExploreConfig;
use crate::error::ExploreResult;
use crate::facet::{FACET_COUNT, FacetKind, FacetTable, ValueId, ValueRef, compare_text};
use crate::provider::PlaylistSource;
use explore_types::PlaylistEntry;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Position of a record in the sorted record list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(pub u32);

impl RecordId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Non-owning reference to a playlist entry held by the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryRef {
    pub playlist: u32,
    pub entry: u32,
}

/// One content entry with its facet associations
#[derive(Debug, Clone, Copy, Default)]
pub struct Record {
    pub(crate) entry: EntryRef,
    pub(crate) by: [Option<ValueId>; FACET_COUNT],
    pub(crate) overflow: Span,
    pub(crate) original_title: Option<StrSpan>,
}

impl Record {
    pub(crate) fn new(entry: EntryRef) -> Self {
        Self { entry, ..Self::default() }
    }

    /// The record's primary value for a facet
    pub fn primary(&self, kind: FacetKind) -> Option<ValueId> {
        self.by[kind.index()]
    }

    pub fn entry_ref(&self) -> EntryRef {
        self.entry
    }
}

/// Summary numbers for a built index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub records: usize,
    pub playlists: usize,
    pub facet_values: usize,
    pub arena_blocks: usize,
    pub arena_bytes: usize,
}

/// In-memory faceted index over catalog records
pub struct Index {
    pub(crate) strings: Arena<u8>,
    pub(crate) overflow: Arena<ValueRef>,
    pub(crate) tables: [FacetTable; FACET_COUNT],
    pub(crate) records: GrowBuf<Record>,
    pub(crate) playlists: GrowBuf<Arc<dyn PlaylistSource>>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index")
            .field("records", &self.records.len())
            .field("playlists", &self.playlists.len())
            .field("tables", &self.tables)
            .finish()
    }
}

impl Index {
    /// Create an empty index sized per `config`
    pub(crate) fn new(config: &ExploreConfig) -> ExploreResult<Self> {
        Ok(Self {
            strings: Arena::with_block_size(config.arena_block_size),
            overflow: Arena::with_block_size(config.arena_block_size),
            tables: std::array::from_fn(|_| FacetTable::default()),
            records: GrowBuf::with_capacity("records", config.initial_record_capacity)?,
            playlists: GrowBuf::new("playlists"),
        })
    }

    /// Value table for a facet
    pub fn table(&self, kind: FacetKind) -> &FacetTable {
        &self.tables[kind.index()]
    }

    /// Text of a facet value
    pub fn value_text(&self, kind: FacetKind, id: ValueId) -> Option<&str> {
        self.table(kind).values.get(id.index()).map(|v| self.strings.get_str(v.text))
    }

    /// Records in label order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Playlists retained because at least one record points into them
    pub fn playlists(&self) -> &[Arc<dyn PlaylistSource>] {
        &self.playlists
    }

    /// Additional values of a record beyond its primary ones
    pub fn overflow(&self, record: &Record) -> &[ValueRef] {
        self.overflow.get(record.overflow)
    }

    /// Playlist entry a record was derived from
    pub fn entry(&self, record: &Record) -> Option<&PlaylistEntry> {
        entry_of(&self.playlists, record.entry)
    }

    /// Playlist label of a record; used for ordering and search
    pub fn label(&self, record: &Record) -> &str {
        self.entry(record).map_or("", PlaylistEntry::label_str)
    }

    /// Title to show for a record: the override title if present, else the label
    pub fn display_title(&self, record: &Record) -> &str {
        match record.original_title {
            Some(span) => self.strings.get_str(span),
            None => self.label(record),
        }
    }

    /// Every value a record carries for one facet, primary first
    pub fn values_of<'a>(
        &'a self,
        record: &'a Record,
        kind: FacetKind,
    ) -> impl Iterator<Item = ValueId> + 'a {
        record.primary(kind).into_iter().chain(
            self.overflow(record).iter().filter(move |v| v.facet == kind).map(|v| v.id),
        )
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            playlists: self.playlists.len(),
            facet_values: self.tables.iter().map(FacetTable::len).sum(),
            arena_blocks: self.strings.block_count() + self.overflow.block_count(),
            arena_bytes: self.strings.reserved_bytes() + self.overflow.reserved_bytes(),
        }
    }

    /// Sort every facet table and the record list, then switch value identities
    /// from insertion order to rank
    pub(crate) fn finalize(&mut self) {
        for kind in FacetKind::ALL {
            let table = &mut self.tables[kind.index()];
            let strings = &self.strings;
            table
                .values
                .sort_by(|a, b| compare_text(strings.get_str(a.text), strings.get_str(b.text)));

            // before the sort `rank` still holds the insertion id
            let mut rank_of = vec![0u32; table.values.len()];
            for (rank, value) in table.values.iter_mut().enumerate() {
                rank_of[value.rank as usize] = rank as u32;
                value.rank = rank as u32;
            }

            for record in self.records.iter_mut() {
                if let Some(id) = &mut record.by[kind.index()] {
                    *id = ValueId(rank_of[id.index()]);
                }
                for value in self.overflow.get_mut(record.overflow) {
                    if value.facet == kind {
                        value.id = ValueId(rank_of[value.id.index()]);
                    }
                }
            }
            debug!(facet = %kind, values = table.values.len(), "Sorted facet table");
        }

        let playlists = &self.playlists;
        self.records.sort_by(|a, b| {
            let label = |r: &Record| entry_of(playlists, r.entry).map_or("", PlaylistEntry::label_str);
            compare_text(label(a), label(b))
        });
    }
}

fn entry_of(playlists: &[Arc<dyn PlaylistSource>], entry: EntryRef) -> Option<&PlaylistEntry> {
    playlists.get(entry.playlist as usize)?.get(entry.entry as usize)
}
