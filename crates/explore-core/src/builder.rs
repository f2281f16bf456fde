//! Index construction
//!
//! A build runs in two passes. The playlist pass keeps every indexable entry,
//! opens each referenced metadata database once and registers the entry under
//! its content hash. The database pass then drains every open database,
//! matches items back to playlist entries and normalizes their fields into the
//! facet tables. Cursors are dropped as soon as their database is drained.

use crate::buffer::GrowBuf;
use crate::config::ExploreConfig;
use crate::constants::fields;
use crate::error::ExploreResult;
use crate::facet::{FACET_COUNT, FacetKind, ValueRef};
use crate::hash_map32::HashMap32;
use crate::index::{EntryRef, Index, Record};
use crate::normalize::Normalizer;
use crate::provider::{CatalogSources, MetadataCursor};
use explore_types::{CoreInfo, FieldValue};
use std::borrow::Cow;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// What a database name resolved to during the playlist pass
#[derive(Debug, Clone, Copy, Default)]
enum DbSlot {
    Open(u32),
    /// Failed to open; later entries naming it are skipped without retrying
    #[default]
    Invalid,
}

struct Database<'a> {
    name: String,
    cursor: Option<MetadataCursor<'a>>,
    entries: HashMap32<EntryRef>,
}

/// Parse the leading hexadecimal digits of a playlist hash (`"DEADBEEF|crc"`)
///
/// Returns `None` when there are no digits, the value overflows, or it is zero.
pub fn parse_crc(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let digits = text.bytes().take_while(u8::is_ascii_hexdigit).count();
    u32::from_str_radix(&text[..digits], 16).ok().filter(|&crc| crc != 0)
}

fn item_crc(value: &FieldValue) -> Option<u32> {
    match value {
        FieldValue::Binary(bytes) => {
            let bytes: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
            Some(u32::from_be_bytes(bytes))
        }
        FieldValue::Integer(_) | FieldValue::UInteger(_) => {
            value.as_integer().and_then(|v| u32::try_from(v).ok())
        }
        _ => None,
    }
}

/// Raw text of a facet field, or `None` when it counts as absent
fn field_text(kind: FacetKind, value: &FieldValue) -> Option<Cow<'_, str>> {
    if kind.is_numeric() {
        value.as_integer().filter(|&v| v != 0).map(|v| Cow::Owned(v.to_string()))
    } else {
        value.as_str().map(Cow::Borrowed)
    }
}

/// Build an index from the given collaborators
///
/// Unavailable databases and malformed items are skipped. The only error is
/// running out of memory.
#[instrument(skip_all)]
pub fn build_index(config: &ExploreConfig, sources: CatalogSources<'_>) -> ExploreResult<Index> {
    let started = Instant::now();
    let mut index = Index::new(config)?;
    let mut databases = collect_playlists(&mut index, sources)?;

    let cores = sources.cores.cores();
    let mut core_map: HashMap32<u32> = HashMap32::new();
    for (i, core) in cores.iter().enumerate() {
        core_map.insert_str(&core.display_name, i as u32)?;
    }

    let mut normalizer = Normalizer::new();
    let mut scratch: GrowBuf<ValueRef> = GrowBuf::new("overflow scratch");
    for database in &mut databases {
        let Some(cursor) = database.cursor.take() else {
            continue;
        };
        let before = index.records.len();
        for item in cursor {
            add_item(&mut index, &mut normalizer, &mut scratch, database, &cores, &core_map, &item)?;
        }
        debug!(
            database = %database.name,
            records = index.records.len() - before,
            "Drained metadata database"
        );
    }

    index.finalize();

    info!(
        playlists = index.playlists.len(),
        databases = databases.len(),
        records = index.records.len(),
        facet_values = index.tables.iter().map(|t| t.len()).sum::<usize>(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Built explore index"
    );
    Ok(index)
}

/// Playlist pass: retain playlists with indexable entries and open their databases
fn collect_playlists<'a>(
    index: &mut Index,
    sources: CatalogSources<'a>,
) -> ExploreResult<Vec<Database<'a>>> {
    let playlists = match sources.playlists.playlists() {
        Ok(playlists) => playlists,
        Err(err) => {
            warn!(error = %err, "Playlist provider failed, building an empty index");
            Vec::new()
        }
    };

    let mut slots: HashMap32<DbSlot> = HashMap32::new();
    let mut databases: Vec<Database<'a>> = Vec::new();

    for playlist in playlists {
        let playlist_idx = index.playlists.len() as u32;
        let mut used = 0usize;

        for i in 0..playlist.len() {
            let Some(entry) = playlist.get(i) else {
                continue;
            };
            if !entry.is_indexable() {
                continue;
            }
            let (Some(db_name), Some(crc_text)) = (entry.db_name.as_deref(), entry.crc32.as_deref())
            else {
                continue;
            };

            let slot = match slots.get_str(db_name) {
                Some(slot) => slot,
                None => {
                    let slot = match sources.metadata.open(db_name) {
                        Ok(cursor) => {
                            databases.push(Database {
                                name: db_name.to_owned(),
                                cursor: Some(cursor),
                                entries: HashMap32::new(),
                            });
                            DbSlot::Open(databases.len() as u32 - 1)
                        }
                        Err(err) => {
                            warn!(database = db_name, error = %err, "Skipping unavailable metadata database");
                            DbSlot::Invalid
                        }
                    };
                    slots.insert_str(db_name, slot)?;
                    slot
                }
            };
            let DbSlot::Open(db) = slot else {
                continue;
            };
            let Some(crc) = parse_crc(crc_text) else {
                trace!(label = entry.label_str(), crc = crc_text, "Unusable content hash");
                continue;
            };

            let entry_ref = EntryRef { playlist: playlist_idx, entry: i as u32 };
            databases[db as usize].entries.insert(crc, entry_ref)?;
            used += 1;
        }

        if used > 0 {
            debug!(playlist = playlist.name(), entries = used, "Retaining playlist");
            index.playlists.push(playlist)?;
        } else {
            debug!(playlist = playlist.name(), "Releasing playlist without indexable entries");
        }
    }
    Ok(databases)
}

/// Database pass for one item
fn add_item(
    index: &mut Index,
    normalizer: &mut Normalizer,
    scratch: &mut GrowBuf<ValueRef>,
    database: &Database<'_>,
    cores: &[CoreInfo],
    core_map: &HashMap32<u32>,
    item: &FieldValue,
) -> ExploreResult<()> {
    let Some(map) = item.as_map() else {
        trace!(database = %database.name, kind = item.type_name(), "Skipping non-map item");
        return Ok(());
    };

    let mut crc = None;
    let mut original_title = None;
    let mut raw: [Option<Cow<'_, str>>; FACET_COUNT] = std::array::from_fn(|_| None);
    for (key, value) in map {
        match key.as_str() {
            fields::CRC => crc = item_crc(value),
            fields::ORIGINAL_TITLE => original_title = value.as_str(),
            key => {
                if let Some(kind) = FacetKind::from_db_key(key) {
                    raw[kind.index()] = field_text(kind, value);
                }
            }
        }
    }

    let Some(crc) = crc else {
        trace!(database = %database.name, "Skipping item without content hash");
        return Ok(());
    };
    let Some(entry) = database.entries.get(crc) else {
        return Ok(());
    };

    let mut record = Record::new(entry);
    for kind in FacetKind::ALL {
        if kind.db_key().is_some() {
            normalizer.add_field(index, &mut record, kind, raw[kind.index()].as_deref(), scratch)?;
        }
    }

    let core = index
        .entry(&record)
        .and_then(|e| e.core_name.as_deref())
        .filter(|name| !name.is_empty())
        .and_then(|name| core_map.get_str(name));
    let system = core
        .and_then(|i| cores.get(i as usize))
        .and_then(|core| core.system_name.as_deref());
    normalizer.add_field(index, &mut record, FacetKind::System, system, scratch)?;

    if let Some(title) = original_title.filter(|t| !t.is_empty()) {
        record.original_title = Some(index.strings.alloc_str(title)?);
    }

    if !scratch.is_empty() {
        record.overflow = index.overflow.alloc(&scratch[..])?;
        scratch.clear();
    }

    index.records.push(record)
}
