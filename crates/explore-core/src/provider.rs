//! Collaborator interfaces the index is built from
//!
//! Playlists, metadata databases and the core registry live outside this
//! crate. The builder only sees them through these traits. [`MemoryCatalog`]
//! implements all three over plain vectors, for embedding and tests.

use anyhow::{Context, anyhow};
use explore_types::{CoreInfo, FieldValue, PlaylistEntry};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// An ordered, randomly accessible list of playlist entries
pub trait PlaylistSource {
    /// Name of the playlist, for diagnostics
    fn name(&self) -> &str;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&PlaylistEntry>;
}

/// Enumerates the known playlists
///
/// Handing out an `Arc` lets the index keep a playlist alive for as long as
/// its records point into it.
pub trait PlaylistProvider {
    fn playlists(&self) -> anyhow::Result<Vec<Arc<dyn PlaylistSource>>>;
}

/// Cursor over the items of one open metadata database
pub type MetadataCursor<'a> = Box<dyn Iterator<Item = FieldValue> + 'a>;

/// Opens metadata databases by name
///
/// Dropping the returned cursor closes the database.
pub trait MetadataProvider {
    fn open(&self, db_name: &str) -> anyhow::Result<MetadataCursor<'_>>;
}

/// Lists installed cores and the systems they emulate
pub trait CoreRegistry {
    fn cores(&self) -> Vec<CoreInfo>;
}

/// The three collaborators a build reads from
#[derive(Clone, Copy)]
pub struct CatalogSources<'a> {
    pub playlists: &'a dyn PlaylistProvider,
    pub metadata: &'a dyn MetadataProvider,
    pub cores: &'a dyn CoreRegistry,
}

impl<'a> CatalogSources<'a> {
    pub fn new(
        playlists: &'a dyn PlaylistProvider,
        metadata: &'a dyn MetadataProvider,
        cores: &'a dyn CoreRegistry,
    ) -> Self {
        Self { playlists, metadata, cores }
    }
}

/// A playlist held in memory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemoryPlaylist {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

impl MemoryPlaylist {
    pub fn new(name: impl Into<String>, entries: Vec<PlaylistEntry>) -> Self {
        Self { name: name.into(), entries }
    }
}

impl PlaylistSource for MemoryPlaylist {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    playlists: Vec<MemoryPlaylist>,
    #[serde(default)]
    databases: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    cores: Vec<CoreInfo>,
}

/// Playlists, databases and cores held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    playlists: Vec<Arc<MemoryPlaylist>>,
    databases: HashMap<String, Vec<FieldValue>>,
    cores: Vec<CoreInfo>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a playlist and return the shared handle to it
    pub fn add_playlist(
        &mut self,
        name: impl Into<String>,
        entries: Vec<PlaylistEntry>,
    ) -> Arc<MemoryPlaylist> {
        let playlist = Arc::new(MemoryPlaylist::new(name, entries));
        self.playlists.push(Arc::clone(&playlist));
        playlist
    }

    /// Add (or replace) a database's items
    pub fn add_database(&mut self, name: impl Into<String>, items: Vec<FieldValue>) {
        self.databases.insert(name.into(), items);
    }

    pub fn add_core(&mut self, core: CoreInfo) {
        self.cores.push(core);
    }

    /// Parse a catalog from a JSON document
    ///
    /// The document has optional `playlists` (`[{ "name", "entries": [...] }]`),
    /// `databases` (`{ "<db name>": [ {item}, ... ] }`) and `cores` sections.
    pub fn from_json(value: serde_json::Value) -> anyhow::Result<Self> {
        let doc: CatalogDocument =
            serde_json::from_value(value).context("invalid catalog document")?;

        let mut catalog = Self::new();
        for playlist in doc.playlists {
            catalog.playlists.push(Arc::new(playlist));
        }
        for (name, items) in &doc.databases {
            let items = items
                .as_array()
                .ok_or_else(|| anyhow!("database {name} is not an array"))?
                .iter()
                .map(FieldValue::try_from)
                .collect::<anyhow::Result<Vec<_>>>()
                .with_context(|| format!("invalid item in database {name}"))?;
            catalog.databases.insert(name.clone(), items);
        }
        catalog.cores = doc.cores;
        Ok(catalog)
    }

    /// Borrow this catalog as the sources of a build
    pub fn sources(&self) -> CatalogSources<'_> {
        CatalogSources::new(self, self, self)
    }
}

impl PlaylistProvider for MemoryCatalog {
    fn playlists(&self) -> anyhow::Result<Vec<Arc<dyn PlaylistSource>>> {
        Ok(self
            .playlists
            .iter()
            .map(|p| Arc::clone(p) as Arc<dyn PlaylistSource>)
            .collect())
    }
}

impl MetadataProvider for MemoryCatalog {
    fn open(&self, db_name: &str) -> anyhow::Result<MetadataCursor<'_>> {
        let items = self
            .databases
            .get(db_name)
            .ok_or_else(|| anyhow!("database not found: {db_name}"))?;
        Ok(Box::new(items.iter().cloned()))
    }
}

impl CoreRegistry for MemoryCatalog {
    fn cores(&self) -> Vec<CoreInfo> {
        self.cores.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_catalog_from_json() {
        let catalog = MemoryCatalog::from_json(serde_json::json!({
            "playlists": [{
                "name": "Nintendo - SNES",
                "entries": [{
                    "label": "Super Game",
                    "crc32": "DEADBEEF|crc",
                    "db_name": "Nintendo - SNES.rdb",
                    "path": "/roms/super.sfc"
                }]
            }],
            "databases": {
                "Nintendo - SNES.rdb": [{ "crc": [222, 173, 190, 239], "genre": "Action" }]
            },
            "cores": [{ "display_name": "Snes9x", "system_name": "SNES" }]
        }))
        .unwrap();

        let playlists = catalog.playlists().unwrap();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].name(), "Nintendo - SNES");
        assert_eq!(playlists[0].get(0).unwrap().label_str(), "Super Game");

        let items: Vec<_> = catalog.open("Nintendo - SNES.rdb").unwrap().collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("genre").and_then(FieldValue::as_str), Some("Action"));

        assert_eq!(catalog.cores()[0].system_name.as_deref(), Some("SNES"));
    }

    #[test]
    fn test_missing_database_fails_to_open() {
        let catalog = MemoryCatalog::new();
        assert!(catalog.open("nope.rdb").is_err());
    }

    #[test]
    fn test_database_must_be_array() {
        let result = MemoryCatalog::from_json(serde_json::json!({ "databases": { "x.rdb": 5 } }));
        assert!(result.is_err());
    }
}
