#![warn(clippy::all)]
//! Faceted explore index for content catalogs.
//!
//! This crate merges playlists with keyed metadata databases into an in-memory
//! index of facet values (developer, genre, release year, ...) and answers
//! drill-down queries against it: list a facet's values, list the records
//! matching a stack of selections, search by label.
//!
//! ```no_run
//! use explore_core::{Explorer, FacetKind, MemoryCatalog, Query};
//!
//! # fn main() -> anyhow::Result<()> {
//! let catalog = MemoryCatalog::from_json(serde_json::json!({ "playlists": [] }))?;
//! let mut explorer = Explorer::default();
//! explorer.build(catalog.sources())?;
//!
//! let genres = explorer.list_values(FacetKind::Genre);
//! if let Some(first) = genres.values.first() {
//!     let query = Query::new().select(FacetKind::Genre, first.id);
//!     for record in explorer.list_records(&query) {
//!         println!("{}", record.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Bump arena for index-lifetime storage
pub mod arena;
/// Growable buffer with fallible doubling growth
pub mod buffer;
/// Index construction from playlists and metadata databases
pub mod builder;
/// Index configuration
pub mod config;
/// Constants shared across the crate
pub mod constants;
/// Error types
pub mod error;
/// Owned explore handle
pub mod explorer;
/// Facet kinds and value tables
pub mod facet;
/// Selection, search and listing
pub mod filter;
/// Open-addressing map keyed by 32-bit hashes
pub mod hash_map32;
/// The built index
pub mod index;
/// Metadata splitting, suffix stripping and dedup
pub mod normalize;
/// Collaborator traits and in-memory providers
pub mod provider;

pub use builder::build_index;
pub use config::ExploreConfig;
pub use error::{ErrorSeverity, ExploreError, ExploreResult};
pub use explorer::{Explorer, FacetSummary, ResolvedRecord};
pub use facet::{FacetKind, ValueId};
pub use filter::{FilterEvaluator, Query, RecordEntry, Selection, ValueEntry, ValueListing};
pub use index::{Index, IndexStats, RecordId};
pub use provider::{
    CatalogSources, CoreRegistry, MemoryCatalog, MemoryPlaylist, MetadataCursor, MetadataProvider,
    PlaylistProvider, PlaylistSource,
};

pub use explore_types::{CoreInfo, FieldValue, PlaylistEntry};
