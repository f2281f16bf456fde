use explore_core::facet::compare_text;
use explore_core::normalize::segments;
use explore_core::{
    Explorer, FacetKind, FieldValue, MemoryCatalog, PlaylistEntry, Query, RecordId,
};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;

const GENRES: [&str; 5] = ["Action", "platform", "Puzzle", "RPG", "shooter"];
const REGIONS: [&str; 3] = ["Europe", "Japan", "USA"];

#[derive(Debug, Clone)]
struct Game {
    genres: Vec<usize>,
    region: Option<usize>,
}

fn arb_game() -> impl Strategy<Value = Game> {
    (
        prop::collection::vec(0..GENRES.len(), 0..3),
        prop::option::of(0..REGIONS.len()),
    )
        .prop_map(|(genres, region)| Game { genres, region })
}

fn catalog(games: &[Game]) -> MemoryCatalog {
    let entries = (0..games.len())
        .map(|i| {
            PlaylistEntry::new(format!("Game {i:03}"), format!("/roms/{i}.bin"))
                .with_crc32(format!("{:08x}", i + 1))
                .with_db("Games.rdb")
        })
        .collect();
    let items = games
        .iter()
        .enumerate()
        .map(|(i, game)| {
            let mut fields = vec![("crc".to_string(), FieldValue::crc32(i as u32 + 1))];
            if !game.genres.is_empty() {
                let genre: Vec<_> = game.genres.iter().map(|&g| GENRES[g]).collect();
                fields.push(("genre".to_string(), FieldValue::string(genre.join(", "))));
            }
            if let Some(region) = game.region {
                fields.push(("region".to_string(), FieldValue::string(REGIONS[region])));
            }
            FieldValue::Map(fields)
        })
        .collect();

    let mut catalog = MemoryCatalog::new();
    catalog.add_playlist("Games", entries);
    catalog.add_database("Games.rdb", items);
    catalog
}

fn ids(explorer: &Explorer, query: &Query) -> BTreeSet<RecordId> {
    explorer.list_records(query).iter().map(|r| r.id).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Normalizing a normalized segment gives back the same segment
    #[test]
    fn prop_normalization_is_idempotent(
        raw in "[A-Za-zé .,/|]{0,32}",
        kind in prop::sample::select(FacetKind::ALL.to_vec()),
    ) {
        for segment in segments(&raw, kind) {
            let again: Vec<_> = segments(segment, kind).collect();
            prop_assert_eq!(again, vec![segment]);
        }
    }

    /// Case and surrounding space variants resolve to one value
    #[test]
    fn prop_equal_normal_forms_share_identity(word in "[A-Za-z][A-Za-z0-9]{0,12}") {
        let variant = format!("  {}  ", word.to_ascii_uppercase());
        let mut catalog = MemoryCatalog::new();
        catalog.add_playlist("P", vec![
            PlaylistEntry::new("A", "/a").with_crc32("1").with_db("D.rdb"),
            PlaylistEntry::new("B", "/b").with_crc32("2").with_db("D.rdb"),
        ]);
        catalog.add_database("D.rdb", vec![
            FieldValue::map([("crc", FieldValue::crc32(1)), ("franchise", FieldValue::string(word.as_str()))]),
            FieldValue::map([("crc", FieldValue::crc32(2)), ("franchise", FieldValue::string(variant))]),
        ]);
        let mut explorer = Explorer::default();
        explorer.build(catalog.sources()).unwrap();

        let index = explorer.index().unwrap();
        prop_assert_eq!(index.table(FacetKind::Franchise).len(), 1);
        let records = index.records();
        prop_assert_eq!(
            records[0].primary(FacetKind::Franchise),
            records[1].primary(FacetKind::Franchise)
        );
    }

    /// Tables are sorted and ranks run 0..count without gaps
    #[test]
    fn prop_tables_sorted_with_contiguous_ranks(games in prop::collection::vec(arb_game(), 0..24)) {
        let catalog = catalog(&games);
        let mut explorer = Explorer::default();
        explorer.build(catalog.sources()).unwrap();
        let index = explorer.index().unwrap();

        for kind in FacetKind::ALL {
            let listing = explorer.list_values(kind);
            for pair in listing.values.windows(2) {
                prop_assert_ne!(compare_text(pair[0].text, pair[1].text), Ordering::Greater);
            }
            let ranks: Vec<u32> = index.table(kind).values().iter().map(|v| v.rank()).collect();
            let expected: Vec<u32> = (0..ranks.len() as u32).collect();
            prop_assert_eq!(ranks, expected);
        }

        let labels: Vec<_> = index.records().iter().map(|r| index.label(r)).collect();
        for pair in labels.windows(2) {
            prop_assert_ne!(compare_text(pair[0], pair[1]), Ordering::Greater);
        }
    }

    /// A two-selection query is the intersection of the single-selection queries
    #[test]
    fn prop_selections_are_anded(games in prop::collection::vec(arb_game(), 1..24)) {
        let catalog = catalog(&games);
        let mut explorer = Explorer::default();
        explorer.build(catalog.sources()).unwrap();

        let genres = explorer.list_values(FacetKind::Genre);
        let regions = explorer.list_values(FacetKind::Region);
        let genre_ids = genres.values.iter().map(|v| Some(v.id)).chain([None]);
        for genre in genre_ids {
            let region_ids = regions.values.iter().map(|v| Some(v.id)).chain([None]);
            for region in region_ids {
                let by_genre = match genre {
                    Some(id) => Query::new().select(FacetKind::Genre, id),
                    None => Query::new().select_unknown(FacetKind::Genre),
                };
                let by_region = match region {
                    Some(id) => Query::new().select(FacetKind::Region, id),
                    None => Query::new().select_unknown(FacetKind::Region),
                };
                let mut both = by_genre.clone();
                for selection in by_region.selections() {
                    both = match selection.value {
                        Some(id) => both.select(selection.facet, id),
                        None => both.select_unknown(selection.facet),
                    };
                }

                let expected: BTreeSet<_> = ids(&explorer, &by_genre)
                    .intersection(&ids(&explorer, &by_region))
                    .copied()
                    .collect();
                prop_assert_eq!(ids(&explorer, &both), expected);
            }
        }
    }

    /// The unknown bucket is set iff some record passing the other selections lacks the facet
    #[test]
    fn prop_unknown_bucket_is_complete(games in prop::collection::vec(arb_game(), 1..24)) {
        let catalog = catalog(&games);
        let mut explorer = Explorer::default();
        explorer.build(catalog.sources()).unwrap();
        let index = explorer.index().unwrap();

        for region in explorer.list_values(FacetKind::Region).values {
            let query = Query::new().select(FacetKind::Region, region.id);
            let listing = explorer.list_values_filtered(FacetKind::Genre, &query).unwrap();
            let expected = explorer
                .list_records(&query)
                .iter()
                .filter_map(|r| index.record(r.id))
                .any(|r| r.primary(FacetKind::Genre).is_none());
            prop_assert_eq!(listing.has_unknown, expected);
        }
    }

    /// Every listed record resolves to a path from the playlist
    #[test]
    fn prop_records_resolve_to_playlist_paths(games in prop::collection::vec(arb_game(), 0..24)) {
        let catalog = catalog(&games);
        let mut explorer = Explorer::default();
        explorer.build(catalog.sources()).unwrap();

        let paths: BTreeSet<_> = (0..games.len()).map(|i| format!("/roms/{i}.bin")).collect();
        let records = explorer.list_records(&Query::new());
        prop_assert_eq!(records.len(), games.len());
        for record in records {
            let resolved = explorer.resolve_record(record.id).unwrap();
            prop_assert!(paths.contains(resolved.path));
        }
    }
}
