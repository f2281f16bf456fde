use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use explore_core::{
    CoreInfo, Explorer, FacetKind, FieldValue, MemoryCatalog, PlaylistEntry, Query,
};
use std::time::Duration;

const GENRES: [&str; 8] =
    ["Action", "Adventure", "Platform", "Puzzle", "Racing", "RPG", "Shooter", "Sports"];
const DEVELOPERS: [&str; 6] =
    ["Capcom Co., Ltd.", "Konami", "Nintendo Inc.", "Sega", "Square Enix, Inc.", "Taito"];

fn generate_catalog(count: usize) -> MemoryCatalog {
    let entries = (0..count)
        .map(|i| {
            PlaylistEntry::new(format!("Title {i:06}"), format!("/roms/{i}.bin"))
                .with_crc32(format!("{:08X}|crc", i + 1))
                .with_db("Bench.rdb")
                .with_core(if i % 3 == 0 { "Snes9x" } else { "Genesis Plus GX" })
        })
        .collect();
    let items = (0..count)
        .map(|i| {
            FieldValue::map([
                ("crc", FieldValue::crc32(i as u32 + 1)),
                ("genre", FieldValue::string(format!("{}, {}", GENRES[i % 8], GENRES[(i / 8) % 8]))),
                ("developer", FieldValue::string(DEVELOPERS[i % 6])),
                ("releaseyear", FieldValue::Integer(1985 + (i % 20) as i64)),
                ("franchise", FieldValue::string(format!("Series {}", i % 500))),
            ])
        })
        .collect();

    let mut catalog = MemoryCatalog::new();
    catalog.add_playlist("Bench", entries);
    catalog.add_database("Bench.rdb", items);
    catalog.add_core(CoreInfo::new("Snes9x", "Super Nintendo Entertainment System"));
    catalog.add_core(CoreInfo::new("Genesis Plus GX", "Sega Mega Drive"));
    catalog
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for size in [1_000, 10_000, 50_000].iter() {
        let catalog = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("build", size), size, |b, _| {
            b.iter(|| {
                let mut explorer = Explorer::default();
                explorer.build(catalog.sources()).unwrap();
                black_box(explorer.stats())
            });
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let catalog = generate_catalog(50_000);
    let mut explorer = Explorer::default();
    explorer.build(catalog.sources()).unwrap();

    let action = explorer.list_values(FacetKind::Genre).values[0].id;
    let genre_query = Query::new().select(FacetKind::Genre, action);

    group.bench_function("list_records_by_genre", |b| {
        b.iter(|| black_box(explorer.list_records(&genre_query).len()))
    });
    group.bench_function("list_records_search", |b| {
        let query = genre_query.clone().search("title 0012");
        b.iter(|| black_box(explorer.list_records(&query).len()))
    });
    group.bench_function("list_values_filtered", |b| {
        b.iter(|| {
            black_box(
                explorer
                    .list_values_filtered(FacetKind::Developer, &genre_query)
                    .unwrap()
                    .values
                    .len(),
            )
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_queries);
criterion_main!(benches);
