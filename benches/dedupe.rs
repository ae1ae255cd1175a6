use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use rom_dedupe::dedupe::{FileRecord, Resolver, SystemCatalog, normalize};

const FILE_NAMES: &[&str] = &[
    "Chrono Trigger (USA).sfc",
    "Final Fantasy VII (Europe) (En,Fr,De) (Disc 2).chd",
    "Sonic the Hedgehog (USA, Europe) (Rev A) [!].md",
    "Puzzle Fighter (Arcade Mode) (Japan) (1996).zip",
    "Street Fighter II - The World Warrior (1991) (Capcom).zip",
    "[BIOS] PlayStation (v3.0) (Europe).bin",
    "Riven - The Sequel to Myst [CD 2 of 5] (USA).cue",
];

const SYSTEMS: &[&str] = &["snes", "megadrive", "psx", "gba", "mame", "fbneo", "saturn", "nds"];
const REGIONS: &[&str] = &["(USA)", "(Europe)", "(Japan)", "(World)", ""];

fn build_group(size: usize) -> Vec<FileRecord> {
    (0..size)
        .map(|i| {
            let system = SYSTEMS[i % SYSTEMS.len()];
            let region = REGIONS[i % REGIONS.len()];
            let year = 1990 + (i % 15);
            FileRecord::new(
                format!("/roms/{system}/Game {region} ({year}).zip"),
                system,
                1024 * (i as u64 % 7 + 1),
            )
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize", |b| {
        b.iter(|| {
            for name in FILE_NAMES {
                black_box(normalize(black_box(name)));
            }
        });
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    for size in [2, 8, 64] {
        let records = build_group(size);
        for keep_both in [true, false] {
            let resolver = Resolver::new(SystemCatalog::default(), keep_both);
            let id = BenchmarkId::new(if keep_both { "separate" } else { "single" }, size);
            group.bench_with_input(id, &records, |b, records| {
                b.iter(|| black_box(resolver.resolve(black_box(records))));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_resolve);
criterion_main!(benches);
