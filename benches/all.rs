#[path = "../tests/assets/mod.rs"]
mod assets;

use assets::{random_file, BIG_TEST};
use criterion::{black_box, criterion_group, criterion_main, Criterion, SamplingMode, Throughput};
use ember_nbt::{
    io::{read_nbt, read_nbt_with, write_nbt, Flavor, Streaming, TagProbe},
    NbtFile,
    TagType,
};
use rand::{rngs::StdRng, SeedableRng};
use std::{
    io::{self, Cursor},
    time::Duration,
};

const FLAVORS: [(&str, Flavor); 3] = [
    ("Uncompressed", Flavor::Uncompressed),
    ("Gz", Flavor::GzCompressed),
    ("Zlib", Flavor::ZlibCompressed),
];

fn skip_arrays(probe: &TagProbe<'_>) -> bool {
    !matches!(probe.tag_type(), TagType::ByteArray | TagType::IntArray)
}

fn document_bench(name: &str, file: &NbtFile, c: &mut Criterion) {
    let (tree, root) = (file.tree(), file.root());
    let uncompressed = file.save_to_bytes(Flavor::Uncompressed).unwrap();

    let mut group = c.benchmark_group(name);
    group.sampling_mode(SamplingMode::Flat);
    group.throughput(Throughput::Bytes(uncompressed.len() as u64));

    for (label, flavor) in FLAVORS {
        let bytes = file.save_to_bytes(flavor).unwrap();

        group.bench_function(format!("Read ({})", label), |b| {
            b.iter(|| black_box(read_nbt(&mut Cursor::new(&bytes[..]), flavor).unwrap()))
        });
        group.bench_function(format!("Write ({})", label), |b| {
            b.iter(|| write_nbt(&mut io::sink(), tree, root, flavor).unwrap())
        });
    }

    group.bench_function("Read Detected", |b| {
        b.iter(|| black_box(read_nbt(&mut Cursor::new(&uncompressed[..]), Flavor::AutoDetect).unwrap()))
    });
    group.bench_function("Read Skipping Arrays (Seekable)", |b| {
        b.iter(|| {
            let mut source = Cursor::new(&uncompressed[..]);
            black_box(read_nbt_with(&mut source, Flavor::Uncompressed, skip_arrays).unwrap())
        })
    });
    group.bench_function("Read Skipping Arrays (Streaming)", |b| {
        b.iter(|| {
            let mut source = Streaming::new(&uncompressed[..]);
            black_box(read_nbt_with(&mut source, Flavor::Uncompressed, skip_arrays).unwrap())
        })
    });
    group.finish();
}

fn bench(c: &mut Criterion) {
    document_bench("bigtest", &BIG_TEST, c);

    let mut rng = StdRng::seed_from_u64(0x5EED);
    let random = random_file(&mut rng, 4);
    document_bench("random", &random, c);
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(500)
        .warm_up_time(Duration::from_secs(1));
    targets = bench
}
criterion_main!(benches);
