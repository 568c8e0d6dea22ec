use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lineage_graph::config::LineageConfig;
use lineage_graph::graph::{to_dot, GraphView, Layout};
use lineage_graph::reader::{build_from_paths, builder_for, MappingReader};
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;

const LAYERS: [&str; 3] = ["bronze", "silver", "gold"];

/// Layered mapping: each table of layer N reads from two tables of layer N-1
fn generate_mapping(tables_per_layer: usize, fields_per_table: usize) -> String {
    let mut data =
        String::from("target_table,target_field,source_table,source_field,layer,sub_layer\n");

    for (l, layer) in LAYERS.iter().enumerate() {
        for t in 0..tables_per_layer {
            let table = format!("{}_{}", layer, t);
            for f in 0..fields_per_table {
                let sources = if l == 0 {
                    format!("raw_{}", t)
                } else {
                    format!(
                        "\"{}_{}, {}_{}\"",
                        LAYERS[l - 1],
                        t,
                        LAYERS[l - 1],
                        (t + 1) % tables_per_layer
                    )
                };
                data.push_str(&format!(
                    "{},field_{},{},field_{},{},domain_{}\n",
                    table,
                    f,
                    sources,
                    f,
                    layer,
                    t % 4
                ));
            }
        }
    }

    data
}

fn bench_build_in_memory(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    let config = LineageConfig::default();

    for (tables, fields) in [(10, 20), (100, 20), (500, 10)] {
        let data = generate_mapping(tables, fields);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("in_memory", format!("{}t_{}f", tables, fields)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut builder = builder_for(&config);
                    let mut reader = MappingReader::new(data.as_bytes(), &config).unwrap();
                    reader.read_into(&mut builder).unwrap();
                    black_box(builder.finish())
                })
            },
        );
    }

    group.finish();
}

fn bench_build_from_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_file");
    group.sample_size(20);
    let config = LineageConfig::default();

    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("mapping.csv");
    fs::write(&input, generate_mapping(200, 20)).unwrap();
    let file_size = fs::metadata(&input).unwrap().len();

    group.throughput(Throughput::Bytes(file_size));
    group.bench_function("200t_20f", |b| {
        b.iter(|| black_box(build_from_paths(std::slice::from_ref(&input), &config).unwrap()))
    });

    group.finish();
}

fn bench_dot_export(c: &mut Criterion) {
    let config = LineageConfig::default();
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("mapping.csv");
    fs::write(&input, generate_mapping(100, 20)).unwrap();
    let (model, _) = build_from_paths(std::slice::from_ref(&input), &config).unwrap();
    let view = GraphView::from_model(&model);

    c.bench_function("export_dot_100t", |b| {
        b.iter(|| black_box(to_dot(&view, Layout::LR, &config)))
    });
}

criterion_group!(
    benches,
    bench_build_in_memory,
    bench_build_from_file,
    bench_dot_export
);
criterion_main!(benches);
