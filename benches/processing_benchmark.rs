use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::path::Path;
use tempfile::TempDir;
use toll_etl::config::Settings;
use toll_etl::extractors::slice_field;
use toll_etl::models::StagingArea;
use toll_etl::processors::{PipelineStage, Stage};

// Create staged sources with `rows` events each
fn create_test_sources(dir: &Path, rows: usize) {
    let mut csv = String::with_capacity(rows * 48);
    let mut tsv = String::with_capacity(rows * 64);
    let mut fixed = String::with_capacity(rows * 92);

    for i in 1..=rows {
        let vehicle = if i % 3 == 0 { "truck" } else { "car" };
        csv.push_str(&format!(
            "{i},Thu Aug 19 21:54:38 2021,{},{vehicle},2,VC965\n",
            100000 + i
        ));
        tsv.push_str(&format!(
            "{i}\tThu Aug 19 21:54:38 2021\t{}\t{vehicle}\t2\t{}\tPC7C042B7\n",
            100000 + i,
            4000 + i % 10
        ));
        fixed.push_str(&format!(
            "{:<50}{:<20}{:<20}\n",
            format!("{i} Thu Aug 19 21:54:38 2021 {}", 100000 + i),
            "PTE",
            "VC965"
        ));
    }

    std::fs::write(dir.join("vehicle-data.csv"), csv).unwrap();
    std::fs::write(dir.join("tollplaza-data.tsv"), tsv).unwrap();
    std::fs::write(dir.join("payment-data.txt"), fixed).unwrap();
}

fn benchmark_slice_field(c: &mut Criterion) {
    let line = format!("{:<50}{:<20}{:<20}", "1 Thu Aug 19 21:54:38 2021 125094", "PTE", "VC965");

    c.bench_function("slice_field", |b| {
        b.iter(|| {
            black_box(slice_field(black_box(&line), 50..70));
            black_box(slice_field(black_box(&line), 70..90));
        })
    });
}

fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("stages");

    for rows in [1_000usize, 10_000] {
        let temp_dir = TempDir::new().unwrap();
        create_test_sources(temp_dir.path(), rows);
        let staging = StagingArea::new(Settings::with_staging_dir(temp_dir.path()));

        // Seed intermediates so later stages have input
        for stage in Stage::ORDER {
            stage.build(&staging).run().unwrap();
        }

        for stage in Stage::ORDER {
            let runnable = stage.build(&staging);
            group.bench_with_input(BenchmarkId::new(stage.name(), rows), &rows, |b, _| {
                b.iter(|| black_box(runnable.run().unwrap()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_slice_field, benchmark_stages);
criterion_main!(benches);
