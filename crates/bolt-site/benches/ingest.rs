//! Benchmarks for ingestion throughput.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bolt_site::{ArtifactStore, Loader, MarkdownPage, PageChrome};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 50 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold** and *italic* text.\n\n"
            ));
        }
    }
    md
}

/// Write `pages` documents spread over ten directories.
fn create_corpus(root: &Path, pages: usize) {
    let markdown = generate_markdown(10, 3);
    for i in 0..pages {
        let dir = root.join(format!("section{}", i % 10));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("page{i}.md")), &markdown).unwrap();
    }
}

fn bench_ingest_workers(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let base_dir = temp_dir.path().join("content");
    create_corpus(&base_dir, 200);
    let page = MarkdownPage::new(Arc::new(PageChrome::default()));

    let mut group = c.benchmark_group("ingest_workers");
    group.throughput(Throughput::Elements(200));
    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, &workers| {
            b.iter(|| {
                let loader = Loader::new(Arc::new(ArtifactStore::new())).with_workers(workers);
                loader.load(&base_dir, &page).unwrap()
            });
        });
    }
    group.finish();
}

fn bench_ingest_queue_capacity(c: &mut Criterion) {
    let temp_dir = tempfile::tempdir().unwrap();
    let base_dir = temp_dir.path().join("content");
    create_corpus(&base_dir, 200);
    let page = MarkdownPage::new(Arc::new(PageChrome::default()));

    let mut group = c.benchmark_group("ingest_queue_capacity");
    for capacity in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                b.iter(|| {
                    let loader =
                        Loader::new(Arc::new(ArtifactStore::new())).with_queue_capacity(capacity);
                    loader.load(&base_dir, &page).unwrap()
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_ingest_workers, bench_ingest_queue_capacity);
criterion_main!(benches);
