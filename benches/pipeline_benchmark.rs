//! Performance benchmarks for the redaction pipelines
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pdf_redact_server::config::RedactionConfig;
use pdf_redact_server::geometry::Rect;
use pdf_redact_server::pdf::{MemoryDocument, MemoryEngine, MemoryPage};
use pdf_redact_server::pipeline::{NameMatcher, PagePipeline, RemovalPipeline};

fn png_bytes(size: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(size, size, image::Rgb([90, 90, 90]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("Failed to encode fixture image");
    out
}

/// A directory page with `people` rows of name, photo and caption
fn directory(pages: usize, people: usize) -> MemoryDocument {
    let photo = png_bytes(64);
    let pages = (0..pages)
        .map(|_| {
            (0..people).fold(MemoryPage::new(600.0, 800.0), |page, i| {
                let top = 40.0 + 70.0 * i as f32;
                page.with_text(
                    format!("Person{}, Sample", (b'A' + i as u8) as char),
                    Rect::new(40.0, top, 200.0, top + 12.0),
                )
                .with_image(i as u64, Rect::new(40.0, top + 16.0, 80.0, top + 56.0), photo.clone())
                .with_text("Individual contributor", Rect::new(40.0, top + 58.0, 260.0, top + 68.0))
            })
        })
        .collect();
    MemoryDocument::new(pages)
}

fn bench_name_matching(c: &mut Criterion) {
    let matcher = NameMatcher::new().expect("Failed to compile name pattern");
    let text = (0..200)
        .map(|i| format!("Surname{}, Given Middle\nSome role text", i % 10))
        .collect::<Vec<_>>()
        .join("\n");

    c.bench_function("name_matching_200_lines", |b| {
        b.iter(|| matcher.rearranged(black_box(&text)))
    });
}

fn bench_page_pipeline(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pipeline = PagePipeline::new(&RedactionConfig::default()).expect("Failed to build pipeline");

    let mut group = c.benchmark_group("page_pipeline");
    for pages in [1usize, 5, 20] {
        let input = dir.path().join(format!("input_{}.json", pages));
        directory(pages, 8)
            .write(&input)
            .expect("Failed to write fixture");
        let output = dir.path().join(format!("output_{}.json", pages));

        group.bench_with_input(BenchmarkId::from_parameter(pages), &pages, |b, _| {
            b.iter(|| {
                pipeline
                    .run(&MemoryEngine, &input, &output, dir.path())
                    .expect("Pipeline failed")
            });
        });
    }
    group.finish();
}

fn bench_removal_pipeline(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let pipeline = PagePipeline::new(&RedactionConfig::default()).expect("Failed to build pipeline");

    let input = dir.path().join("input.json");
    directory(10, 8).write(&input).expect("Failed to write fixture");
    let processed = dir.path().join("processed.json");
    pipeline
        .run(&MemoryEngine, &input, &processed, dir.path())
        .expect("Pipeline failed");

    let mut document = MemoryDocument::load(&processed).expect("Failed to load processed");
    for page in 0..10 {
        document.set_checkbox(&format!("checkbox_{}_0", page), true);
    }
    let checked = dir.path().join("checked.json");
    document.write(&checked).expect("Failed to write checked");
    let output = dir.path().join("final.json");

    c.bench_function("removal_pipeline_10_pages", |b| {
        b.iter(|| {
            RemovalPipeline::new()
                .run(&MemoryEngine, black_box(&checked), &output)
                .expect("Removal failed")
        });
    });
}

criterion_group!(
    benches,
    bench_name_matching,
    bench_page_pipeline,
    bench_removal_pipeline
);
criterion_main!(benches);
