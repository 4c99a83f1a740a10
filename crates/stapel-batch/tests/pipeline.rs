// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end pipeline tests: queue → registry → processor → aggregator,
// using the real document transforms.

use std::io::Read;

use flate2::read::GzDecoder;
use lopdf::{Document, Object, dictionary};
use stapel_batch::{BatchProcessor, ItemQueue, ResultAggregator, TransformRegistry};
use stapel_core::error::StapelError;
use stapel_core::types::{ItemStatus, SourceDocument};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("stapel_batch=debug,stapel_document=debug")
        .try_init();
}

/// Minimal valid one-page PDF built with lopdf.
fn minimal_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save fixture");
    out
}

/// Small in-memory PNG.
fn small_png() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(6, 6, image::Rgb([30, 90, 180]));
    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .expect("encode png");
    out
}

fn entry_names(archive_bytes: &[u8]) -> Vec<String> {
    let mut tar_bytes = Vec::new();
    GzDecoder::new(archive_bytes)
        .read_to_end(&mut tar_bytes)
        .expect("gunzip");

    let mut names = Vec::new();
    let mut archive = tar::Archive::new(tar_bytes.as_slice());
    for entry in archive.entries().expect("entries") {
        let entry = entry.expect("entry");
        names.push(entry.path().expect("path").to_string_lossy().into_owned());
    }
    names
}

#[test]
fn mixed_media_compress_batch() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let mut queue = ItemQueue::new();
    queue.add(SourceDocument::new(
        "fileA.pdf",
        "application/pdf",
        minimal_pdf(),
    ));
    queue.add(SourceDocument::new("fileB.png", "image/png", small_png()));

    let summary = processor.run(&mut queue, "compress").expect("run");
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);

    let items = queue.items();
    assert_eq!(items[0].status, ItemStatus::Succeeded);
    assert_eq!(items[0].output_name.as_deref(), Some("fileA-compressed.pdf"));
    assert_eq!(items[1].status, ItemStatus::Failed);
    let message = items[1].error_message.as_deref().expect("error message");
    assert!(message.contains("does not accept"));
    assert!(message.contains("image/png"));
}

#[test]
fn convert_batch_exports_collision_safe_archive() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let mut queue = ItemQueue::new();
    // Two distinct inputs that map to the same output name.
    queue.add(SourceDocument::new("scan.png", "image/png", small_png()));
    queue.add(SourceDocument::new("scan.jpeg", "image/jpeg", {
        let img = image::RgbImage::from_pixel(5, 5, image::Rgb([250, 250, 20]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Jpeg)
            .expect("encode jpeg");
        out
    }));

    let summary = processor
        .run(&mut queue, "convert-image-to-document")
        .expect("run");
    assert_eq!(summary.succeeded, 2);

    let payload = ResultAggregator::new("converted.tar.gz")
        .export(&queue)
        .expect("export");
    assert_eq!(entry_names(&payload.bytes), vec!["scan.pdf", "scan-2.pdf"]);
}

#[test]
fn export_before_the_batch_finishes_reflects_partial_progress() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let aggregator = ResultAggregator::new("partial.tar.gz");
    let mut queue = ItemQueue::new();
    queue.add(SourceDocument::new("one.png", "image/png", small_png()));
    queue.add(SourceDocument::new("two.png", "image/png", small_png()));

    processor
        .run(&mut queue, "convert-image-to-document")
        .expect("first run");

    // A third file arrives; the batch is no longer fully finished, but the
    // archive is available immediately and reflects what has completed.
    queue.add(SourceDocument::new("three.png", "image/png", small_png()));
    let payload = aggregator.export(&queue).expect("partial export");
    assert_eq!(payload.entry_count, 2);
    assert_eq!(entry_names(&payload.bytes), vec!["one.pdf", "two.pdf"]);

    processor
        .run(&mut queue, "convert-image-to-document")
        .expect("second run");
    let payload = aggregator.export(&queue).expect("full export");
    assert_eq!(payload.entry_count, 3);
}

#[test]
fn flatten_batch_keeps_failures_isolated() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let mut queue = ItemQueue::new();
    queue.add(SourceDocument::new(
        "good.pdf",
        "application/pdf",
        minimal_pdf(),
    ));
    queue.add(SourceDocument::new(
        "broken.pdf",
        "application/pdf",
        b"%PDF-1.5 truncated garbage".to_vec(),
    ));
    queue.add(SourceDocument::new(
        "also-good.pdf",
        "application/pdf",
        minimal_pdf(),
    ));

    let summary = processor.run(&mut queue, "flatten").expect("run");
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    let statuses: Vec<ItemStatus> = queue.items().iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            ItemStatus::Succeeded,
            ItemStatus::Failed,
            ItemStatus::Succeeded
        ]
    );
}

#[test]
fn rerun_skips_everything_and_export_is_stable() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let mut queue = ItemQueue::new();
    queue.add(SourceDocument::new("a.png", "image/png", small_png()));
    queue.add(SourceDocument::new("b.png", "image/png", small_png()));

    processor
        .run(&mut queue, "convert-image-to-document")
        .expect("first run");
    let summary = processor
        .run(&mut queue, "convert-image-to-document")
        .expect("second run");
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 2);

    let payload = ResultAggregator::new("out.tar.gz")
        .export(&queue)
        .expect("export");
    assert_eq!(payload.entry_count, 2);
}

#[test]
fn fresh_queue_has_nothing_to_export() {
    init_logging();
    let mut queue = ItemQueue::new();
    queue.add(SourceDocument::new("a.pdf", "application/pdf", minimal_pdf()));

    let result = ResultAggregator::new("out.tar.gz").export(&queue);
    assert!(matches!(result, Err(StapelError::NothingToExport)));
}

#[test]
fn empty_queue_run_is_a_clean_no_op() {
    init_logging();
    let processor = BatchProcessor::new(TransformRegistry::with_defaults());
    let mut queue = ItemQueue::new();

    let summary = processor.run(&mut queue, "compress").expect("run");
    assert_eq!(summary.succeeded, 0);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert!(!summary.cancelled);
}
