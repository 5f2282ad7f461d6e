//! End-to-end tests for collection ingestion
//!
//! Covers:
//! 1. Record count matches chunk count
//! 2. Re-ingestion replaces the collection
//! 3. Failures leave the previous collection intact
//! 4. Deduplicated search over repeated chunks

mod common;

use common::*;
use ragline_core::{DocumentRecord, RaglineError, Segmenter, VectorStore};
use std::sync::atomic::Ordering;

fn paragraph(topic: &str) -> String {
    format!("{:<60}", format!("{} paragraph text", topic))
}

fn doc(source: &str, paragraphs: &[&str]) -> DocumentRecord {
    let text = paragraphs
        .iter()
        .map(|p| paragraph(p))
        .collect::<Vec<_>>()
        .join("\n\n");
    DocumentRecord::new(source, text, source.to_uppercase())
}

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn segmenter() -> Segmenter {
    Segmenter::new(100, 0).unwrap()
}

#[tokio::test]
async fn test_ingest_two_documents_into_five_records() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let docs = vec![
        doc("a", &["alpha", "beta", "gamma"]),
        doc("b", &["delta", "epsilon"]),
    ];
    assert_eq!(segmenter().segment(&docs).len(), 5);

    let pipeline = h.ingestion_pipeline(MapLoader::new(docs), segmenter());
    let stats = pipeline.ingest(&sources(&["a", "b"]), "kb").await.unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.chunks, 5);
    assert_eq!(stats.inserted, 5);
    assert!(stats.skipped_sources.is_empty());

    let store: &dyn VectorStore = h.store.as_ref();
    assert_eq!(store.count_records("kb").unwrap(), 5);
    let info = store.list_collections().unwrap();
    assert_eq!(info[0].dimensions, DIMS);
    // batch size 2 over 5 chunks
    assert_eq!(h.embedder.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_reingest_replaces_records() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let docs = vec![
        doc("a", &["alpha", "beta", "gamma"]),
        doc("b", &["delta", "epsilon"]),
        doc("c", &["zeta", "eta"]),
    ];
    let pipeline = h.ingestion_pipeline(MapLoader::new(docs), segmenter());

    pipeline.ingest(&sources(&["a", "b"]), "kb").await.unwrap();
    let stats = pipeline.ingest(&sources(&["c"]), "kb").await.unwrap();

    assert_eq!(stats.chunks, 2);
    assert_eq!(h.store.count_records("kb").unwrap(), 2);
}

#[tokio::test]
async fn test_failed_sources_are_reported() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let pipeline = h.ingestion_pipeline(MapLoader::new(vec![doc("a", &["alpha"])]), segmenter());

    let stats = pipeline
        .ingest(&sources(&["a", "missing"]), "kb")
        .await
        .unwrap();
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.skipped_sources, vec!["missing".to_string()]);
}

#[tokio::test]
async fn test_nothing_loaded_keeps_existing_collection() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let loader = MapLoader::new(vec![doc("a", &["alpha", "beta"])]);
    let pipeline = h.ingestion_pipeline(loader, segmenter());
    pipeline.ingest(&sources(&["a"]), "kb").await.unwrap();

    let err = pipeline
        .ingest(&sources(&["missing"]), "kb")
        .await
        .unwrap_err();
    assert!(matches!(err, RaglineError::InvalidInput(_)));
    assert_eq!(h.store.count_records("kb").unwrap(), 2);
}

#[tokio::test]
async fn test_embedding_failure_keeps_existing_collection() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let pipeline = h.ingestion_pipeline(
        MapLoader::new(vec![doc("a", &["alpha", "beta"]), doc("b", &["gamma"])]),
        segmenter(),
    );
    pipeline.ingest(&sources(&["a"]), "kb").await.unwrap();

    h.embedder.fail.store(true, Ordering::SeqCst);
    let err = pipeline.ingest(&sources(&["b"]), "kb").await.unwrap_err();

    assert!(matches!(err, RaglineError::UpstreamService { .. }));
    assert_eq!(h.store.count_records("kb").unwrap(), 2);
}

#[tokio::test]
async fn test_empty_collection_name_rejected() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let pipeline = h.ingestion_pipeline(MapLoader::new(vec![doc("a", &["alpha"])]), segmenter());
    assert!(pipeline.ingest(&sources(&["a"]), "  ").await.is_err());
}

#[tokio::test]
async fn test_repeated_chunks_deduplicated_in_search() {
    let h = Harness::new(KeywordReranker::new("x", 0.9, 0.0));
    let pipeline = h.ingestion_pipeline(MapLoader::new(vec![]), segmenter());
    let same = DocumentRecord::new("dup", "identical content", "Dup");
    let other = DocumentRecord::new("other", "different content entirely", "Other");

    pipeline
        .ingest_documents(&[same.clone(), same.clone(), same, other], "kb")
        .await
        .unwrap();
    assert_eq!(h.store.count_records("kb").unwrap(), 4);

    let store: &dyn VectorStore = h.store.as_ref();
    let hits = store
        .search("kb", &embed_text("[Source: Dup]\nidentical content"), 3)
        .unwrap();
    let texts: Vec<_> = hits.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["[Source: Dup]\nidentical content", "[Source: Other]\ndifferent content entirely"]
    );
}

#[tokio::test]
async fn test_ingested_collection_answers_queries() {
    let h = Harness::new(KeywordReranker::new("gamma", 0.9, 0.0));
    let pipeline = h.ingestion_pipeline(
        MapLoader::new(vec![doc("a", &["alpha", "beta", "gamma"])]),
        segmenter(),
    );
    pipeline.ingest(&sources(&["a"]), "kb").await.unwrap();

    let ctx = h
        .query_pipeline()
        .process("gamma?", 0, Some("kb"), Default::default())
        .await
        .unwrap();
    assert!(ctx.grounded);
    assert_eq!(ctx.prompt_chunks.len(), 1);
    assert!(ctx.prompt_chunks[0].text.starts_with("[Source: A]\ngamma paragraph text"));
}
