//! End-to-end tests over a persisted bibliography.

use bibvdb_core::NewRecord;
use bibvdb_embed::{EmbeddingProvider, HashEmbedding};
use bibvdb_index::Metric;
use bibvdb_search::{Bibliography, SearchMode};
use tempfile::TempDir;

const DIM: usize = 128;

fn embedder() -> HashEmbedding {
    HashEmbedding::new(DIM).unwrap()
}

fn populate(bib: &mut Bibliography, provider: &HashEmbedding) {
    let entries = [
        (
            "10.1000/xyz",
            "Attention Is All You Need",
            Some("The dominant sequence transduction models are based on recurrent networks."),
        ),
        (
            "10.5555/resnet",
            "Deep Residual Learning for Image Recognition",
            Some("Deeper neural networks are more difficult to train."),
        ),
        (
            "978-0-306-40615-7",
            "The Art of Computer Programming",
            None,
        ),
    ];

    for (identifier, title, summary) in entries {
        let mut fields = NewRecord::new(identifier, title);
        if let Some(summary) = summary {
            fields = fields.with_summary(summary);
        }
        let embedding = provider.embed_text(&fields.embedding_text());
        bib.add(fields, embedding).unwrap();
    }
}

#[test]
fn test_persisted_round_trip() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bibvdb.db");
    let index_path = dir.path().join("index.bvdb");
    let provider = embedder();

    {
        let mut bib =
            Bibliography::open(&db_path, &index_path, DIM, Metric::Cosine).unwrap();
        populate(&mut bib, &provider);
        bib.save().unwrap();
    }

    // Reopen from disk: records and index rows must survive
    let bib = Bibliography::open(&db_path, &index_path, DIM, Metric::Cosine).unwrap();
    assert_eq!(bib.len().unwrap(), 3);

    let record = bib.get("10.1000/xyz").unwrap();
    assert_eq!(record.title, "Attention Is All You Need");
    assert_eq!(record.embedding.len(), DIM);
}

#[test]
fn test_semantic_query_with_near_duplicate_embedding() {
    let mut bib = Bibliography::open_in_memory(DIM, Metric::Cosine).unwrap();
    let provider = embedder();
    populate(&mut bib, &provider);

    // Near-duplicate text embeds near the original
    let query = provider.embed_text(
        "Attention Is All You Need\n\
         The dominant sequence transduction models are based on recurrent networks",
    );
    let hits = bib.semantic_search(&query, 3).unwrap();

    assert_eq!(hits[0].identifier, "10.1000/xyz");
    for pair in hits.windows(2) {
        assert!(pair[0].score <= pair[1].score);
    }
}

#[test]
fn test_exact_embedding_returns_zero_distance() {
    let mut bib = Bibliography::open_in_memory(DIM, Metric::Cosine).unwrap();
    let provider = embedder();
    populate(&mut bib, &provider);

    let stored = bib.get("10.5555/resnet").unwrap();
    let hits = bib.semantic_search(&stored.embedding, 1).unwrap();
    assert_eq!(hits[0].identifier, "10.5555/resnet");
    assert!(hits[0].score.abs() < 1e-5);
}

#[test]
fn test_lexical_typo_query_above_threshold() {
    let mut bib = Bibliography::open_in_memory(DIM, Metric::Cosine).unwrap();
    populate(&mut bib, &embedder());

    let hits = bib
        .lexical_search("Attention is all u need", 0.85, 10)
        .unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].identifier, "10.1000/xyz");
    assert!(hits[0].score >= 0.85);
}

#[test]
fn test_hybrid_agreement_ranks_first() {
    let mut bib = Bibliography::open_in_memory(DIM, Metric::Cosine).unwrap();
    let provider = embedder();
    populate(&mut bib, &provider);

    let query_text = "Attention Is All You Need";
    let query_vec = provider.embed_text(query_text);
    let hits = bib.hybrid_search(&query_vec, query_text, 3).unwrap();

    assert_eq!(hits[0].identifier, "10.1000/xyz");
    assert!(hits.iter().all(|h| h.mode == SearchMode::Hybrid));
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_reopen_with_wrong_metric_fails() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bibvdb.db");
    let index_path = dir.path().join("index.bvdb");
    let provider = embedder();

    {
        let mut bib =
            Bibliography::open(&db_path, &index_path, DIM, Metric::Cosine).unwrap();
        populate(&mut bib, &provider);
        bib.save().unwrap();
    }

    let err = Bibliography::open(&db_path, &index_path, DIM, Metric::L2).unwrap_err();
    assert!(err.to_string().contains("metric"));
}

#[test]
fn test_index_rebuilt_when_file_missing() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("bibvdb.db");
    let index_path = dir.path().join("index.bvdb");
    let provider = embedder();

    {
        let mut bib =
            Bibliography::open(&db_path, &index_path, DIM, Metric::Cosine).unwrap();
        populate(&mut bib, &provider);
        // Deliberately no save(): the index file is never written
    }

    let bib = Bibliography::open(&db_path, &index_path, DIM, Metric::Cosine).unwrap();
    let stored = bib.get("10.1000/xyz").unwrap();
    let hits = bib.semantic_search(&stored.embedding, 1).unwrap();
    assert_eq!(hits[0].identifier, "10.1000/xyz");
}

#[tokio::test]
async fn test_batch_add_via_provider() {
    let mut bib = Bibliography::open_in_memory(DIM, Metric::Cosine).unwrap();
    let provider = embedder();

    let fields = vec![
        NewRecord::new("10.1/one", "First Paper"),
        NewRecord::new("10.2/two", "Second Paper"),
    ];
    let texts: Vec<String> = fields.iter().map(NewRecord::embedding_text).collect();
    let embeddings = provider.embed_batch(&texts).await.unwrap();

    let batch: Vec<_> = fields.into_iter().zip(embeddings).collect();
    let ids = bib.add_batch(batch).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(bib.len().unwrap(), 2);
}
