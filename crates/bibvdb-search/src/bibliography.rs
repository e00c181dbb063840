//! The `Bibliography` facade: one add/search API over the record
//! store, vector index, and fuzzy matcher.

use std::path::{Path, PathBuf};

use bibvdb_core::{Error as CoreError, NewRecord, Record, RecordId, RecordStore};
use bibvdb_index::{persist, FlatIndex, Metric};

use crate::error::{Result, SearchError};
use crate::fuzzy::FuzzyMatcher;
use crate::router::{reciprocal_rank_fusion, SearchHit, SearchMode};

/// A bibliographic vector database.
///
/// Adding a record writes it to the SQLite store, appends its embedding
/// to the vector index, and registers its identifier and title with the
/// fuzzy matcher. Queries dispatch to the index (semantic), the matcher
/// (lexical), or both fused by rank (hybrid).
///
/// Writer/reader discipline is enforced by the borrow checker: `add*`
/// take `&mut self`, queries take `&self`. Callers sharing a
/// `Bibliography` across threads wrap it in `std::sync::RwLock`.
#[derive(Debug)]
pub struct Bibliography {
    store: RecordStore,
    index: FlatIndex,
    fuzzy: FuzzyMatcher,
    index_path: Option<PathBuf>,
}

impl Bibliography {
    /// Open a bibliography backed by the given database and index paths.
    ///
    /// A persisted index is loaded and validated against the configured
    /// dimension and metric; a header mismatch is a hard error rather
    /// than a silent reinterpretation. A missing index file, or one out
    /// of step with the store, is rebuilt from stored records.
    pub fn open(
        db_path: impl AsRef<Path>,
        index_path: impl Into<PathBuf>,
        dimension: usize,
        metric: Metric,
    ) -> Result<Self> {
        let store = RecordStore::open(db_path)?;
        let index_path = index_path.into();

        let index = if index_path.exists() {
            let loaded = persist::load(&index_path)?;
            if loaded.dimension() != dimension {
                return Err(SearchError::IndexCorrupt(format!(
                    "index dimension {} does not match configured dimension {}",
                    loaded.dimension(),
                    dimension
                )));
            }
            if loaded.metric() != metric {
                return Err(SearchError::IndexCorrupt(format!(
                    "index metric {} does not match configured metric {}",
                    loaded.metric(),
                    metric
                )));
            }
            if loaded.len() == store.record_count()? {
                loaded
            } else {
                tracing::warn!(
                    "Index has {} rows but store has {} records, rebuilding",
                    loaded.len(),
                    store.record_count()?
                );
                rebuild_index(&store, dimension, metric)?
            }
        } else {
            rebuild_index(&store, dimension, metric)?
        };

        let fuzzy = FuzzyMatcher::from_entries(store.list_identifier_titles()?);

        Ok(Self {
            store,
            index,
            fuzzy,
            index_path: Some(index_path),
        })
    }

    /// Open an in-memory bibliography with no persisted index (for tests).
    pub fn open_in_memory(dimension: usize, metric: Metric) -> Result<Self> {
        let store = RecordStore::open_in_memory()?;
        let index = FlatIndex::new(dimension, metric)?;
        Ok(Self {
            store,
            index,
            fuzzy: FuzzyMatcher::new(),
            index_path: None,
        })
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.index.metric()
    }

    /// Number of records held.
    pub fn len(&self) -> Result<usize> {
        Ok(self.store.record_count()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.store.record_count()? == 0)
    }

    /// Add one record with its precomputed embedding.
    ///
    /// # Errors
    /// `DuplicateKey` if the identifier is already present,
    /// `DimensionMismatch` if the embedding length is wrong,
    /// `InvalidData` if the identifier is not a DOI or ISBN.
    pub fn add(&mut self, fields: NewRecord, embedding: Vec<f32>) -> Result<RecordId> {
        if embedding.len() != self.index.dimension() {
            return Err(SearchError::Core(CoreError::DimensionMismatch {
                expected: self.index.dimension(),
                actual: embedding.len(),
            }));
        }

        let record = Record::new(fields, embedding)?;
        self.store.insert_record(&record)?;
        self.index.insert(&record.embedding, &record.identifier)?;
        self.fuzzy.insert(&record.identifier, &record.title);

        tracing::debug!("Added record {} ({})", record.identifier, record.id);
        Ok(record.id)
    }

    /// Add a batch of records with precomputed embeddings.
    ///
    /// The whole batch is validated (identifier syntax, duplicates both
    /// against the store and within the batch, dimensions) before any
    /// record is inserted, so a bad entry rejects the batch without
    /// partial writes.
    pub fn add_batch(&mut self, batch: Vec<(NewRecord, Vec<f32>)>) -> Result<Vec<RecordId>> {
        let mut seen = std::collections::HashSet::new();
        for (fields, embedding) in &batch {
            bibvdb_core::IdentifierKind::classify(&fields.identifier)?;
            if embedding.len() != self.index.dimension() {
                return Err(SearchError::Core(CoreError::DimensionMismatch {
                    expected: self.index.dimension(),
                    actual: embedding.len(),
                }));
            }
            if self.store.contains(&fields.identifier)? || !seen.insert(fields.identifier.clone())
            {
                return Err(SearchError::Core(CoreError::DuplicateKey {
                    identifier: fields.identifier.clone(),
                }));
            }
        }

        let mut ids = Vec::with_capacity(batch.len());
        for (fields, embedding) in batch {
            ids.push(self.add(fields, embedding)?);
        }
        Ok(ids)
    }

    /// Look up a full record by identifier.
    pub fn get(&self, identifier: &str) -> Result<Record> {
        Ok(self.store.get_record(identifier)?)
    }

    /// k-NN over record embeddings. Hits are ascending by distance.
    pub fn semantic_search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        let neighbors = self.index.search(query, k)?;
        Ok(neighbors
            .into_iter()
            .map(|n| SearchHit {
                identifier: n.identifier,
                score: f64::from(n.distance),
                mode: SearchMode::Semantic,
            })
            .collect())
    }

    /// Fuzzy lookup over identifiers and titles. Hits are descending by
    /// similarity; only entries at or above `threshold` are returned,
    /// at most `limit` of them.
    pub fn lexical_search(
        &self,
        query: &str,
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SearchError::InvalidQuery(format!(
                "threshold {threshold} outside [0, 1]"
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .fuzzy
            .search(query, threshold)
            .into_iter()
            .map(|m| SearchHit {
                identifier: m.identifier,
                score: m.similarity,
                mode: SearchMode::Lexical,
            })
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }

    /// Both modalities, merged with reciprocal rank fusion. Hits are
    /// descending by fused score.
    pub fn hybrid_search(
        &self,
        query_vector: &[f32],
        query_text: &str,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let semantic = self.semantic_search(query_vector, k)?;
        // No threshold on the lexical side: fusion is rank-based, and a
        // weak lexical rank contributes little on its own.
        let lexical = self.lexical_search(query_text, 0.0, k)?;
        Ok(reciprocal_rank_fusion(&semantic, &lexical, k))
    }

    /// Resolve hits back to full records, preserving hit order.
    pub fn resolve(&self, hits: &[SearchHit]) -> Result<Vec<Record>> {
        hits.iter().map(|hit| self.get(&hit.identifier)).collect()
    }

    /// Persist the vector index. A no-op for in-memory bibliographies.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = &self.index_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(CoreError::Io)?;
            }
            persist::save(&self.index, path)?;
        }
        Ok(())
    }
}

/// Rebuild the vector index from stored records, in identifier order.
fn rebuild_index(store: &RecordStore, dimension: usize, metric: Metric) -> Result<FlatIndex> {
    let mut index = FlatIndex::new(dimension, metric)?;
    for record in store.list_records()? {
        if record.embedding.len() != dimension {
            return Err(SearchError::IndexCorrupt(format!(
                "stored record {} has embedding dimension {}, expected {}",
                record.identifier,
                record.embedding.len(),
                dimension
            )));
        }
        index.insert(&record.embedding, &record.identifier)?;
    }
    if !index.is_empty() {
        tracing::info!("Rebuilt index from store: {} rows", index.len());
    }
    Ok(index)
}
