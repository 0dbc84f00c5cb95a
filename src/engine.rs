//! The engine facade
//!
//! Owns one instance of every component, all sharing a single vocabulary,
//! and exposes the indexing-time and query-time entry points. An `Engine`
//! holds no mutable state; share it behind an `Arc` freely.

use rayon::prelude::*;
use sheetsense_core::{
    BusinessVocabulary, ColumnProfile, Dataset, IndexPayload, RawHit, Result, Row, RowRecord,
};
use sheetsense_schema::{ColumnProfiler, RowSerializer};
use sheetsense_similarity::{QueryAnalysis, QueryAnalyzer, QueryResponse, RankedResult, Reranker};
use std::sync::Arc;
use tracing::debug;

use crate::config::EngineConfig;

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    vocabulary: Arc<BusinessVocabulary>,
    profiler: ColumnProfiler,
    serializer: RowSerializer,
    analyzer: QueryAnalyzer,
    reranker: Reranker,
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), BusinessVocabulary::shared())
    }
}

impl Engine {
    /// Engine over the standard vocabulary
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_vocabulary(config, BusinessVocabulary::shared())
    }

    pub fn with_vocabulary(config: EngineConfig, vocabulary: Arc<BusinessVocabulary>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, vocabulary))
    }

    fn build(config: EngineConfig, vocabulary: Arc<BusinessVocabulary>) -> Self {
        Self {
            profiler: ColumnProfiler::new(config.profiler.clone()),
            serializer: RowSerializer::new(Arc::clone(&vocabulary)),
            analyzer: QueryAnalyzer::new(Arc::clone(&vocabulary), config.analyzer.clone()),
            reranker: Reranker::new(Arc::clone(&vocabulary), config.ranker.clone()),
            vocabulary,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn vocabulary(&self) -> &Arc<BusinessVocabulary> {
        &self.vocabulary
    }

    // --- Indexing time ---

    /// Infer one profile per column
    pub fn profile(&self, dataset: &Dataset) -> Vec<ColumnProfile> {
        self.profiler.profile(dataset)
    }

    /// Full record for one row: raw values, text, categories, column types
    pub fn serialize_row(&self, index: u64, row: &Row, profiles: &[ColumnProfile]) -> Result<RowRecord> {
        self.serializer.serialize(index, row, profiles)
    }

    /// The payload to embed and store for one row
    pub fn prepare_row_for_indexing(
        &self,
        index: u64,
        row: &Row,
        profiles: &[ColumnProfile],
    ) -> Result<IndexPayload> {
        Ok(self.serialize_row(index, row, profiles)?.payload())
    }

    /// Profile a dataset and serialize every row, in row order.
    /// Row `i` gets index `i`.
    pub fn ingest(&self, dataset: &Dataset) -> Result<Vec<RowRecord>> {
        let profiles = self.profile(dataset);

        let records = (0..dataset.row_count())
            .into_par_iter()
            .map(|i| {
                let row = dataset.row(i).unwrap_or_default();
                self.serializer.serialize(i as u64, &row, &profiles)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            columns = profiles.len(),
            rows = records.len(),
            "ingested dataset"
        );
        Ok(records)
    }

    // --- Query time ---

    pub fn analyze(&self, query: &str) -> Result<QueryAnalysis> {
        self.analyzer.analyze(query)
    }

    /// Rerank the hits of a search run for `analysis`, keeping `k`
    pub fn rank(&self, analysis: &QueryAnalysis, hits: Vec<RawHit>, k: usize) -> Result<Vec<RankedResult>> {
        self.reranker.rerank(analysis, hits, k)
    }

    /// Rank and wrap into the response envelope
    pub fn respond(&self, analysis: QueryAnalysis, hits: Vec<RawHit>, k: usize) -> Result<QueryResponse> {
        let candidates = hits.len();
        let results = self.rank(&analysis, hits, k)?;
        Ok(QueryResponse::new(analysis, results, candidates))
    }

    /// Analyze `query` and rank hits the caller already retrieved for it
    pub fn analyze_and_rank(&self, query: &str, k: usize, hits: Vec<RawHit>) -> Result<QueryResponse> {
        let analysis = self.analyze(query)?;
        self.respond(analysis, hits, k)
    }
}
