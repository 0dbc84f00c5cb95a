//! Two-phase search pipeline
//!
//! Runs a query end to end against any nearest-neighbour backend: analyze,
//! search the backend the way the analysis asks for, then rerank. The backend
//! is reached through [`SimilaritySearch`]; a search that fails or exceeds
//! `search_timeout_ms` is logged and ranked as an empty hit list. A
//! category-filtered search that succeeds with no hits is retried once
//! without its filter.
//!
//! ```text
//! query ──> analyze ──┬── plain ──────────────> search(filter: None)
//!                     ├── category_filtered ──> search(filter: concepts), unfiltered if empty
//!                     └── hybrid ─────────────> search(filter) ∥ search(expanded)
//!                                                        │
//!                                         rerank <───────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sheetsense_core::{CategoryFilter, Error, RawHit, Result};
use sheetsense_similarity::{QueryAnalysis, QueryResponse, SearchStrategy};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::engine::Engine;

/// Candidates requested from the backend per result kept
pub const CANDIDATE_MULTIPLIER: usize = 2;

/// One call to the similarity backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Text to embed and search with
    pub text: String,
    pub limit: usize,
    /// Metadata restriction to push down, `None` for an unfiltered search
    pub filter: Option<CategoryFilter>,
}

/// A nearest-neighbour backend: embeds the request text and returns the
/// closest stored rows with their distances
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, request: SearchRequest) -> anyhow::Result<Vec<RawHit>>;
}

#[async_trait]
impl<T: SimilaritySearch + ?Sized> SimilaritySearch for Arc<T> {
    async fn search(&self, request: SearchRequest) -> anyhow::Result<Vec<RawHit>> {
        (**self).search(request).await
    }
}

pub struct SearchPipeline<S> {
    engine: Arc<Engine>,
    searcher: S,
}

impl<S: SimilaritySearch> SearchPipeline<S> {
    pub fn new(engine: Arc<Engine>, searcher: S) -> Self {
        Self { engine, searcher }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Answer `query` with at most `k` explained rows
    pub async fn run(&self, query: &str, k: usize) -> Result<QueryResponse> {
        if k == 0 {
            return Err(Error::invalid_argument("k must be at least 1"));
        }

        let analysis = self.engine.analyze(query)?;
        let hits = self.retrieve(&analysis, k.saturating_mul(CANDIDATE_MULTIPLIER)).await;
        self.engine.respond(analysis, hits, k)
    }

    async fn retrieve(&self, analysis: &QueryAnalysis, limit: usize) -> Vec<RawHit> {
        let query = analysis.original_query.clone();

        match analysis.search_strategy {
            SearchStrategy::PlainSimilarity => {
                self.search_or_empty(SearchRequest { text: query, limit, filter: None })
                    .await
            }
            SearchStrategy::CategoryFilteredSimilarity => {
                let filtered = SearchRequest {
                    text: query.clone(),
                    limit,
                    filter: analysis.category_filter(),
                };
                match self.try_search(filtered).await {
                    Some(hits) if hits.is_empty() => {
                        debug!("filtered search matched no rows, searching unfiltered");
                        self.search_or_empty(SearchRequest { text: query, limit, filter: None })
                            .await
                    }
                    Some(hits) => hits,
                    None => Vec::new(),
                }
            }
            SearchStrategy::Hybrid => {
                let filtered = SearchRequest {
                    text: query,
                    limit,
                    filter: analysis.category_filter(),
                };
                let plain = SearchRequest {
                    text: expanded_text(analysis),
                    limit,
                    filter: None,
                };

                let (mut hits, extra) = tokio::join!(
                    self.search_or_empty(filtered),
                    self.search_or_empty(plain)
                );
                hits.extend(extra);
                hits
            }
        }
    }

    async fn search_or_empty(&self, request: SearchRequest) -> Vec<RawHit> {
        self.try_search(request).await.unwrap_or_default()
    }

    /// `None` when the backend failed or ran out of time
    async fn try_search(&self, request: SearchRequest) -> Option<Vec<RawHit>> {
        let timeout = self.engine.config().search_timeout();
        let filtered = request.filter.is_some();

        match tokio::time::timeout(timeout, self.searcher.search(request)).await {
            Ok(Ok(hits)) => {
                debug!(hits = hits.len(), filtered, "similarity search returned");
                Some(hits)
            }
            Ok(Err(e)) => {
                warn!(error = %e, filtered, "similarity search failed, ranking without its hits");
                None
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    filtered,
                    "similarity search timed out, ranking without its hits"
                );
                None
            }
        }
    }
}

/// Query text with the analysis' synonym phrases appended
pub fn expanded_text(analysis: &QueryAnalysis) -> String {
    if analysis.expanded_terms.is_empty() {
        return analysis.original_query.clone();
    }
    format!(
        "{} {}",
        analysis.original_query,
        analysis.expanded_terms.join(" ")
    )
}
