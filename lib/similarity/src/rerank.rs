//! Reranker for business-context similarity
//!
//! Re-orders raw nearest-neighbour hits by combining their distance with the
//! overlap between the query's concepts and each row's business categories,
//! and attaches a human-readable reason to every surviving result.
//!
//! Scores are distances: lower is better, and a concept overlap pulls a row
//! closer by `overlap_bonus` per shared concept. Hits without a finite
//! distance are dropped before ranking.

use ahash::AHashMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use sheetsense_core::{BusinessVocabulary, ColumnType, Error, RawHit, Result};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

use crate::explain::{explanation, relevance_reason};
use crate::query::QueryAnalysis;

/// Ranker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Distance subtracted per concept shared by query and row
    pub overlap_bonus: f32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self { overlap_bonus: 0.05 }
    }
}

impl RankerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.overlap_bonus.is_finite() || self.overlap_bonus < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "overlap_bonus must be a finite non-negative number, got {}",
                self.overlap_bonus
            )));
        }
        Ok(())
    }
}

/// One row of the final answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub row_index: u64,
    pub row_text: String,
    /// Distance reported by the search, always finite
    pub raw_score: f32,
    /// `raw_score` after the concept-overlap bonus, never negative
    pub adjusted_score: f32,
    pub business_categories: BTreeSet<String>,
    pub column_types: BTreeMap<String, ColumnType>,
    /// Query concepts this row also carries
    pub matched_concepts: BTreeSet<String>,
    pub relevance_reason: String,
    pub explanation: String,
}

impl RankedResult {
    #[inline]
    pub fn is_boosted(&self) -> bool {
        !self.matched_concepts.is_empty()
    }
}

/// A hit scored but not yet explained
struct Scored {
    hit: RawHit,
    adjusted: f32,
    matched: BTreeSet<String>,
}

/// Concept-aware reranker
#[derive(Debug, Clone)]
pub struct Reranker {
    vocabulary: Arc<BusinessVocabulary>,
    config: RankerConfig,
}

impl Reranker {
    pub fn new(vocabulary: Arc<BusinessVocabulary>, config: RankerConfig) -> Self {
        Self { vocabulary, config }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    /// Rerank `hits` for `analysis` and keep the best `k`.
    ///
    /// Hits sharing a `row_index` are collapsed to the closest one and hits
    /// with a non-finite distance are dropped. Ties on adjusted score break on
    /// raw score, then on overlap (more first), then on row index, so the
    /// output does not depend on the order hits arrive in.
    pub fn rerank(&self, analysis: &QueryAnalysis, hits: Vec<RawHit>, k: usize) -> Result<Vec<RankedResult>> {
        if k == 0 {
            return Err(Error::invalid_argument("k must be at least 1"));
        }

        let candidates = hits.len();
        let unique = dedup(hits);
        let unique_count = unique.len();

        let mut scored: Vec<Scored> = unique
            .into_iter()
            .map(|hit| {
                let matched: BTreeSet<String> = analysis
                    .extracted_concepts
                    .intersection(&hit.payload.business_categories)
                    .cloned()
                    .collect();
                let adjusted = self.adjusted_score(hit.raw_score, matched.len());
                Scored { hit, adjusted, matched }
            })
            .collect();

        // More overlap wins once the clamp at 0 makes adjusted and raw tie
        scored.sort_by_key(|s| {
            (
                OrderedFloat(s.adjusted),
                OrderedFloat(s.hit.raw_score),
                Reverse(s.matched.len()),
                s.hit.row_index(),
            )
        });
        scored.truncate(k);

        let results: Vec<RankedResult> = scored
            .into_iter()
            .map(|s| self.explain(analysis, s))
            .collect();

        debug!(
            candidates,
            unique = unique_count,
            returned = results.len(),
            boosted = results.iter().filter(|r| r.is_boosted()).count(),
            "reranked hits"
        );

        Ok(results)
    }

    /// `max(raw - overlap_bonus * overlap, 0)`
    pub fn adjusted_score(&self, raw_score: f32, overlap: usize) -> f32 {
        (raw_score - self.config.overlap_bonus * overlap as f32).max(0.0)
    }

    fn explain(&self, analysis: &QueryAnalysis, scored: Scored) -> RankedResult {
        let Scored { hit, adjusted, matched } = scored;
        let relevance_reason = relevance_reason(analysis, &matched);
        let explanation = explanation(
            &self.vocabulary,
            analysis,
            &matched,
            &hit.payload.business_categories,
        );

        RankedResult {
            row_index: hit.payload.row_index,
            row_text: hit.payload.row_text,
            raw_score: hit.raw_score,
            adjusted_score: adjusted,
            business_categories: hit.payload.business_categories,
            column_types: hit.payload.column_types,
            matched_concepts: matched,
            relevance_reason,
            explanation,
        }
    }
}

// One hit per row, the closest one wins. A NaN or infinite distance cannot
// be ordered against real ones, nor written as a JSON number.
fn dedup(hits: Vec<RawHit>) -> Vec<RawHit> {
    let mut best: AHashMap<u64, RawHit> = AHashMap::with_capacity(hits.len());
    let mut dropped = 0usize;
    for hit in hits {
        if !hit.raw_score.is_finite() {
            dropped += 1;
            continue;
        }
        match best.get(&hit.row_index()) {
            Some(existing) if existing.raw_score <= hit.raw_score => {}
            _ => {
                best.insert(hit.row_index(), hit);
            }
        }
    }
    if dropped > 0 {
        debug!(dropped, "dropped hits without a finite distance");
    }
    best.into_values().collect()
}
