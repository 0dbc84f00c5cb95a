//! Explainability for ranked rows
//!
//! Short reasons attached to each result, the response envelope handed back
//! to callers and summary statistics over a ranking.

use serde::{Deserialize, Serialize};
use sheetsense_core::BusinessVocabulary;
use std::collections::{BTreeMap, BTreeSet};

use crate::query::QueryAnalysis;
use crate::rerank::RankedResult;

/// Reason used when a row shares no concept with the query
pub const SEMANTIC_REASON: &str = "semantic similarity";

// Row categories named in an explanation without a concept match
const MAX_LISTED_CATEGORIES: usize = 3;

/// One-line reason a row was returned
pub fn relevance_reason(analysis: &QueryAnalysis, matched: &BTreeSet<String>) -> String {
    if matched.is_empty() {
        return SEMANTIC_REASON.to_string();
    }
    format!(
        "Matches {} concepts from your {} query",
        join(matched.iter()),
        analysis.query_type
    )
}

/// Longer sentence naming what each matched concept means
pub fn explanation(
    vocabulary: &BusinessVocabulary,
    analysis: &QueryAnalysis,
    matched: &BTreeSet<String>,
    row_categories: &BTreeSet<String>,
) -> String {
    let label = analysis.query_type.label();

    if !matched.is_empty() {
        let described = matched.iter().map(|concept| match vocabulary.describe(concept) {
            Some(description) => format!("{} ({})", concept, description),
            None => concept.clone(),
        });
        return format!("{} query matched {}.", label, join(described));
    }

    let listed: Vec<&String> = row_categories.iter().take(MAX_LISTED_CATEGORIES).collect();
    if listed.is_empty() {
        format!("{} query ranked on semantic similarity alone.", label)
    } else {
        format!(
            "{} query ranked on semantic similarity; row covers {}.",
            label,
            join(listed.into_iter())
        )
    }
}

fn join<I, S>(items: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    items
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything a caller gets back for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query_analysis: QueryAnalysis,
    pub results: Vec<RankedResult>,
    pub total_results_found: usize,
    pub stats: RankingStats,
}

impl QueryResponse {
    /// Wrap a ranking; `candidates_count` is the number of raw hits before dedup
    pub fn new(query_analysis: QueryAnalysis, results: Vec<RankedResult>, candidates_count: usize) -> Self {
        let stats = RankingStats::compute(&results, candidates_count);
        Self {
            query_analysis,
            total_results_found: results.len(),
            results,
            stats,
        }
    }
}

/// Summary statistics for one ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingStats {
    /// Raw hits handed to the ranker
    pub candidates_count: usize,
    /// Results returned
    pub results_count: usize,
    /// Results that shared at least one concept with the query
    pub boosted_count: usize,
    /// Adjusted score of the first result
    pub best_score: f32,
    pub avg_adjusted_score: f32,
    /// Concept matched by the most results
    pub top_matched_concept: Option<String>,
}

impl RankingStats {
    /// Compute stats from sorted results
    pub fn compute(results: &[RankedResult], candidates_count: usize) -> Self {
        if results.is_empty() {
            return Self {
                candidates_count,
                results_count: 0,
                boosted_count: 0,
                best_score: 0.0,
                avg_adjusted_score: 0.0,
                top_matched_concept: None,
            };
        }

        let scores: Vec<f32> = results.iter().map(|r| r.adjusted_score).collect();
        let avg_adjusted_score = scores.iter().sum::<f32>() / scores.len() as f32;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for concept in results.iter().flat_map(|r| r.matched_concepts.iter()) {
            *counts.entry(concept.as_str()).or_default() += 1;
        }
        // Highest count, alphabetically first on ties
        let top_matched_concept = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(concept, _)| concept.to_string());

        Self {
            candidates_count,
            results_count: results.len(),
            boosted_count: results.iter().filter(|r| r.is_boosted()).count(),
            best_score: scores[0],
            avg_adjusted_score,
            top_matched_concept,
        }
    }
}
