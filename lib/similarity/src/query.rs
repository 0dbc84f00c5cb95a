//! Query analysis
//!
//! Classifies a natural-language question into a [`QueryType`], extracts the
//! business concepts it mentions, scores how much evidence backs that reading
//! and picks a [`SearchStrategy`] for the similarity search that follows.
//! Classification is deterministic regex matching, no model involved.

use regex::Regex;
use serde::{Deserialize, Serialize};
use sheetsense_core::{BusinessVocabulary, CategoryFilter, Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Lowest confidence ever reported
pub const MIN_CONFIDENCE: f32 = 0.1;

const TYPE_WEIGHT: f32 = 0.3;
const EXPLICIT_PATTERN_WEIGHT: f32 = 0.1;
const COVERAGE_WEIGHT: f32 = 0.5;

// --- Pattern families, checked in this order ---

static LOOKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(where|find|locate)\b|\bshow\s+me\s+the\s+location\s+of\b").unwrap()
});

static FUNCTIONAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(sum|sums|average|averages|mean|percentage|percentages|if|lookup|vlookup|hlookup|xlookup|sumif|sumifs|countif|countifs|averageif|median|count)\b",
    )
    .unwrap()
});

static COMPARATIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(vs|versus|compare|compared|comparing|comparison)\b").unwrap());

static BUDGET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bbudget(s|ed)?\b").unwrap());

static ACTUAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bactuals?\b").unwrap());

// Words that carry no evidence either way when measuring trigger coverage
const STOPWORDS: &[&str] = &[
    "a", "all", "an", "and", "any", "are", "be", "by", "can", "data", "do", "does", "for",
    "from", "get", "give", "how", "i", "in", "is", "it", "its", "list", "many", "me", "much",
    "my", "of", "on", "or", "our", "per", "row", "rows", "show", "that", "the", "there",
    "these", "this", "those", "to", "us", "was", "we", "were", "what", "which", "who", "with",
];

/// Intent family of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Asks about a business concept ("what is our gross margin?")
    Conceptual,
    /// Asks about a calculation ("sum of expenses", "average price")
    Functional,
    /// Compares two things ("budget vs actual")
    Comparative,
    /// Asks where something is ("find the EBITDA row")
    Lookup,
    /// Nothing recognised
    Unknown,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Conceptual => "conceptual",
            QueryType::Functional => "functional",
            QueryType::Comparative => "comparative",
            QueryType::Lookup => "lookup",
            QueryType::Unknown => "unknown",
        }
    }

    /// Capitalised name for sentence starts
    pub fn label(&self) -> &'static str {
        match self {
            QueryType::Conceptual => "Conceptual",
            QueryType::Functional => "Functional",
            QueryType::Comparative => "Comparative",
            QueryType::Lookup => "Lookup",
            QueryType::Unknown => "Unknown",
        }
    }

    /// Whether the type came from an explicit wording pattern rather than
    /// from concept detection alone
    pub fn is_explicit(&self) -> bool {
        matches!(self, QueryType::Functional | QueryType::Comparative | QueryType::Lookup)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the caller should run its similarity search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Unfiltered nearest-neighbour search
    PlainSimilarity,
    /// Restrict the search to rows tagged with an extracted concept
    CategoryFilteredSimilarity,
    /// Search both filtered (broadened to related concepts) and unfiltered
    Hybrid,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::PlainSimilarity => "plain_similarity",
            SearchStrategy::CategoryFilteredSimilarity => "category_filtered_similarity",
            SearchStrategy::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured reading of one query. Created per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub original_query: String,
    pub query_type: QueryType,
    /// In `[MIN_CONFIDENCE, 1.0]`
    pub confidence: f32,
    pub extracted_concepts: BTreeSet<String>,
    pub search_strategy: SearchStrategy,
    /// Concept-group neighbours of the extracted concepts
    #[serde(default)]
    pub related_concepts: BTreeSet<String>,
    /// Synonym phrases worth embedding as extra search text
    #[serde(default)]
    pub expanded_terms: Vec<String>,
}

impl QueryAnalysis {
    /// Metadata filter matching `search_strategy`; `None` means search unfiltered
    pub fn category_filter(&self) -> Option<CategoryFilter> {
        match self.search_strategy {
            SearchStrategy::PlainSimilarity => None,
            SearchStrategy::CategoryFilteredSimilarity => {
                Some(CategoryFilter::any_of(self.extracted_concepts.iter().cloned()))
            }
            SearchStrategy::Hybrid => Some(CategoryFilter::any_of(
                self.extracted_concepts
                    .iter()
                    .chain(self.related_concepts.iter())
                    .cloned(),
            )),
        }
    }
}

/// Analyzer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Confidence above which a concept query is searched category-filtered
    pub confidence_threshold: f32,
    /// Upper bound on `QueryAnalysis::expanded_terms`
    pub max_expanded_terms: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            max_expanded_terms: 5,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidConfig(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        Ok(())
    }
}

/// Turns query strings into [`QueryAnalysis`] values
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    vocabulary: Arc<BusinessVocabulary>,
    config: AnalyzerConfig,
}

impl QueryAnalyzer {
    pub fn new(vocabulary: Arc<BusinessVocabulary>, config: AnalyzerConfig) -> Self {
        Self { vocabulary, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a query. A blank query is the caller's mistake and the only error.
    pub fn analyze(&self, query: &str) -> Result<QueryAnalysis> {
        if query.trim().is_empty() {
            return Err(Error::invalid_argument("query must not be empty"));
        }

        let tagged = self.vocabulary.analyze(query);
        let extracted_concepts = tagged.categories.clone();
        let query_type = classify_query_type(query, !extracted_concepts.is_empty());

        let (evidence, covered) = tagged
            .tokens
            .iter()
            .zip(&tagged.covered)
            .filter(|(token, _)| !STOPWORDS.contains(&token.as_str()))
            .fold((0usize, 0usize), |(total, hit), (_, covered)| {
                (total + 1, hit + usize::from(*covered))
            });
        let coverage = if evidence == 0 {
            0.0
        } else {
            covered as f32 / evidence as f32
        };
        let confidence = confidence_score(query_type, coverage);

        let search_strategy = if extracted_concepts.is_empty() {
            SearchStrategy::PlainSimilarity
        } else if confidence > self.config.confidence_threshold {
            SearchStrategy::CategoryFilteredSimilarity
        } else {
            SearchStrategy::Hybrid
        };

        let related_concepts = extracted_concepts
            .iter()
            .flat_map(|c| self.vocabulary.related(c))
            .filter(|c| !extracted_concepts.contains(c))
            .collect();
        let expanded_terms = self.expand_terms(query, &extracted_concepts);

        debug!(
            query_type = %query_type,
            confidence,
            concepts = extracted_concepts.len(),
            strategy = %search_strategy,
            "analyzed query"
        );

        Ok(QueryAnalysis {
            original_query: query.to_string(),
            query_type,
            confidence,
            extracted_concepts,
            search_strategy,
            related_concepts,
            expanded_terms,
        })
    }

    // Multi-word synonyms of the extracted concepts the query does not already use
    fn expand_terms(&self, query: &str, concepts: &BTreeSet<String>) -> Vec<String> {
        let lower = query.to_lowercase();
        concepts
            .iter()
            .flat_map(|c| self.vocabulary.triggers(c).iter())
            .filter(|t| t.contains(' ') && !lower.contains(t.as_str()))
            .take(self.config.max_expanded_terms)
            .cloned()
            .collect()
    }
}

/// First matching pattern family wins: lookup, functional, comparative, then
/// conceptual when any concept was found, else unknown
pub fn classify_query_type(query: &str, has_concepts: bool) -> QueryType {
    if LOOKUP_RE.is_match(query) {
        QueryType::Lookup
    } else if FUNCTIONAL_RE.is_match(query) {
        QueryType::Functional
    } else if COMPARATIVE_RE.is_match(query) || (BUDGET_RE.is_match(query) && ACTUAL_RE.is_match(query)) {
        QueryType::Comparative
    } else if has_concepts {
        QueryType::Conceptual
    } else {
        QueryType::Unknown
    }
}

/// Confidence from the amount of matched evidence.
///
/// `coverage` is the share of non-stopword query tokens covered by a
/// vocabulary trigger. Monotonic in every input, never below [`MIN_CONFIDENCE`].
pub fn confidence_score(query_type: QueryType, coverage: f32) -> f32 {
    let mut score = MIN_CONFIDENCE;
    if query_type != QueryType::Unknown {
        score += TYPE_WEIGHT;
    }
    if query_type.is_explicit() {
        score += EXPLICIT_PATTERN_WEIGHT;
    }
    score += COVERAGE_WEIGHT * coverage.clamp(0.0, 1.0);
    score.clamp(MIN_CONFIDENCE, 1.0)
}
