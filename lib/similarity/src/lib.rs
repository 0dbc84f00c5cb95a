//! # SheetSense Similarity
//!
//! Query-side half of the SheetSense engine.
//!
//! This crate reads a natural-language question against the shared business
//! vocabulary and reorders the hits an external similarity search returned
//! for it:
//!
//! - **Query Analysis**: intent type, extracted concepts, confidence and search strategy
//! - **Concept Reranking**: distance adjusted by concept overlap, deterministic tie-breaks
//! - **Explainability**: a reason and an explanation on every result, plus ranking stats
//!
//! ## Example
//!
//! ```rust
//! use sheetsense_core::{BusinessVocabulary, IndexPayload, RawHit};
//! use sheetsense_similarity::{AnalyzerConfig, QueryAnalyzer, QueryType, RankerConfig, Reranker};
//! use std::collections::BTreeMap;
//!
//! let vocabulary = BusinessVocabulary::shared();
//! let analyzer = QueryAnalyzer::new(vocabulary.clone(), AnalyzerConfig::default());
//! let analysis = analyzer.analyze("What is the total revenue?").unwrap();
//! assert_eq!(analysis.query_type, QueryType::Conceptual);
//!
//! let hit = RawHit::new(
//!     IndexPayload {
//!         row_index: 0,
//!         row_text: "Metric: Total Revenue; Value: $1,200,000".to_string(),
//!         business_categories: ["revenue".to_string()].into(),
//!         column_types: BTreeMap::new(),
//!     },
//!     0.3,
//! );
//!
//! let reranker = Reranker::new(vocabulary, RankerConfig::default());
//! let results = reranker.rerank(&analysis, vec![hit], 5).unwrap();
//! assert_eq!(results[0].relevance_reason, "Matches revenue concepts from your conceptual query");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Query    │────>│  Analyzer   │────>│  External   │
//! │   (text)    │     │ (type, cat) │     │   Search    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            │  ┌─────────────┐  │
//!                            └─>│  Reranker   │<─┘
//!                               │ (raw hits)  │
//!                               └─────────────┘
//!                                      │
//!                               ┌─────────────┐
//!                               │  Explain    │
//!                               │  (results)  │
//!                               └─────────────┘
//! ```

pub mod explain;
pub mod query;
pub mod rerank;

pub use explain::{explanation, relevance_reason, QueryResponse, RankingStats, SEMANTIC_REASON};
pub use query::{
    classify_query_type, confidence_score, AnalyzerConfig, QueryAnalysis, QueryAnalyzer,
    QueryType, SearchStrategy, MIN_CONFIDENCE,
};
pub use rerank::{RankedResult, RankerConfig, Reranker};
