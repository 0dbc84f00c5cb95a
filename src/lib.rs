//! # SheetSense
//!
//! Business-context understanding and ranking for spreadsheet rows.
//!
//! SheetSense sits on both sides of an external embedding store. At upload
//! time it profiles columns, turns every row into a canonical sentence and
//! tags it with business categories. At query time it reads the question
//! (intent, concepts, confidence), tells the caller how to search, and
//! reranks whatever the search returned with an explanation per row.
//!
//! ## Quick Start
//!
//! ```rust
//! use sheetsense::prelude::*;
//!
//! let engine = Engine::default();
//! let dataset = read_csv("Metric,Value\nTotal Revenue,\"$1,200,000\"\nCOGS,\"$700,000\"\n".as_bytes()).unwrap();
//!
//! // Indexing time: embed `row_text`, store `metadata()` next to it
//! let records = engine.ingest(&dataset).unwrap();
//! let payloads: Vec<IndexPayload> = records.iter().map(|r| r.payload()).collect();
//! assert_eq!(payloads[0].row_text, "Metric: Total Revenue; Value: $1,200,000");
//!
//! // Query time: search your store, then hand the hits back
//! let hits = vec![
//!     RawHit::new(payloads[1].clone(), 0.29),
//!     RawHit::new(payloads[0].clone(), 0.31),
//! ];
//! let response = engine.analyze_and_rank("What is the total revenue?", 5, hits).unwrap();
//! assert_eq!(response.results[0].row_index, 0);
//! ```
//!
//! ## Crate Structure
//!
//! - `sheetsense-core` - Data model, business vocabulary, metadata filters
//! - `sheetsense-schema` - Column profiling and row serialization
//! - `sheetsense-similarity` - Query analysis, reranking and explanations
//!
//! ## Features
//!
//! - **Column Profiling**: currency, percentage, date, numeric, categorical and text columns
//! - **Concept Tagging**: one controlled vocabulary shared by rows and queries
//! - **Query Analysis**: query type, confidence and a search strategy with a pushdown filter
//! - **Explained Reranking**: concept-overlap boost, deterministic order, per-row reasons
//! - **Search Pipeline**: async two-phase flow over any backend, with a timeout

pub mod config;
pub mod csv_source;
pub mod engine;
pub mod pipeline;

pub use config::EngineConfig;
pub use csv_source::{load_csv, read_csv};
pub use engine::Engine;
pub use pipeline::{SearchPipeline, SearchRequest, SimilaritySearch};

// Re-export component crates
pub use sheetsense_core::{
    BusinessVocabulary, CategoryFilter, Column, ColumnProfile, ColumnType, Dataset, Error,
    Filter, FilterCondition, IndexPayload, RawHit, Result, Row, RowRecord,
};
pub use sheetsense_schema::{ColumnProfiler, ProfilerConfig, RowSerializer};
pub use sheetsense_similarity::{
    AnalyzerConfig, QueryAnalysis, QueryAnalyzer, QueryResponse, QueryType, RankedResult,
    RankerConfig, RankingStats, Reranker, SearchStrategy,
};

pub mod prelude {
    pub use crate::{
        load_csv, read_csv, CategoryFilter, ColumnType, Dataset, Engine, EngineConfig, Error,
        Filter, IndexPayload, QueryAnalysis, QueryResponse, QueryType, RawHit, Result, Row,
        SearchPipeline, SearchRequest, SearchStrategy, SimilaritySearch,
    };
}
