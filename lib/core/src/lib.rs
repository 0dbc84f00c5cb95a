//! # SheetSense Core
//!
//! Core library for the SheetSense business-context engine.
//!
//! This crate provides the shared data model and the one piece of state every
//! other component reads:
//!
//! - [`Dataset`] - An uploaded table held column-wise
//! - [`ColumnProfile`] / [`ColumnType`] - Inferred semantic column types
//! - [`RowRecord`] / [`IndexPayload`] / [`RawHit`] - Rows on their way into and back out of a vector index
//! - [`BusinessVocabulary`] - The controlled vocabulary of business categories
//! - [`CategoryFilter`] - Metadata filters a caller can push down to its vector store
//!
//! ## Example
//!
//! ```rust
//! use sheetsense_core::BusinessVocabulary;
//!
//! let vocabulary = BusinessVocabulary::shared();
//! let categories = vocabulary.tag("Gross profit margin by region");
//! assert!(categories.contains("margin"));
//! ```

pub mod error;
pub mod filter;
pub mod record;
pub mod vocabulary;

pub use error::{Error, Result};
pub use filter::{CategoryFilter, Filter, FilterCondition};
pub use record::{Column, ColumnProfile, ColumnType, Dataset, IndexPayload, RawHit, Row, RowRecord};
pub use vocabulary::{tokenize, BusinessVocabulary, TagResult, TriggerMatch};
