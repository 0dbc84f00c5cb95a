//! # SheetSense Schema
//!
//! Column profiling and row serialization for uploaded tables.
//!
//! ## Overview
//!
//! Before a row can be embedded it has to read like a sentence a language
//! model understands, with its business meaning spelled out next to it:
//!
//! 1. [`ColumnProfiler`] infers a semantic type per column (currency,
//!    percentage, date, numeric, categorical, text)
//! 2. [`RowSerializer`] renders each row as `column: value` fragments,
//!    formatted by type, and tags it with business categories
//! 3. The caller hands the resulting payload to its embedding and vector
//!    store of choice
//!
//! ## Example
//!
//! ```rust
//! use sheetsense_core::{BusinessVocabulary, Column, Dataset};
//! use sheetsense_schema::{ColumnProfiler, RowSerializer};
//!
//! let dataset = Dataset::new(vec![
//!     Column::new("Metric", vec!["Total Revenue".into(), "COGS".into()]),
//!     Column::new("Value", vec!["$1,200,000".into(), "$700,000".into()]),
//! ]).unwrap();
//!
//! let profiles = ColumnProfiler::default().profile(&dataset);
//! let serializer = RowSerializer::new(BusinessVocabulary::shared());
//!
//! let row = dataset.row(0).unwrap();
//! let record = serializer.serialize(0, &row, &profiles).unwrap();
//! assert_eq!(record.serialized_text, "Metric: Total Revenue; Value: $1,200,000");
//! assert!(record.business_categories.contains("revenue"));
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Dataset   │────>│  Profiler   │────>│  Profiles   │
//! │  (columns)  │     │ (type infer)│     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                        │
//!       │              ┌─────────────┐           │
//!       └─────────────>│ Serializer  │<──────────┘
//!                      │ (row→text)  │
//!                      └─────────────┘
//!                             │
//!                      ┌─────────────┐
//!                      │  RowRecord  │
//!                      │  (payload)  │
//!                      └─────────────┘
//! ```

pub mod profile;
pub mod serializer;
pub mod value;

pub use profile::{ColumnProfiler, ProfilerConfig};
pub use serializer::{format_value, RowSerializer, DEFAULT_CURRENCY_SYMBOL, FIELD_DELIMITER};
pub use value::{parse_date, parse_numeric};
