// Metadata filters over index payloads.
//
// The engine never searches itself; a filter is the description of the
// metadata restriction a caller should push down to its vector store, and a
// reference implementation of that restriction for in-process hit lists.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::{ColumnType, IndexPayload};

pub trait Filter {
    fn matches(&self, payload: &IndexPayload) -> bool;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    /// Payload carries at least one of the categories
    AnyCategory(BTreeSet<String>),
    /// Payload carries every one of the categories
    AllCategories(BTreeSet<String>),
    /// Some column of the row has this inferred type
    HasColumnType(ColumnType),
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFilter {
    condition: FilterCondition,
}

impl CategoryFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    pub fn any_of<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(FilterCondition::AnyCategory(
            categories.into_iter().map(Into::into).collect(),
        ))
    }

    #[inline]
    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    /// Categories this filter can admit on; empty for purely negative or
    /// type-only conditions
    pub fn categories(&self) -> BTreeSet<String> {
        fn collect(condition: &FilterCondition, out: &mut BTreeSet<String>) {
            match condition {
                FilterCondition::AnyCategory(c) | FilterCondition::AllCategories(c) => {
                    out.extend(c.iter().cloned());
                }
                FilterCondition::And(conditions) | FilterCondition::Or(conditions) => {
                    conditions.iter().for_each(|c| collect(c, out));
                }
                FilterCondition::HasColumnType(_) | FilterCondition::Not(_) => {}
            }
        }

        let mut out = BTreeSet::new();
        collect(&self.condition, &mut out);
        out
    }

    fn matches_condition(condition: &FilterCondition, payload: &IndexPayload) -> bool {
        match condition {
            FilterCondition::AnyCategory(categories) => {
                categories.iter().any(|c| payload.has_category(c))
            }
            FilterCondition::AllCategories(categories) => {
                categories.iter().all(|c| payload.has_category(c))
            }
            FilterCondition::HasColumnType(column_type) => payload.has_column_type(*column_type),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, payload))
            }
            FilterCondition::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, payload))
            }
            FilterCondition::Not(condition) => !Self::matches_condition(condition, payload),
        }
    }
}

impl Filter for CategoryFilter {
    fn matches(&self, payload: &IndexPayload) -> bool {
        Self::matches_condition(&self.condition, payload)
    }
}
