//! Business concept vocabulary
//!
//! A single immutable table mapping controlled business categories to their
//! trigger words and phrases. The same table tags rows at indexing time and
//! queries at search time, which is what lets a query concept line up with a
//! row category by plain name equality.
//!
//! Matching is whole-word: text is case-folded and split into alphanumeric
//! tokens (`%` and currency symbols stand alone), and a trigger matches when
//! its own token sequence occurs contiguously in the text.

use ahash::AHashMap;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

struct CategoryDef {
    name: &'static str,
    description: &'static str,
    triggers: &'static [&'static str],
}

const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "revenue",
        description: "top-line metric",
        triggers: &[
            "revenue", "revenues", "sales", "income", "turnover", "receipts", "top line",
            "gross sales", "net sales", "total sales", "sales revenue", "net revenue",
            "total revenue",
        ],
    },
    CategoryDef {
        name: "cost",
        description: "operational metric",
        triggers: &[
            "cost", "costs", "expense", "expenses", "expenditure", "expenditures", "overhead",
            "opex", "capex", "cogs", "spending", "spend", "outlay", "operating expense",
            "cost of goods sold",
        ],
    },
    CategoryDef {
        name: "margin",
        description: "profitability metric",
        triggers: &[
            "margin", "margins", "profit", "profits", "profitability", "gross profit",
            "net profit", "operating profit", "ebitda", "ebit", "earnings", "bottom line",
            "net income", "operating income", "gross margin", "net margin", "profit margin",
        ],
    },
    CategoryDef {
        name: "growth",
        description: "performance indicator",
        triggers: &[
            "growth", "increase", "increases", "expansion", "rise", "yoy", "qoq", "mom", "cagr",
            "change", "variance", "delta", "year over year",
        ],
    },
    CategoryDef {
        name: "efficiency",
        description: "performance metric",
        triggers: &[
            "efficiency", "productivity", "utilization", "utilisation", "roi", "roe", "roa",
            "roic", "yield", "return on investment", "return on equity", "return on assets",
        ],
    },
    CategoryDef {
        name: "ratio",
        description: "analytical metric",
        triggers: &[
            "ratio", "ratios", "percentage", "percent", "%", "rate", "rates", "proportion",
            "share",
        ],
    },
    CategoryDef {
        name: "forecast",
        description: "planning metric",
        triggers: &[
            "forecast", "forecasts", "budget", "budgets", "budgeted", "target", "targets",
            "plan", "planned", "projection", "projections", "projected", "estimate",
            "estimates", "actual", "actuals", "outlook",
        ],
    },
    CategoryDef {
        name: "liquidity",
        description: "financial position",
        triggers: &[
            "cash", "liquidity", "working capital", "cash flow", "current ratio", "quick ratio",
            "liquid assets", "cash position",
        ],
    },
    CategoryDef {
        name: "leverage",
        description: "financial position",
        triggers: &[
            "debt", "debts", "leverage", "liability", "liabilities", "borrowing", "borrowings",
            "gearing", "debt to equity", "debt ratio",
        ],
    },
    CategoryDef {
        name: "benchmark",
        description: "comparison metric",
        triggers: &[
            "benchmark", "benchmarks", "industry", "peer", "peers", "competitor", "competitors",
            "industry standard",
        ],
    },
    CategoryDef {
        name: "time_series",
        description: "time period",
        triggers: &[
            "quarter", "quarters", "quarterly", "monthly", "annual", "annually", "yearly", "year",
            "years", "ytd", "q1", "q2", "q3", "q4", "trend", "trends", "historical",
            "time series", "year to date",
        ],
    },
];

// Spreadsheet functions by the kind of calculation they signal
const FORMULA_CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "formula_aggregation",
        description: "aggregating formula",
        triggers: &["SUM", "AVERAGE", "COUNT", "COUNTA", "MAX", "MIN", "MEDIAN", "SUBTOTAL"],
    },
    CategoryDef {
        name: "formula_lookup",
        description: "lookup formula",
        triggers: &["VLOOKUP", "HLOOKUP", "XLOOKUP", "INDEX", "MATCH"],
    },
    CategoryDef {
        name: "formula_conditional",
        description: "conditional formula",
        triggers: &[
            "IF", "IFS", "IFERROR", "SUMIF", "SUMIFS", "COUNTIF", "COUNTIFS", "AVERAGEIF",
            "AVERAGEIFS",
        ],
    },
    CategoryDef {
        name: "formula_mathematical",
        description: "mathematical formula",
        triggers: &["ROUND", "ROUNDUP", "ROUNDDOWN", "ABS", "SQRT", "POWER", "LOG"],
    },
    CategoryDef {
        name: "formula_text",
        description: "text formula",
        triggers: &["CONCATENATE", "CONCAT", "TEXTJOIN", "LEFT", "RIGHT", "MID", "LEN", "TRIM"],
    },
    CategoryDef {
        name: "formula_date",
        description: "date formula",
        triggers: &["TODAY", "NOW", "YEAR", "MONTH", "DAY", "DATE", "EDATE", "EOMONTH"],
    },
    CategoryDef {
        name: "formula_ratio",
        description: "ratio calculation",
        triggers: &[],
    },
    CategoryDef {
        name: "formula_variance",
        description: "variance calculation",
        triggers: &[],
    },
];

const CONCEPT_GROUPS: &[(&str, &[&str])] = &[
    ("financial_performance", &["revenue", "cost", "margin", "efficiency"]),
    ("growth_metrics", &["growth", "forecast", "time_series"]),
    ("financial_position", &["liquidity", "leverage"]),
    ("analytical_tools", &["ratio", "benchmark"]),
];

static FORMULA_FUNCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z][A-Za-z0-9_.]*)\s*\(").unwrap());

static FORMULA_SUBTRACTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9)]\s*-\s*[A-Za-z0-9($]").unwrap());

static STANDARD: LazyLock<Arc<BusinessVocabulary>> =
    LazyLock::new(|| Arc::new(BusinessVocabulary::standard()));

/// Split text into case-folded whole-word tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            if is_symbol_token(ch) {
                tokens.push(ch.to_string());
            }
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[inline]
fn is_symbol_token(ch: char) -> bool {
    matches!(ch, '%' | '$' | '€' | '£' | '¥' | '₹')
}

#[derive(Debug, Clone)]
struct CategoryEntry {
    name: String,
    description: String,
    triggers: Vec<String>,
}

/// A single trigger occurrence found in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub category: String,
    pub trigger: String,
    /// Token offset of the first matched token
    pub position: usize,
}

/// Result of tagging one text
#[derive(Debug, Clone, Default)]
pub struct TagResult {
    pub tokens: Vec<String>,
    /// `covered[i]` is set when token `i` is part of some trigger match
    pub covered: Vec<bool>,
    pub categories: BTreeSet<String>,
    pub matches: Vec<TriggerMatch>,
}

impl TagResult {
    #[inline]
    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|c| **c).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// The controlled vocabulary of business categories
#[derive(Debug, Clone)]
pub struct BusinessVocabulary {
    categories: Vec<CategoryEntry>,
    // first token of a trigger -> (category index, full trigger tokens)
    index: AHashMap<String, Vec<(usize, Vec<String>)>>,
    formula_functions: AHashMap<String, usize>,
    groups: Vec<(String, BTreeSet<String>)>,
}

impl Default for BusinessVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

impl BusinessVocabulary {
    /// Build the standard financial vocabulary
    pub fn standard() -> Self {
        let mut categories = Vec::with_capacity(CATEGORIES.len() + FORMULA_CATEGORIES.len());
        let mut index: AHashMap<String, Vec<(usize, Vec<String>)>> = AHashMap::new();
        let mut formula_functions = AHashMap::new();

        for def in CATEGORIES {
            let id = categories.len();
            for trigger in def.triggers {
                let tokens = tokenize(trigger);
                if let Some(first) = tokens.first() {
                    index.entry(first.clone()).or_default().push((id, tokens));
                }
            }
            categories.push(CategoryEntry::from(def));
        }

        for def in FORMULA_CATEGORIES {
            let id = categories.len();
            for function in def.triggers {
                formula_functions.insert(function.to_string(), id);
            }
            categories.push(CategoryEntry::from(def));
        }

        // Longer triggers first so the recorded match is the most specific one
        for candidates in index.values_mut() {
            candidates.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));
        }

        let groups = CONCEPT_GROUPS
            .iter()
            .map(|(group, members)| {
                (group.to_string(), members.iter().map(|m| m.to_string()).collect())
            })
            .collect();

        Self {
            categories,
            index,
            formula_functions,
            groups,
        }
    }

    /// The process-wide standard vocabulary, built on first use and never mutated
    pub fn shared() -> Arc<BusinessVocabulary> {
        Arc::clone(&STANDARD)
    }

    /// Category names that can be triggered by plain text
    pub fn concept_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .filter(|c| !c.name.starts_with("formula_"))
            .map(|c| c.name.as_str())
    }

    /// Every category name in the vocabulary, formula categories included
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.name == category)
    }

    pub fn describe(&self, category: &str) -> Option<&str> {
        self.entry(category).map(|c| c.description.as_str())
    }

    pub fn triggers(&self, category: &str) -> &[String] {
        self.entry(category).map(|c| c.triggers.as_slice()).unwrap_or(&[])
    }

    fn entry(&self, category: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.name == category)
    }

    /// Categories of `text`
    pub fn tag(&self, text: &str) -> BTreeSet<String> {
        self.analyze(text).categories
    }

    /// Tag `text` and report which tokens were covered by which triggers
    pub fn analyze(&self, text: &str) -> TagResult {
        let tokens = tokenize(text);
        let mut covered = vec![false; tokens.len()];
        let mut categories = BTreeSet::new();
        let mut matches = Vec::new();

        for (position, token) in tokens.iter().enumerate() {
            let Some(candidates) = self.index.get(token) else {
                continue;
            };

            for (id, trigger) in candidates {
                if !tokens[position..].starts_with(trigger) {
                    continue;
                }
                covered[position..position + trigger.len()]
                    .iter_mut()
                    .for_each(|c| *c = true);

                let category = &self.categories[*id].name;
                categories.insert(category.clone());
                matches.push(TriggerMatch {
                    category: category.clone(),
                    trigger: trigger.join(" "),
                    position,
                });
            }
        }

        tracing::trace!(
            tokens = tokens.len(),
            categories = categories.len(),
            "tagged text"
        );

        TagResult {
            tokens,
            covered,
            categories,
            matches,
        }
    }

    /// Formula categories of a spreadsheet cell; empty unless the cell is a formula
    pub fn tag_formula(&self, cell: &str) -> BTreeSet<String> {
        let mut categories = BTreeSet::new();
        let Some(body) = cell.trim().strip_prefix('=') else {
            return categories;
        };

        for capture in FORMULA_FUNCTION_RE.captures_iter(body) {
            let function = capture[1].to_ascii_uppercase();
            if let Some(id) = self.formula_functions.get(&function) {
                categories.insert(self.categories[*id].name.clone());
            }
        }

        if body.contains('/') {
            categories.insert("formula_ratio".to_string());
        }
        if FORMULA_SUBTRACTION_RE.is_match(body) {
            categories.insert("formula_variance".to_string());
        }

        categories
    }

    /// Other members of every concept group `category` belongs to
    pub fn related(&self, category: &str) -> BTreeSet<String> {
        self.groups
            .iter()
            .filter(|(_, members)| members.contains(category))
            .flat_map(|(_, members)| members.iter())
            .filter(|m| m.as_str() != category)
            .cloned()
            .collect()
    }

    /// Name of the first concept group containing `category`
    pub fn group_of(&self, category: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, members)| members.contains(category))
            .map(|(group, _)| group.as_str())
    }
}

impl From<&CategoryDef> for CategoryEntry {
    fn from(def: &CategoryDef) -> Self {
        Self {
            name: def.name.to_string(),
            description: def.description.to_string(),
            triggers: def.triggers.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Margin %: 23%, Net-Profit"),
            vec!["margin", "%", "23", "%", "net", "profit"]
        );
        assert_eq!(tokenize("$1,200"), vec!["$", "1", "200"]);
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_single_word_triggers() {
        let vocab = BusinessVocabulary::standard();
        assert_eq!(vocab.tag("Total Revenue"), set(&["revenue"]));
        assert_eq!(vocab.tag("Operating EXPENSES"), set(&["cost"]));
        assert_eq!(vocab.tag("EBITDA"), set(&["margin"]));
    }

    #[test]
    fn test_phrase_triggers() {
        let vocab = BusinessVocabulary::standard();
        assert!(vocab.tag("Gross Profit").contains("margin"));
        assert!(vocab.tag("debt to equity").contains("leverage"));
        assert!(vocab.tag("working capital").contains("liquidity"));
        // "working" alone is not a trigger
        assert!(vocab.tag("working hours").is_empty());
    }

    #[test]
    fn test_whole_word_only() {
        let vocab = BusinessVocabulary::standard();
        // "moment" must not trigger "mom", "separate" must not trigger "rate"
        assert!(vocab.tag("a separate moment").is_empty());
        assert!(vocab.tag("planet costume").is_empty());
    }

    #[test]
    fn test_percent_symbol_tags_ratio() {
        let vocab = BusinessVocabulary::standard();
        assert_eq!(vocab.tag("Margin %: 23%"), set(&["margin", "ratio"]));
    }

    #[test]
    fn test_multiple_categories() {
        let vocab = BusinessVocabulary::standard();
        let tags = vocab.tag("Budget vs actual cash flow for Q3");
        assert_eq!(tags, set(&["forecast", "liquidity", "time_series"]));
    }

    #[test]
    fn test_analyze_reports_coverage() {
        let vocab = BusinessVocabulary::standard();
        let result = vocab.analyze("show gross profit by region");

        assert_eq!(result.tokens.len(), 5);
        // "gross profit" covers two tokens
        assert_eq!(result.covered_count(), 2);
        assert!(result
            .matches
            .iter()
            .any(|m| m.trigger == "gross profit" && m.position == 1));
    }

    #[test]
    fn test_deterministic() {
        let vocab = BusinessVocabulary::standard();
        let text = "Net revenue growth vs budget, EBITDA margin %";
        let first = vocab.tag(text);
        for _ in 0..10 {
            assert_eq!(vocab.tag(text), first);
        }
        assert_eq!(BusinessVocabulary::standard().tag(text), first);
    }

    #[test]
    fn test_every_trigger_tags_its_category() {
        let vocab = BusinessVocabulary::standard();
        let names: Vec<String> = vocab.concept_names().map(str::to_string).collect();
        for category in &names {
            for trigger in vocab.triggers(category) {
                let text = format!("figures for {} this quarter", trigger);
                assert!(
                    vocab.tag(&text).contains(category),
                    "trigger '{}' did not tag '{}'",
                    trigger,
                    category
                );
            }
        }
    }

    #[test]
    fn test_time_periods() {
        let vocab = BusinessVocabulary::standard();
        assert_eq!(vocab.tag("Q3 revenue by quarter"), set(&["revenue", "time_series"]));
        assert_eq!(vocab.tag("Monthly opex trend"), set(&["cost", "time_series"]));
        assert!(vocab.tag("YTD sales vs prior year").contains("time_series"));
        // "q5" is not a quarter
        assert!(!vocab.tag("q5 figures").contains("time_series"));
        assert_eq!(vocab.describe("time_series"), Some("time period"));
        assert_eq!(vocab.group_of("time_series"), Some("growth_metrics"));
        assert_eq!(vocab.related("growth"), set(&["forecast", "time_series"]));
    }

    #[test]
    fn test_tag_formula() {
        let vocab = BusinessVocabulary::standard();
        assert_eq!(vocab.tag_formula("=SUM(B2:B10)"), set(&["formula_aggregation"]));
        assert_eq!(
            vocab.tag_formula("=IF(C2>0, VLOOKUP(A2, Rates!A:B, 2, FALSE), 0)"),
            set(&["formula_conditional", "formula_lookup"])
        );
        assert_eq!(vocab.tag_formula("=B2/C2"), set(&["formula_ratio"]));
        assert_eq!(vocab.tag_formula("=B2-C2"), set(&["formula_variance"]));
        // Plain text and negative numbers are not formulas
        assert!(vocab.tag_formula("SUM(B2:B10)").is_empty());
        assert!(vocab.tag_formula("=-5").is_empty());
    }

    #[test]
    fn test_related_concepts() {
        let vocab = BusinessVocabulary::standard();
        assert_eq!(vocab.related("revenue"), set(&["cost", "efficiency", "margin"]));
        assert_eq!(vocab.related("liquidity"), set(&["leverage"]));
        assert!(vocab.related("unknown").is_empty());
        assert_eq!(vocab.group_of("growth"), Some("growth_metrics"));
    }

    #[test]
    fn test_descriptions_and_membership() {
        let vocab = BusinessVocabulary::shared();
        assert_eq!(vocab.describe("revenue"), Some("top-line metric"));
        assert!(vocab.contains("formula_lookup"));
        assert!(!vocab.concept_names().any(|c| c.starts_with("formula_")));
        assert_eq!(vocab.category_names().count(), CATEGORIES.len() + FORMULA_CATEGORIES.len());
    }
}
