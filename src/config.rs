//! Engine configuration
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! { "analyzer": { "confidence_threshold": 0.7 }, "search_timeout_ms": 2000 }
//! ```

use serde::{Deserialize, Serialize};
use sheetsense_core::{Error, Result};
use sheetsense_schema::ProfilerConfig;
use sheetsense_similarity::{AnalyzerConfig, RankerConfig};
use std::path::Path;
use std::time::Duration;

/// Settings for every engine component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub profiler: ProfilerConfig,
    pub analyzer: AnalyzerConfig,
    pub ranker: RankerConfig,
    /// Budget for one external similarity search
    pub search_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profiler: ProfilerConfig::default(),
            analyzer: AnalyzerConfig::default(),
            ranker: RankerConfig::default(),
            search_timeout_ms: 5000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.profiler.validate()?;
        self.analyzer.validate()?;
        self.ranker.validate()?;
        if self.search_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "search_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    #[inline]
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}
