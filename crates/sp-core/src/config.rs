//! Survey configuration.
//!
//! Loaded from a TOML file by the application; every field has a default so
//! an empty file (or no file at all) yields the standard 12 × 3 survey.
//!
//! ```toml
//! seed           = 42
//! n_scenarios    = 12
//! n_alternatives = 3
//! max_attempts   = 100
//! design_path    = "design/choice_sets.json"
//! responses_path = "data/responses.csv"
//! session_idle_secs = 86400
//!
//! [[catalog.attributes]]
//! name   = "time"
//! levels = [10, 20, 35, 50]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{AttributeCatalog, CoreError, CoreResult};

/// Top-level survey configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveyConfig {
    /// Master seed for design generation.  The same seed always produces the
    /// same design.
    pub seed: u64,

    /// Number of choice scenarios each respondent answers.
    pub n_scenarios: usize,

    /// Alternatives per scenario (labelled A, B, C, …).
    pub n_alternatives: usize,

    /// Retry bound per alternative slot before the generator falls back to a
    /// random alternative.
    pub max_attempts: usize,

    /// Where the generated design artifact is stored.
    pub design_path: PathBuf,

    /// Append-only response sink.
    pub responses_path: PathBuf,

    /// In-flight sessions with no request for this long are dropped.
    pub session_idle_secs: u64,

    /// Attribute catalog.  Defaults to [`AttributeCatalog::mobility`].
    pub catalog: AttributeCatalog,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            seed:           42,
            n_scenarios:    12,
            n_alternatives: 3,
            max_attempts:   100,
            design_path:    PathBuf::from("design/choice_sets.json"),
            responses_path: PathBuf::from("data/responses.csv"),
            session_idle_secs: 24 * 60 * 60,
            catalog:        AttributeCatalog::mobility(),
        }
    }
}

impl SurveyConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(s: &str) -> CoreResult<Self> {
        let config: SurveyConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject sizes the generator or the flow cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.n_scenarios == 0 {
            return Err(CoreError::Config("n_scenarios must be at least 1".into()));
        }
        if !(1..=26).contains(&self.n_alternatives) {
            return Err(CoreError::Config(format!(
                "n_alternatives must be between 1 and 26, got {}",
                self.n_alternatives
            )));
        }
        if self.max_attempts == 0 {
            return Err(CoreError::Config("max_attempts must be at least 1".into()));
        }
        if self.session_idle_secs == 0 {
            return Err(CoreError::Config("session_idle_secs must be at least 1".into()));
        }
        Ok(())
    }
}
