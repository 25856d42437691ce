//! Attribute catalog: every attribute describing an alternative and its
//! discrete level set.
//!
//! The catalog is immutable once built and shared read-only by the generator,
//! the recorder (for column names), and design validation.  Attribute order
//! is significant: it fixes the level-tuple order used for uniqueness checks
//! and the per-alternative column order in the sink.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── Level ─────────────────────────────────────────────────────────────────────

/// One permissible value of an attribute.
///
/// Serialized untagged so the design artifact carries bare JSON numbers for
/// numeric levels and bare strings for categorical ones.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Int(i64),
    Label(String),
}

impl Level {
    pub fn label(s: impl Into<String>) -> Self {
        Level::Label(s.into())
    }
}

impl From<i64> for Level {
    fn from(v: i64) -> Self {
        Level::Int(v)
    }
}

impl From<&str> for Level {
    fn from(s: &str) -> Self {
        Level::Label(s.to_owned())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Int(v)   => write!(f, "{v}"),
            Level::Label(s) => f.write_str(s),
        }
    }
}

// ── Attribute ─────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Attribute {
    pub name:   String,
    pub levels: Vec<Level>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, levels: impl IntoIterator<Item = Level>) -> Self {
        Self { name: name.into(), levels: levels.into_iter().collect() }
    }

    /// Position of `level` in this attribute's level set.
    pub fn level_index(&self, level: &Level) -> Option<usize> {
        self.levels.iter().position(|l| l == level)
    }
}

// ── AttributeCatalog ──────────────────────────────────────────────────────────

/// Ordered attribute → level-set lookup table.
///
/// Construct with [`AttributeCatalog::new`] (validated) or use the built-in
/// [`AttributeCatalog::mobility`] catalog.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct AttributeCatalog {
    attributes: Vec<Attribute>,
}

impl AttributeCatalog {
    /// Validate and build a catalog.
    ///
    /// Rejects an empty attribute list, empty or duplicate attribute names,
    /// attributes without levels, and duplicate levels within one attribute.
    pub fn new(attributes: Vec<Attribute>) -> CoreResult<Self> {
        if attributes.is_empty() {
            return Err(CoreError::Catalog("catalog has no attributes".into()));
        }

        let mut names = HashSet::with_capacity(attributes.len());
        for attr in &attributes {
            if attr.name.trim().is_empty() {
                return Err(CoreError::Catalog("attribute name must not be empty".into()));
            }
            if !names.insert(attr.name.as_str()) {
                return Err(CoreError::Catalog(format!("duplicate attribute {:?}", attr.name)));
            }
            if attr.levels.is_empty() {
                return Err(CoreError::Catalog(format!("attribute {:?} has no levels", attr.name)));
            }
            let mut seen = HashSet::with_capacity(attr.levels.len());
            for level in &attr.levels {
                if !seen.insert(level) {
                    return Err(CoreError::Catalog(format!(
                        "attribute {:?} lists level {level} more than once",
                        attr.name
                    )));
                }
            }
        }

        Ok(Self { attributes })
    }

    /// The travel-mode catalog used by the survey: four levels per attribute.
    pub fn mobility() -> Self {
        Self {
            attributes: vec![
                Attribute::new("mode", [
                    Level::label("Car (private)"),
                    Level::label("Public transit"),
                    Level::label("Bike / e-bike"),
                    Level::label("Autonomous ridesharing"),
                ]),
                // minutes
                Attribute::new("time", [10, 20, 35, 50].map(Level::Int)),
                // euro
                Attribute::new("cost", [1, 3, 6, 10].map(Level::Int)),
                // percent on time
                Attribute::new("reliability", [70, 85, 95, 99].map(Level::Int)),
                Attribute::new("co2", [
                    Level::label("high"),
                    Level::label("medium"),
                    Level::label("low"),
                    Level::label("zero emissions"),
                ]),
            ],
        }
    }

    #[inline]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    /// Number of distinct level tuples the catalog can express.
    /// Saturates at `u64::MAX`.
    pub fn tuple_space(&self) -> u64 {
        self.attributes
            .iter()
            .fold(1u64, |acc, a| acc.saturating_mul(a.levels.len() as u64))
    }
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self::mobility()
    }
}

impl<'de> Deserialize<'de> for AttributeCatalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            attributes: Vec<Attribute>,
        }

        let raw = Raw::deserialize(deserializer)?;
        AttributeCatalog::new(raw.attributes).map_err(serde::de::Error::custom)
    }
}
