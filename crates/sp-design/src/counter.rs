//! Level usage tracking during generation, and the balance report derived
//! from it.

use std::fmt;

use serde::Serialize;

use sp_core::{AttributeCatalog, Level};

use crate::Design;

// ── LevelUsageCounter ─────────────────────────────────────────────────────────

/// `counts[attribute][level]`: how many accepted alternatives use each level.
///
/// Only alternatives accepted by the balancing loop are counted; fallback
/// alternatives are not.
#[derive(Clone, Debug)]
pub struct LevelUsageCounter {
    counts: Vec<Vec<u32>>,
}

impl LevelUsageCounter {
    /// All-zero counter shaped like `catalog`.
    pub fn new(catalog: &AttributeCatalog) -> Self {
        let counts = catalog
            .attributes()
            .iter()
            .map(|a| vec![0; a.levels.len()])
            .collect();
        Self { counts }
    }

    /// Per-attribute level counts, in catalog order.
    #[inline]
    pub fn counts(&self) -> &[Vec<u32>] {
        &self.counts
    }

    #[inline]
    pub fn count(&self, attribute: usize, level: usize) -> u32 {
        self.counts[attribute][level]
    }

    /// Count one accepted alternative given as level indices in catalog order.
    pub fn record(&mut self, indices: &[usize]) {
        for (levels, &i) in self.counts.iter_mut().zip(indices) {
            levels[i] += 1;
        }
    }

    pub fn into_report(self, catalog: &AttributeCatalog, fallbacks: usize) -> BalanceReport {
        let attributes = catalog
            .attributes()
            .iter()
            .zip(self.counts)
            .map(|(attr, counts)| AttributeBalance {
                name:   attr.name.clone(),
                levels: attr.levels.iter().cloned().zip(counts).collect(),
            })
            .collect();
        BalanceReport { attributes, fallbacks }
    }
}

// ── BalanceReport ─────────────────────────────────────────────────────────────

/// Level frequencies of one attribute across the design.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeBalance {
    pub name:   String,
    pub levels: Vec<(Level, u32)>,
}

impl AttributeBalance {
    pub fn total(&self) -> u32 {
        self.levels.iter().map(|(_, c)| c).sum()
    }

    /// Expected count per level under perfect balance.
    pub fn mean(&self) -> f64 {
        if self.levels.is_empty() {
            return 0.0;
        }
        self.total() as f64 / self.levels.len() as f64
    }

    /// Largest absolute distance of any level count from the mean.
    pub fn max_deviation(&self) -> f64 {
        let mean = self.mean();
        self.levels
            .iter()
            .map(|&(_, c)| (c as f64 - mean).abs())
            .fold(0.0, f64::max)
    }
}

/// Post-generation summary of how evenly levels were used.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceReport {
    pub attributes: Vec<AttributeBalance>,
    /// Slots filled by the random fallback (not counted above).
    pub fallbacks:  usize,
}

impl BalanceReport {
    /// Recount a saved design.  Every alternative is counted, since the
    /// artifact does not record which slots were fallbacks.
    pub fn of_design(design: &Design, catalog: &AttributeCatalog) -> Self {
        let mut counter = LevelUsageCounter::new(catalog);
        for scenario in design.scenarios() {
            for (_, alt) in scenario.iter() {
                let indices: Option<Vec<usize>> = catalog
                    .attributes()
                    .iter()
                    .map(|attr| alt.get(&attr.name).and_then(|l| attr.level_index(l)))
                    .collect();
                if let Some(indices) = indices {
                    counter.record(&indices);
                }
            }
        }
        counter.into_report(catalog, 0)
    }

    /// Worst deviation across all attributes.
    pub fn max_deviation(&self) -> f64 {
        self.attributes
            .iter()
            .map(AttributeBalance::max_deviation)
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for BalanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for attr in &self.attributes {
            writeln!(f, "{} (mean {:.2}):", attr.name, attr.mean())?;
            for (level, count) in &attr.levels {
                writeln!(f, "  {:<28} {count}", level.to_string())?;
            }
        }
        write!(f, "max deviation {:.2}, fallbacks {}", self.max_deviation(), self.fallbacks)
    }
}
