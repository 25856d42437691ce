//! Design data model: alternatives, scenarios, and the full design.
//!
//! The serde shape of these types is the design artifact format:
//!
//! ```json
//! [
//!   { "scenario_id": 1,
//!     "alternatives": {
//!       "A": { "mode": "Public transit", "time": 20, "cost": 3, "reliability": 95, "co2": "low" },
//!       "B": { … },
//!       "C": { … } } },
//!   …
//! ]
//! ```

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use sp_core::{AttributeCatalog, Level, ScenarioId};

use crate::{DesignError, DesignResult};

/// Label of the alternative in slot `slot` (`0 → "A"`, `1 → "B"`, …).
///
/// Slots beyond `Z` are rejected earlier by the generator's parameter check.
pub fn alternative_label(slot: usize) -> String {
    char::from(b'A' + slot as u8).to_string()
}

// ── Alternative ───────────────────────────────────────────────────────────────

/// One concrete travel option: exactly one level per catalog attribute.
///
/// Attributes keep their insertion order (catalog order when generated), so
/// the artifact lists them as `mode, time, cost, …`.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Alternative(IndexMap<String, Level>);

impl Alternative {
    /// Build from level indices in catalog order.
    pub(crate) fn from_indices(catalog: &AttributeCatalog, indices: &[usize]) -> Self {
        let map = catalog
            .attributes()
            .iter()
            .zip(indices)
            .map(|(attr, &i)| (attr.name.clone(), attr.levels[i].clone()))
            .collect();
        Alternative(map)
    }

    pub fn get(&self, attribute: &str) -> Option<&Level> {
        self.0.get(attribute)
    }

    /// Levels in catalog order; `None` if an attribute is missing.
    pub fn key<'a>(&'a self, catalog: &AttributeCatalog) -> Option<Vec<&'a Level>> {
        catalog.names().map(|name| self.0.get(name)).collect()
    }

    /// `true` if every catalog attribute is present exactly once with one of
    /// its permitted levels, and nothing else is present.
    pub fn conforms_to(&self, catalog: &AttributeCatalog) -> bool {
        self.0.len() == catalog.len()
            && catalog.attributes().iter().all(|attr| {
                self.0.get(&attr.name).is_some_and(|level| attr.level_index(level).is_some())
            })
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// A set of alternatives presented together for a single choice.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub scenario_id:  ScenarioId,
    pub alternatives: BTreeMap<String, Alternative>,
}

impl Scenario {
    pub fn alternative(&self, label: &str) -> Option<&Alternative> {
        self.alternatives.get(label)
    }

    /// Alternatives in label order (A, B, C, …).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Alternative)> + '_ {
        self.alternatives.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.alternatives.keys().map(String::as_str)
    }

    /// `true` if two alternatives in this scenario share the full level tuple.
    pub fn has_duplicates(&self, catalog: &AttributeCatalog) -> bool {
        let mut seen = HashSet::with_capacity(self.alternatives.len());
        self.alternatives
            .values()
            .filter_map(|alt| alt.key(catalog))
            .any(|key| !seen.insert(key))
    }
}

// ── Design ────────────────────────────────────────────────────────────────────

/// The ordered, immutable sequence of scenarios shared by every respondent.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Design {
    scenarios: Vec<Scenario>,
}

impl Design {
    pub(crate) fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    #[inline]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Look up a scenario by its 1-based id.
    pub fn scenario(&self, id: ScenarioId) -> Option<&Scenario> {
        self.scenarios.get(id.index()?)
    }

    /// Alternative labels, taken from the first scenario.
    pub fn labels(&self) -> Vec<String> {
        self.scenarios
            .first()
            .map(|s| s.labels().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Check that a loaded design is usable with `catalog`:
    /// ids are `1..=N` in order, every scenario has `n_alternatives`
    /// alternatives labelled A.. and every alternative conforms to the
    /// catalog.  Duplicates within a scenario are tolerated (the generator's
    /// fallback can produce them).
    pub fn validate(&self, catalog: &AttributeCatalog, n_alternatives: usize) -> DesignResult<()> {
        if self.scenarios.is_empty() {
            return Err(DesignError::Invalid("design has no scenarios".into()));
        }
        let expected_labels: Vec<String> = (0..n_alternatives).map(alternative_label).collect();

        for (i, scenario) in self.scenarios.iter().enumerate() {
            let expected_id = ScenarioId::from_index(i);
            if scenario.scenario_id != expected_id {
                return Err(DesignError::Invalid(format!(
                    "scenario at position {} has id {}, expected {expected_id}",
                    i + 1,
                    scenario.scenario_id
                )));
            }
            if !scenario.labels().eq(expected_labels.iter().map(String::as_str)) {
                return Err(DesignError::Invalid(format!(
                    "scenario {expected_id} must have alternatives {expected_labels:?}"
                )));
            }
            if let Some((label, _)) = scenario.iter().find(|(_, alt)| !alt.conforms_to(catalog)) {
                return Err(DesignError::Invalid(format!(
                    "alternative {label} of scenario {expected_id} does not match the attribute catalog"
                )));
            }
        }
        Ok(())
    }
}
