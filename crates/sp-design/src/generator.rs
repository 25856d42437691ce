//! Balanced greedy design generator.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use sp_core::{AttributeCatalog, DesignRng, ScenarioId};

use crate::counter::{BalanceReport, LevelUsageCounter};
use crate::design::{Alternative, Design, Scenario, alternative_label};
use crate::{DesignError, DesignResult};

/// Builds a [`Design`] from an [`AttributeCatalog`].
///
/// Generation is a pure function of `(catalog, n_scenarios, n_alternatives,
/// seed, max_attempts)`: every random draw comes from one [`DesignRng`] in a
/// fixed order.
///
/// ```rust,ignore
/// let catalog = AttributeCatalog::mobility();
/// let design = DesignGenerator::new(&catalog).generate(12, 3, 42)?;
/// ```
pub struct DesignGenerator<'a> {
    catalog:      &'a AttributeCatalog,
    max_attempts: usize,
}

impl<'a> DesignGenerator<'a> {
    pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

    pub fn new(catalog: &'a AttributeCatalog) -> Self {
        Self { catalog, max_attempts: Self::DEFAULT_MAX_ATTEMPTS }
    }

    /// Retry bound per alternative slot before the random fallback kicks in.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn catalog(&self) -> &'a AttributeCatalog {
        self.catalog
    }

    pub fn generate(&self, n_scenarios: usize, n_alternatives: usize, seed: u64) -> DesignResult<Design> {
        self.generate_with_report(n_scenarios, n_alternatives, seed)
            .map(|(design, _)| design)
    }

    /// Generate the design and report how evenly levels ended up being used.
    pub fn generate_with_report(
        &self,
        n_scenarios:    usize,
        n_alternatives: usize,
        seed:           u64,
    ) -> DesignResult<(Design, BalanceReport)> {
        self.check_parameters(n_scenarios, n_alternatives)?;

        let mut rng = DesignRng::new(seed);
        let mut counter = LevelUsageCounter::new(self.catalog);
        let mut fallbacks = 0usize;
        let mut scenarios = Vec::with_capacity(n_scenarios);

        for s in 0..n_scenarios {
            let scenario_id = ScenarioId::from_index(s);
            let mut used: HashSet<Vec<usize>> = HashSet::with_capacity(n_alternatives);
            let mut alternatives = BTreeMap::new();

            for slot in 0..n_alternatives {
                let indices = match self.balanced_candidate(&counter, &used, &mut rng) {
                    Some(indices) => {
                        counter.record(&indices);
                        used.insert(indices.clone());
                        indices
                    }
                    None => {
                        fallbacks += 1;
                        warn!(
                            scenario = scenario_id.0,
                            slot,
                            attempts = self.max_attempts,
                            "no unused level tuple found; falling back to a random alternative"
                        );
                        self.random_candidate(&mut rng)
                    }
                };
                alternatives.insert(
                    alternative_label(slot),
                    Alternative::from_indices(self.catalog, &indices),
                );
            }

            debug!(scenario = scenario_id.0, "scenario generated");
            scenarios.push(Scenario { scenario_id, alternatives });
        }

        let report = counter.into_report(self.catalog, fallbacks);
        info!(
            seed,
            scenarios = n_scenarios,
            alternatives = n_alternatives,
            max_deviation = report.max_deviation(),
            fallbacks,
            "design generated"
        );
        Ok((Design::from_scenarios(scenarios), report))
    }

    fn check_parameters(&self, n_scenarios: usize, n_alternatives: usize) -> DesignResult<()> {
        if n_scenarios == 0 {
            return Err(DesignError::InvalidParameters("n_scenarios must be at least 1".into()));
        }
        if !(1..=26).contains(&n_alternatives) {
            return Err(DesignError::InvalidParameters(format!(
                "n_alternatives must be between 1 and 26, got {n_alternatives}"
            )));
        }
        if self.max_attempts == 0 {
            return Err(DesignError::InvalidParameters("max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Up to `max_attempts` least-used draws; the first tuple not already in
    /// `used` wins.
    fn balanced_candidate(
        &self,
        counter: &LevelUsageCounter,
        used:    &HashSet<Vec<usize>>,
        rng:     &mut DesignRng,
    ) -> Option<Vec<usize>> {
        (0..self.max_attempts)
            .map(|_| least_used_levels(counter, rng))
            .find(|indices| !used.contains(indices))
    }

    fn random_candidate(&self, rng: &mut DesignRng) -> Vec<usize> {
        self.catalog
            .attributes()
            .iter()
            .map(|a| rng.gen_range(0..a.levels.len()))
            .collect()
    }
}

/// For each attribute, the level minimising `count + U[0,1)`.
///
/// One fresh draw per level; a strictly-lower score is needed to displace the
/// current best, so the scan order only matters on exact float ties.
fn least_used_levels(counter: &LevelUsageCounter, rng: &mut DesignRng) -> Vec<usize> {
    counter
        .counts()
        .iter()
        .map(|levels| {
            let mut best = 0;
            let mut best_score = f64::INFINITY;
            for (i, &count) in levels.iter().enumerate() {
                let score = count as f64 + rng.unit();
                if score < best_score {
                    best = i;
                    best_score = score;
                }
            }
            best
        })
        .collect()
}
