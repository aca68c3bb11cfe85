//! # MetaHeuristicsFactory
//!
//! Shortcuts that wire the primitives into ready-made compounds.
//!
//! ## Example
//!
//! ```rust
//! use metaheur::chromosome::Chromosome;
//! use metaheur::metaheuristics::MetaHeuristicsFactory;
//!
//! #[derive(Clone, Debug)]
//! struct Value(f64);
//!
//! impl Chromosome for Value {
//!     fn fitness(&self) -> Option<f64> {
//!         Some(self.0)
//!     }
//! }
//!
//! let leaf = MetaHeuristicsFactory::default_heuristic::<Value>();
//! let pipeline = MetaHeuristicsFactory::random_matching(leaf, 2);
//! assert_eq!(pipeline.number_of_matches(), 2);
//! ```

use std::sync::Arc;

use tracing::debug;

use super::container::{ContainerMetaHeuristic, ProbabilityStrategy};
use super::default::DefaultMetaHeuristic;
use super::matching::{MatchMetaHeuristic, MatchingTechnique};
use super::options::MatchOptions;
use super::MetaHeuristic;
use crate::caching::Scope;
use crate::chromosome::Chromosome;
use crate::error::Result;

/// Assembles common heuristic compositions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaHeuristicsFactory;

impl MetaHeuristicsFactory {
    /// The plain leaf heuristic.
    pub fn default_heuristic<C: Chromosome>() -> Arc<dyn MetaHeuristic<C>> {
        Arc::new(DefaultMetaHeuristic::new())
    }

    /// Gates mating and mutation of `sub_heuristic` with the given strategies.
    pub fn gated<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        crossover: ProbabilityStrategy,
        mutation: ProbabilityStrategy,
    ) -> ContainerMetaHeuristic<C> {
        ContainerMetaHeuristic::new(sub_heuristic)
            .with_crossover_probability_strategy(crossover)
            .with_mutation_probability_strategy(mutation)
    }

    /// Matches parents with `techniques`, in order, `number_of_matches` times.
    pub fn matching<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        techniques: Vec<MatchingTechnique>,
        number_of_matches: usize,
    ) -> MatchMetaHeuristic<C> {
        MatchMetaHeuristic::new(sub_heuristic, number_of_matches).with_matching_techniques(techniques)
    }

    /// Pairs the individual with a uniformly random partner.
    pub fn random_matching<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        number_of_matches: usize,
    ) -> MatchMetaHeuristic<C> {
        Self::matching(sub_heuristic, vec![MatchingTechnique::Randomize], number_of_matches)
    }

    /// Pairs the individual with the next one in the pool.
    pub fn neighbor_matching<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        number_of_matches: usize,
    ) -> MatchMetaHeuristic<C> {
        Self::matching(sub_heuristic, vec![MatchingTechnique::Neighbor], number_of_matches)
    }

    /// Pairs the individual with a fitness-proportionate partner, the wheel
    /// being cached under `scope`.
    pub fn roulette_matching<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        number_of_matches: usize,
        scope: Scope,
    ) -> MatchMetaHeuristic<C> {
        Self::matching(sub_heuristic, vec![MatchingTechnique::RouletteWheel], number_of_matches)
            .with_roulette_caching_scope(scope)
    }

    /// Pairs the individual with the best chromosome of the population.
    pub fn best_matching<C: Chromosome>(
        sub_heuristic: Arc<dyn MetaHeuristic<C>>,
        number_of_matches: usize,
    ) -> MatchMetaHeuristic<C> {
        Self::matching(sub_heuristic, vec![MatchingTechnique::Best], number_of_matches)
    }

    /// Builds a matching heuristic from `options` on top of `sub_heuristic`,
    /// or on top of a fresh leaf when `None`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the options request no match.
    pub fn matched_pipeline<C: Chromosome>(
        options: MatchOptions,
        sub_heuristic: Option<Arc<dyn MetaHeuristic<C>>>,
    ) -> Result<Arc<dyn MetaHeuristic<C>>> {
        debug!(
            matches = options.number_of_matches(),
            techniques = ?options.matching_techniques(),
            "assembling matched pipeline"
        );
        let sub_heuristic = sub_heuristic.unwrap_or_else(Self::default_heuristic);
        Ok(Arc::new(MatchMetaHeuristic::from_options(sub_heuristic, options)?))
    }
}
