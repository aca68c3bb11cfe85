//! # MatchOptions
//!
//! Configuration of a [`MatchMetaHeuristic`](super::MatchMetaHeuristic):
//! how many matches are produced per call, which technique picks each
//! additional parent, the caching scope of the roulette wheel and the
//! probability strategies of the mating and mutation gates.
//!
//! ## Example
//!
//! ```rust
//! use metaheur::caching::Scope;
//! use metaheur::metaheuristics::{MatchOptions, MatchingTechnique, ProbabilityStrategy};
//!
//! let options = MatchOptions::builder()
//!     .number_of_matches(2)
//!     .matching_techniques(vec![MatchingTechnique::Randomize])
//!     .roulette_caching_scope(Scope::GENERATION | Scope::INDIVIDUAL)
//!     .crossover_probability_strategy(ProbabilityStrategy::test())
//!     .build();
//!
//! assert_eq!(options.number_of_matches(), 2);
//! assert!(options.crossover_probability_strategy().tests());
//!
//! let default_options = MatchOptions::default();
//! assert_eq!(default_options.number_of_matches(), 1);
//! ```

use super::container::ProbabilityStrategy;
use super::matching::MatchingTechnique;
use crate::caching::Scope;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOptions {
    number_of_matches: usize,
    matching_techniques: Vec<MatchingTechnique>,
    roulette_caching_scope: Scope,
    crossover_probability_strategy: ProbabilityStrategy,
    mutation_probability_strategy: ProbabilityStrategy,
}

impl MatchOptions {
    pub fn new(number_of_matches: usize, matching_techniques: Vec<MatchingTechnique>) -> Self {
        Self {
            number_of_matches,
            matching_techniques,
            ..Self::default()
        }
    }

    pub fn number_of_matches(&self) -> usize {
        self.number_of_matches
    }

    pub fn matching_techniques(&self) -> &[MatchingTechnique] {
        &self.matching_techniques
    }

    pub fn roulette_caching_scope(&self) -> Scope {
        self.roulette_caching_scope
    }

    pub fn crossover_probability_strategy(&self) -> &ProbabilityStrategy {
        &self.crossover_probability_strategy
    }

    pub fn mutation_probability_strategy(&self) -> &ProbabilityStrategy {
        &self.mutation_probability_strategy
    }

    /// Sets the number of matches.
    pub fn set_number_of_matches(&mut self, number_of_matches: usize) {
        self.number_of_matches = number_of_matches;
    }

    /// Sets the matching techniques.
    pub fn set_matching_techniques(&mut self, techniques: Vec<MatchingTechnique>) {
        self.matching_techniques = techniques;
    }

    pub fn set_roulette_caching_scope(&mut self, scope: Scope) {
        self.roulette_caching_scope = scope;
    }

    pub fn set_crossover_probability_strategy(&mut self, strategy: ProbabilityStrategy) {
        self.crossover_probability_strategy = strategy;
    }

    pub fn set_mutation_probability_strategy(&mut self, strategy: ProbabilityStrategy) {
        self.mutation_probability_strategy = strategy;
    }

    /// Returns a builder for creating a `MatchOptions` instance.
    pub fn builder() -> MatchOptionsBuilder {
        MatchOptionsBuilder::default()
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            number_of_matches: 1,
            matching_techniques: Vec::new(),
            roulette_caching_scope: Scope::GENERATION | Scope::META_HEURISTIC,
            crossover_probability_strategy: ProbabilityStrategy::default(),
            mutation_probability_strategy: ProbabilityStrategy::default(),
        }
    }
}

/// Builder for `MatchOptions`.
///
/// Unset fields take the values of [`MatchOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct MatchOptionsBuilder {
    number_of_matches: Option<usize>,
    matching_techniques: Option<Vec<MatchingTechnique>>,
    roulette_caching_scope: Option<Scope>,
    crossover_probability_strategy: Option<ProbabilityStrategy>,
    mutation_probability_strategy: Option<ProbabilityStrategy>,
}

impl MatchOptionsBuilder {
    /// Sets the number of matches.
    pub fn number_of_matches(mut self, value: usize) -> Self {
        self.number_of_matches = Some(value);
        self
    }

    /// Sets the matching techniques, one per additional parent.
    pub fn matching_techniques(mut self, value: Vec<MatchingTechnique>) -> Self {
        self.matching_techniques = Some(value);
        self
    }

    /// Adds one matching technique.
    pub fn matching_technique(mut self, value: MatchingTechnique) -> Self {
        self.matching_techniques.get_or_insert_with(Vec::new).push(value);
        self
    }

    /// Sets the caching scope of the roulette wheel.
    pub fn roulette_caching_scope(mut self, value: Scope) -> Self {
        self.roulette_caching_scope = Some(value);
        self
    }

    pub fn crossover_probability_strategy(mut self, value: ProbabilityStrategy) -> Self {
        self.crossover_probability_strategy = Some(value);
        self
    }

    pub fn mutation_probability_strategy(mut self, value: ProbabilityStrategy) -> Self {
        self.mutation_probability_strategy = Some(value);
        self
    }

    /// Builds the `MatchOptions` instance.
    pub fn build(self) -> MatchOptions {
        let defaults = MatchOptions::default();
        MatchOptions {
            number_of_matches: self.number_of_matches.unwrap_or(defaults.number_of_matches),
            matching_techniques: self
                .matching_techniques
                .unwrap_or(defaults.matching_techniques),
            roulette_caching_scope: self
                .roulette_caching_scope
                .unwrap_or(defaults.roulette_caching_scope),
            crossover_probability_strategy: self
                .crossover_probability_strategy
                .unwrap_or(defaults.crossover_probability_strategy),
            mutation_probability_strategy: self
                .mutation_probability_strategy
                .unwrap_or(defaults.mutation_probability_strategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = MatchOptions::builder().build();
        assert_eq!(options, MatchOptions::default());
        assert_eq!(
            options.roulette_caching_scope(),
            Scope::GENERATION | Scope::META_HEURISTIC
        );
        assert_eq!(
            options.crossover_probability_strategy(),
            &ProbabilityStrategy::pass_through()
        );
    }

    #[test]
    fn test_builder_collects_techniques() {
        let options = MatchOptions::builder()
            .matching_technique(MatchingTechnique::Neighbor)
            .matching_technique(MatchingTechnique::Best)
            .build();
        assert_eq!(
            options.matching_techniques(),
            &[MatchingTechnique::Neighbor, MatchingTechnique::Best]
        );
    }

    #[test]
    fn test_setters() {
        let mut options = MatchOptions::new(3, vec![MatchingTechnique::RouletteWheel]);
        options.set_number_of_matches(4);
        options.set_roulette_caching_scope(Scope::GENERATION | Scope::INDIVIDUAL);
        options.set_mutation_probability_strategy(ProbabilityStrategy::overwrite_and_test(0.1));

        assert_eq!(options.number_of_matches(), 4);
        assert!(options.roulette_caching_scope().per_individual());
        assert!(options.mutation_probability_strategy().tests());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let options = MatchOptions::builder()
            .number_of_matches(2)
            .matching_technique(MatchingTechnique::RouletteWheel)
            .crossover_probability_strategy(ProbabilityStrategy::from_parameter("rate", true))
            .build();
        let json = serde_json::to_string(&options).unwrap();
        let back: MatchOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
