//! # MatchMetaHeuristic
//!
//! Assembles sets of mating parents with configurable matching techniques
//! and hands each set to the wrapped heuristic's crossover step.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::trace;

use super::container::{ContainerMetaHeuristic, ProbabilityStrategy};
use super::options::MatchOptions;
use super::parameter::Parameter;
use super::{HeuristicId, MetaHeuristic, MetaHeuristicContext};
use crate::{
    caching::Scope,
    chromosome::Chromosome,
    error::{GeneticError, OptionExt, Result},
    operators::{Crossover, Mutation, Reinsertion},
    selection::{RouletteWheel, Selection},
};

/// Name of the cached roulette wheel parameter.
pub const ROULETTE_WHEEL_PARAMETER: &str = "currentRouletteWheel";

/// How one additional parent of a match is picked.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingTechnique {
    /// The parent `p` places after the match's first parent, where `p` is the
    /// technique's position in the match; omitted when out of range.
    Neighbor,
    /// A uniformly random parent of the pool.
    Randomize,
    /// A fitness-proportionate draw over the pool.
    RouletteWheel,
    /// The best chromosome of the population.
    Best,
}

impl fmt::Display for MatchingTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchingTechnique::Neighbor => "Neighbor",
            MatchingTechnique::Randomize => "Randomize",
            MatchingTechnique::RouletteWheel => "RouletteWheel",
            MatchingTechnique::Best => "Best",
        };
        f.write_str(name)
    }
}

impl FromStr for MatchingTechnique {
    type Err = GeneticError;

    /// Parses a technique name, ignoring case.
    ///
    /// ```
    /// use metaheur::metaheuristics::MatchingTechnique;
    ///
    /// assert_eq!("roulette_wheel".parse::<MatchingTechnique>().unwrap(), MatchingTechnique::RouletteWheel);
    /// assert!("Tournament".parse::<MatchingTechnique>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "neighbor" | "neighbour" => Ok(MatchingTechnique::Neighbor),
            "randomize" | "random" => Ok(MatchingTechnique::Randomize),
            "roulettewheel" | "roulette" => Ok(MatchingTechnique::RouletteWheel),
            "best" => Ok(MatchingTechnique::Best),
            _ => Err(GeneticError::Configuration(format!(
                "Unknown matching technique: {}",
                s
            ))),
        }
    }
}

/// # MatchMetaHeuristic
///
/// Produces `number_of_matches` parent sets per call. The first parent of
/// match `m` is `parents[first]` with `first = (index + m) % len`, where
/// `index` is the context's individual; every further parent comes from one
/// matching technique, in order, until the crossover arity is reached. A
/// [`MatchingTechnique::Neighbor`] at position `p` takes `parents[first + p]`,
/// relative to the match's first parent rather than to `index`. Each set is
/// crossed by the wrapped heuristic under `ctx.get_individual(0)`, and the
/// offspring of all matches are concatenated.
///
/// The roulette wheel is cached as the parameter
/// [`ROULETTE_WHEEL_PARAMETER`] under `roulette_caching_scope`, by default
/// one wheel per generation and heuristic instance. It is built from the
/// parent pool of the first request under its key.
///
/// Selection, mutation and reinsertion are those of the inner
/// [`ContainerMetaHeuristic`].
#[derive(Debug)]
pub struct MatchMetaHeuristic<C: Chromosome> {
    container: ContainerMetaHeuristic<C>,
    number_of_matches: usize,
    matching_techniques: Vec<MatchingTechnique>,
    roulette_caching_scope: Scope,
}

impl<C: Chromosome> MatchMetaHeuristic<C> {
    pub fn new(sub_heuristic: Arc<dyn MetaHeuristic<C>>, number_of_matches: usize) -> Self {
        Self {
            container: ContainerMetaHeuristic::new(sub_heuristic),
            number_of_matches,
            matching_techniques: Vec::new(),
            roulette_caching_scope: Scope::GENERATION | Scope::META_HEURISTIC,
        }
    }

    /// Builds the heuristic from validated options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no match is requested.
    pub fn from_options(sub_heuristic: Arc<dyn MetaHeuristic<C>>, options: MatchOptions) -> Result<Self> {
        if options.number_of_matches() == 0 {
            return Err(GeneticError::Configuration(
                "Number of matches must be at least 1".to_string(),
            ));
        }

        Ok(Self::new(sub_heuristic, options.number_of_matches())
            .with_matching_techniques(options.matching_techniques().to_vec())
            .with_roulette_caching_scope(options.roulette_caching_scope())
            .with_crossover_probability_strategy(options.crossover_probability_strategy().clone())
            .with_mutation_probability_strategy(options.mutation_probability_strategy().clone()))
    }

    pub fn with_matching_techniques(mut self, techniques: Vec<MatchingTechnique>) -> Self {
        self.matching_techniques = techniques;
        self
    }

    pub fn with_roulette_caching_scope(mut self, scope: Scope) -> Self {
        self.roulette_caching_scope = scope;
        self
    }

    pub fn with_crossover_probability_strategy(mut self, strategy: ProbabilityStrategy) -> Self {
        self.container = self.container.with_crossover_probability_strategy(strategy);
        self
    }

    pub fn with_mutation_probability_strategy(mut self, strategy: ProbabilityStrategy) -> Self {
        self.container = self.container.with_mutation_probability_strategy(strategy);
        self
    }

    pub fn with_parameter<T>(mut self, parameter: Parameter<'static, C, T>) -> Self
    where
        T: std::any::Any + Send + Sync,
    {
        self.container = self.container.with_parameter(parameter);
        self
    }

    pub fn container(&self) -> &ContainerMetaHeuristic<C> {
        &self.container
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

    /// Assembles the parent set of one match.
    fn match_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        parents: &[Arc<C>],
        first: usize,
        arity: usize,
    ) -> Result<Vec<Arc<C>>> {
        let mut matched = Vec::with_capacity(arity);
        matched.push(Arc::clone(&parents[first]));

        for (i, technique) in self.matching_techniques.iter().take(arity - 1).enumerate() {
            let position = i + 1;
            match technique {
                MatchingTechnique::Neighbor => match parents.get(first + position) {
                    Some(neighbor) => matched.push(Arc::clone(neighbor)),
                    None => trace!(
                        first,
                        position,
                        pool = parents.len(),
                        "neighbor out of range, omitting position"
                    ),
                },
                MatchingTechnique::Randomize => {
                    let picked = ctx.random().gen_int(0, parents.len())?;
                    matched.push(Arc::clone(&parents[picked]));
                }
                MatchingTechnique::RouletteWheel => {
                    let parameter: Parameter<'_, C, RouletteWheel> = Parameter::new(
                        ROULETTE_WHEEL_PARAMETER,
                        self.roulette_caching_scope,
                        |_, _| RouletteWheel::from_chromosomes(parents),
                    );
                    let wheel = parameter.get_or_add(self, ctx)?;
                    let picked = wheel.spin(ctx.random());
                    let chosen = parents.get(picked).ok_or_else_genetic(|| {
                        GeneticError::Configuration(format!(
                            "Cached roulette wheel of {} slots does not fit a pool of {} parents",
                            wheel.len(),
                            parents.len()
                        ))
                    })?;
                    matched.push(Arc::clone(chosen));
                }
                MatchingTechnique::Best => {
                    matched.push(ctx.population().require_best_chromosome()?);
                }
            }
        }

        Ok(matched)
    }
}

impl<C: Chromosome> MetaHeuristic<C> for MatchMetaHeuristic<C> {
    fn id(&self) -> HeuristicId {
        self.container.id()
    }

    fn select_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        selection: &dyn Selection<C>,
        count: usize,
    ) -> Result<Vec<Arc<C>>> {
        self.container.select_parents(ctx, selection, count)
    }

    fn match_parents_and_cross(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        crossover: &dyn Crossover<C>,
        probability: f32,
        parents: &[Arc<C>],
    ) -> Result<Option<Vec<Arc<C>>>> {
        let sub_probability = match self.container.gate_crossover(self, ctx, probability)? {
            Some(p) => p,
            None => return Ok(None),
        };

        let arity = crossover.parents_number();
        if arity == 0 {
            return Err(GeneticError::Configuration(
                "Crossover must require at least one parent".to_string(),
            ));
        }
        if self.matching_techniques.len() < arity - 1 {
            return Err(GeneticError::Configuration(format!(
                "Crossover requires {} parents but only {} matching techniques are configured",
                arity,
                self.matching_techniques.len()
            )));
        }
        if parents.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let sub_heuristic = self.container.sub_heuristic();
        let mut offspring = Vec::new();
        for m in 0..self.number_of_matches {
            let first = (ctx.index() + m) % parents.len();
            let matched = self.match_parents(ctx, parents, first, arity)?;
            trace!(
                index = ctx.index(),
                matched = matched.len(),
                arity,
                "crossing match {}",
                m
            );

            if let Some(children) = sub_heuristic.match_parents_and_cross(
                &ctx.get_individual(0),
                crossover,
                sub_probability,
                &matched,
            )? {
                offspring.extend(children);
            }
        }

        Ok(Some(offspring))
    }

    fn mutate_chromosome(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut C,
    ) -> Result<()> {
        self.container
            .mutate_for(self, ctx, mutation, probability, offspring)
    }

    fn reinsert(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        reinsertion: &dyn Reinsertion<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>> {
        self.container.reinsert(ctx, reinsertion, offspring, parents)
    }

    fn register_parameters(&self, ctx: &dyn MetaHeuristicContext<C>) -> Result<()> {
        self.container.register_parameters(ctx)
    }
}
