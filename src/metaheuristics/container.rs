//! # ContainerMetaHeuristic
//!
//! Wraps one sub-heuristic and decides, per call, whether the mating and
//! mutation steps run at all.
use std::sync::Arc;

use tracing::trace;

use super::parameter::{Parameter, ParameterDefinition};
use super::{ContextExt, HeuristicId, MetaHeuristic, MetaHeuristicContext};
use crate::{
    chromosome::Chromosome,
    error::{GeneticError, Result},
    operators::{Crossover, Mutation, Reinsertion},
    selection::Selection,
};

/// Where a gate reads its probability from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ProbabilitySource {
    /// The probability handed in by the caller.
    Incoming,
    /// A fixed probability overriding the incoming one.
    Static(f32),
    /// An `f32` context parameter registered under this name, resolved per call.
    Parameter(String),
}

/// How a container interprets the probability of a step.
///
/// The probability is first resolved from its [`ProbabilitySource`]. A
/// testing strategy then runs the step only when a uniform draw in `[0, 1)`
/// falls below it and hands `1.0` to the sub-heuristic, the test being
/// spent; a non-testing strategy always runs and hands the resolved
/// probability down.
///
/// ```
/// use metaheur::metaheuristics::{ProbabilitySource, ProbabilityStrategy};
///
/// let strategy = ProbabilityStrategy::overwrite_and_test(0.3);
/// assert_eq!(strategy.source(), &ProbabilitySource::Static(0.3));
/// assert!(strategy.tests());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityStrategy {
    source: ProbabilitySource,
    test: bool,
}

impl ProbabilityStrategy {
    /// Always runs and passes the incoming probability through.
    pub fn pass_through() -> Self {
        Self {
            source: ProbabilitySource::Incoming,
            test: false,
        }
    }

    /// Runs with the incoming probability.
    pub fn test() -> Self {
        Self {
            source: ProbabilitySource::Incoming,
            test: true,
        }
    }

    /// Always runs and passes `probability` through instead of the incoming one.
    pub fn overwrite(probability: f32) -> Self {
        Self {
            source: ProbabilitySource::Static(probability),
            test: false,
        }
    }

    /// Runs with `probability` instead of the incoming one.
    pub fn overwrite_and_test(probability: f32) -> Self {
        Self {
            source: ProbabilitySource::Static(probability),
            test: true,
        }
    }

    /// Reads the probability from the context parameter `name`.
    pub fn from_parameter(name: impl Into<String>, test: bool) -> Self {
        Self {
            source: ProbabilitySource::Parameter(name.into()),
            test,
        }
    }

    pub fn source(&self) -> &ProbabilitySource {
        &self.source
    }

    pub fn tests(&self) -> bool {
        self.test
    }
}

impl Default for ProbabilityStrategy {
    fn default() -> Self {
        Self::pass_through()
    }
}

/// Evaluates a probability gate.
///
/// Returns `Ok(Some(sub_probability))` when the step should run, with the
/// probability to hand to the wrapped heuristic, and `Ok(None)` when it
/// should be skipped. `heuristic` is the identity parameter-sourced
/// probabilities are resolved for.
///
/// # Errors
///
/// Returns a configuration error if the resolved probability is outside
/// `[0, 1]`, and propagates parameter resolution failures.
pub fn should_run<C: Chromosome>(
    strategy: &ProbabilityStrategy,
    probability: f32,
    heuristic: &dyn MetaHeuristic<C>,
    ctx: &dyn MetaHeuristicContext<C>,
) -> Result<Option<f32>> {
    let resolved = match strategy.source() {
        ProbabilitySource::Incoming => probability,
        ProbabilitySource::Static(p) => *p,
        ProbabilitySource::Parameter(name) => *ctx.get_parameter_value::<f32>(heuristic, name)?,
    };

    if !(0.0..=1.0).contains(&resolved) {
        return Err(GeneticError::Configuration(format!(
            "Probability must lie in [0, 1], got {}",
            resolved
        )));
    }

    if !strategy.tests() {
        return Ok(Some(resolved));
    }

    let draw = ctx.random().gen_double();
    if draw < f64::from(resolved) {
        Ok(Some(1.0))
    } else {
        trace!(
            heuristic = %heuristic.id(),
            index = ctx.index(),
            probability = resolved,
            "gate declined"
        );
        Ok(None)
    }
}

/// # ContainerMetaHeuristic
///
/// Wraps exactly one sub-heuristic. Mating and mutation are gated by their
/// own [`ProbabilityStrategy`]; selection and reinsertion pass straight
/// through. A declined mating gate yields `Ok(None)`; a declined mutation
/// gate leaves the offspring untouched.
///
/// More specialized heuristics hold a container and forward the operations
/// they do not override to it.
#[derive(Debug)]
pub struct ContainerMetaHeuristic<C: Chromosome> {
    id: HeuristicId,
    sub_heuristic: Arc<dyn MetaHeuristic<C>>,
    crossover_probability_strategy: ProbabilityStrategy,
    mutation_probability_strategy: ProbabilityStrategy,
    parameters: Vec<Arc<dyn ParameterDefinition<C>>>,
}

impl<C: Chromosome> ContainerMetaHeuristic<C> {
    pub fn new(sub_heuristic: Arc<dyn MetaHeuristic<C>>) -> Self {
        Self {
            id: HeuristicId::next(),
            sub_heuristic,
            crossover_probability_strategy: ProbabilityStrategy::default(),
            mutation_probability_strategy: ProbabilityStrategy::default(),
            parameters: Vec::new(),
        }
    }

    pub fn with_crossover_probability_strategy(mut self, strategy: ProbabilityStrategy) -> Self {
        self.crossover_probability_strategy = strategy;
        self
    }

    pub fn with_mutation_probability_strategy(mut self, strategy: ProbabilityStrategy) -> Self {
        self.mutation_probability_strategy = strategy;
        self
    }

    /// Declares a parameter registered by [`MetaHeuristic::register_parameters`].
    pub fn with_parameter<T>(mut self, parameter: Parameter<'static, C, T>) -> Self
    where
        T: std::any::Any + Send + Sync,
    {
        self.parameters.push(Arc::new(parameter));
        self
    }

    pub fn sub_heuristic(&self) -> &Arc<dyn MetaHeuristic<C>> {
        &self.sub_heuristic
    }

    pub fn crossover_probability_strategy(&self) -> &ProbabilityStrategy {
        &self.crossover_probability_strategy
    }

    pub fn mutation_probability_strategy(&self) -> &ProbabilityStrategy {
        &self.mutation_probability_strategy
    }

    pub fn parameters(&self) -> &[Arc<dyn ParameterDefinition<C>>] {
        &self.parameters
    }

    /// Evaluates the mating gate on behalf of `heuristic`.
    pub fn gate_crossover(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
        probability: f32,
    ) -> Result<Option<f32>> {
        should_run(&self.crossover_probability_strategy, probability, heuristic, ctx)
    }

    /// Evaluates the mutation gate on behalf of `heuristic`.
    pub fn gate_mutation(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
        probability: f32,
    ) -> Result<Option<f32>> {
        should_run(&self.mutation_probability_strategy, probability, heuristic, ctx)
    }

    /// Gates on behalf of `heuristic`, then mutates through the sub-heuristic.
    pub fn mutate_for(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut C,
    ) -> Result<()> {
        match self.gate_mutation(heuristic, ctx, probability)? {
            Some(sub_probability) => {
                self.sub_heuristic
                    .mutate_chromosome(ctx, mutation, sub_probability, offspring)
            }
            None => Ok(()),
        }
    }
}

impl<C: Chromosome> MetaHeuristic<C> for ContainerMetaHeuristic<C> {
    fn id(&self) -> HeuristicId {
        self.id
    }

    fn select_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        selection: &dyn Selection<C>,
        count: usize,
    ) -> Result<Vec<Arc<C>>> {
        self.sub_heuristic.select_parents(ctx, selection, count)
    }

    fn match_parents_and_cross(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        crossover: &dyn Crossover<C>,
        probability: f32,
        parents: &[Arc<C>],
    ) -> Result<Option<Vec<Arc<C>>>> {
        match self.gate_crossover(self, ctx, probability)? {
            Some(sub_probability) => self
                .sub_heuristic
                .match_parents_and_cross(ctx, crossover, sub_probability, parents),
            None => Ok(None),
        }
    }

    fn mutate_chromosome(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut C,
    ) -> Result<()> {
        self.mutate_for(self, ctx, mutation, probability, offspring)
    }

    fn reinsert(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        reinsertion: &dyn Reinsertion<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>> {
        self.sub_heuristic.reinsert(ctx, reinsertion, offspring, parents)
    }

    fn register_parameters(&self, ctx: &dyn MetaHeuristicContext<C>) -> Result<()> {
        for parameter in &self.parameters {
            ctx.register_parameter(parameter.name(), Arc::clone(parameter));
        }
        self.sub_heuristic.register_parameters(ctx)
    }
}
