//! # GenerationDispatcher
//!
//! Runs the stages of one generation through a heuristic, individual by
//! individual. In sequential mode the population context is reused for every
//! individual and its index is moved along; in parallel mode every rayon
//! task works through its own [`IndividualContext`](crate::metaheuristics::IndividualContext)
//! bound to the same population context.
//!
//! The dispatcher sets the stage on the context before each stage, and every
//! stage call returns only after all individuals are done, so installing the
//! next population afterwards never races with a running task.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::{options::DispatchOptions, EvolutionStage};
use crate::{
    chromosome::Chromosome,
    error::Result,
    metaheuristics::{EvolutionContext, MetaHeuristic, MetaHeuristicContext},
    operators::{Crossover, Mutation, Reinsertion},
    selection::Selection,
};

#[derive(Debug, Clone)]
pub struct GenerationDispatcher<C: Chromosome> {
    heuristic: Arc<dyn MetaHeuristic<C>>,
    options: DispatchOptions,
}

impl<C: Chromosome> GenerationDispatcher<C> {
    pub fn new(heuristic: Arc<dyn MetaHeuristic<C>>, options: DispatchOptions) -> Self {
        Self { heuristic, options }
    }

    pub fn heuristic(&self) -> &Arc<dyn MetaHeuristic<C>> {
        &self.heuristic
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    /// Registers the parameters of the heuristic tree into `ctx`.
    pub fn register_parameters(&self, ctx: &EvolutionContext<C>) -> Result<()> {
        self.heuristic.register_parameters(ctx)
    }

    /// Selects `count` parents through the population context.
    pub fn select(
        &self,
        ctx: &EvolutionContext<C>,
        selection: &dyn Selection<C>,
        count: usize,
    ) -> Result<Vec<Arc<C>>> {
        ctx.set_current_stage(EvolutionStage::Selection);
        ctx.set_index(0);
        self.heuristic.select_parents(ctx, selection, count)
    }

    /// Runs the mating step once per group of `parents_number` parents.
    ///
    /// Individual `i` is the one at `i * parents_number`. Offspring are
    /// returned in individual order; declined steps contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the heuristic.
    pub fn cross(
        &self,
        ctx: &EvolutionContext<C>,
        crossover: &dyn Crossover<C>,
        probability: f32,
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>> {
        ctx.set_current_stage(EvolutionStage::Crossover);
        let step = crossover.parents_number().max(1);
        let indices: Vec<usize> = (0..parents.len()).step_by(step).collect();

        let results: Vec<Option<Vec<Arc<C>>>> = if self.options.use_parallel(indices.len()) {
            debug!(individuals = indices.len(), "parallel crossover dispatch");
            indices
                .par_iter()
                .map(|&index| {
                    self.heuristic.match_parents_and_cross(
                        &ctx.get_individual(index),
                        crossover,
                        probability,
                        parents,
                    )
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            debug!(individuals = indices.len(), "sequential crossover dispatch");
            let mut results = Vec::with_capacity(indices.len());
            for &index in &indices {
                ctx.set_index(index);
                results.push(self.heuristic.match_parents_and_cross(
                    ctx,
                    crossover,
                    probability,
                    parents,
                )?);
            }
            results
        };

        Ok(results.into_iter().flatten().flatten().collect())
    }

    /// Mutates every offspring, individual `i` being `offspring[i]`.
    ///
    /// Offspring shared with another owner are cloned before being mutated.
    pub fn mutate(
        &self,
        ctx: &EvolutionContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut [Arc<C>],
    ) -> Result<()> {
        ctx.set_current_stage(EvolutionStage::Mutation);

        if self.options.use_parallel(offspring.len()) {
            debug!(individuals = offspring.len(), "parallel mutation dispatch");
            offspring
                .par_iter_mut()
                .enumerate()
                .try_for_each(|(index, chromosome)| {
                    self.heuristic.mutate_chromosome(
                        &ctx.get_individual(index),
                        mutation,
                        probability,
                        Arc::make_mut(chromosome),
                    )
                })
        } else {
            debug!(individuals = offspring.len(), "sequential mutation dispatch");
            for (index, chromosome) in offspring.iter_mut().enumerate() {
                ctx.set_index(index);
                self.heuristic.mutate_chromosome(
                    ctx,
                    mutation,
                    probability,
                    Arc::make_mut(chromosome),
                )?;
            }
            Ok(())
        }
    }

    /// Chooses the chromosomes of the next generation.
    pub fn reinsert(
        &self,
        ctx: &EvolutionContext<C>,
        reinsertion: &dyn Reinsertion<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>> {
        ctx.set_current_stage(EvolutionStage::Reinsertion);
        ctx.set_index(0);
        self.heuristic.reinsert(ctx, reinsertion, offspring, parents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metaheuristics::HeuristicId;
    use crate::population::Population;
    use crate::rng::{Randomization, SeededRandomization};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Debug, PartialEq)]
    struct Value(f64);

    impl Chromosome for Value {
        fn fitness(&self) -> Option<f64> {
            Some(self.0)
        }
    }

    /// Produces one child per call carrying the individual index and stage.
    #[derive(Debug)]
    struct IndexEcho {
        id: HeuristicId,
        mutations: AtomicUsize,
    }

    impl IndexEcho {
        fn new() -> Self {
            Self {
                id: HeuristicId::next(),
                mutations: AtomicUsize::new(0),
            }
        }
    }

    impl MetaHeuristic<Value> for IndexEcho {
        fn id(&self) -> HeuristicId {
            self.id
        }

        fn select_parents(
            &self,
            ctx: &dyn MetaHeuristicContext<Value>,
            _selection: &dyn Selection<Value>,
            count: usize,
        ) -> Result<Vec<Arc<Value>>> {
            assert_eq!(ctx.current_stage(), EvolutionStage::Selection);
            Ok(ctx.population().chromosomes().iter().take(count).cloned().collect())
        }

        fn match_parents_and_cross(
            &self,
            ctx: &dyn MetaHeuristicContext<Value>,
            _crossover: &dyn Crossover<Value>,
            _probability: f32,
            _parents: &[Arc<Value>],
        ) -> Result<Option<Vec<Arc<Value>>>> {
            assert_eq!(ctx.current_stage(), EvolutionStage::Crossover);
            if ctx.index() % 4 == 0 {
                return Ok(None);
            }
            Ok(Some(vec![Arc::new(Value(ctx.index() as f64))]))
        }

        fn mutate_chromosome(
            &self,
            ctx: &dyn MetaHeuristicContext<Value>,
            _mutation: &dyn Mutation<Value>,
            _probability: f32,
            offspring: &mut Value,
        ) -> Result<()> {
            assert_eq!(ctx.current_stage(), EvolutionStage::Mutation);
            self.mutations.fetch_add(1, Ordering::SeqCst);
            offspring.0 += ctx.index() as f64 * 100.0;
            Ok(())
        }

        fn reinsert(
            &self,
            ctx: &dyn MetaHeuristicContext<Value>,
            _reinsertion: &dyn Reinsertion<Value>,
            offspring: &[Arc<Value>],
            _parents: &[Arc<Value>],
        ) -> Result<Vec<Arc<Value>>> {
            assert_eq!(ctx.current_stage(), EvolutionStage::Reinsertion);
            Ok(offspring.to_vec())
        }
    }

    #[derive(Debug)]
    struct Pair;

    impl Crossover<Value> for Pair {
        fn parents_number(&self) -> usize {
            2
        }

        fn children_number(&self) -> usize {
            1
        }

        fn cross(&self, parents: &[Arc<Value>], _random: &dyn Randomization) -> Result<Vec<Arc<Value>>> {
            Ok(vec![Arc::clone(&parents[0])])
        }
    }

    #[derive(Debug)]
    struct Noop;

    impl Mutation<Value> for Noop {
        fn mutate(&self, _chromosome: &mut Value, _probability: f32, _random: &dyn Randomization) -> Result<()> {
            Ok(())
        }
    }

    fn context(size: usize) -> EvolutionContext<Value> {
        let population = Population::from_chromosomes(0, (0..size).map(|i| Value(i as f64)).collect());
        EvolutionContext::new(Arc::new(population)).with_random(Arc::new(SeededRandomization::new(1)))
    }

    fn run_cross(options: DispatchOptions) -> Vec<f64> {
        let ctx = context(16);
        let parents = ctx.population().chromosomes().to_vec();
        let dispatcher = GenerationDispatcher::new(Arc::new(IndexEcho::new()), options);
        dispatcher
            .cross(&ctx, &Pair, 1.0, &parents)
            .unwrap()
            .iter()
            .map(|c| c.0)
            .collect()
    }

    #[test]
    fn test_cross_steps_by_arity_in_both_modes() {
        let sequential = run_cross(DispatchOptions::sequential());
        let parallel = run_cross(DispatchOptions::builder().parallel_threshold(1).build());

        assert_eq!(sequential, vec![2.0, 6.0, 10.0, 14.0]);
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_mutate_copies_shared_offspring() {
        let ctx = context(4);
        let heuristic = Arc::new(IndexEcho::new());
        let dispatcher = GenerationDispatcher::new(heuristic.clone(), DispatchOptions::builder().parallel_threshold(2).build());

        let original = Arc::new(Value(1.0));
        let mut offspring = vec![Arc::clone(&original), Arc::new(Value(2.0)), Arc::new(Value(3.0))];
        dispatcher.mutate(&ctx, &Noop, 1.0, &mut offspring).unwrap();

        assert_eq!(original.0, 1.0);
        let mutated: Vec<f64> = offspring.iter().map(|c| c.0).collect();
        assert_eq!(mutated, vec![1.0, 102.0, 203.0]);
        assert_eq!(heuristic.mutations.load(Ordering::SeqCst), 3);
    }

    #[derive(Debug)]
    struct First;

    impl Selection<Value> for First {
        fn select_chromosomes(
            &self,
            number: usize,
            population: &Population<Value>,
            _random: &dyn Randomization,
        ) -> Result<Vec<Arc<Value>>> {
            Ok(population.chromosomes().iter().take(number).cloned().collect())
        }
    }

    #[derive(Debug)]
    struct Keep;

    impl Reinsertion<Value> for Keep {
        fn select_chromosomes(
            &self,
            _population: &Population<Value>,
            offspring: &[Arc<Value>],
            _parents: &[Arc<Value>],
        ) -> Result<Vec<Arc<Value>>> {
            Ok(offspring.to_vec())
        }
    }

    #[test]
    fn test_stages_are_set_before_each_call() {
        let ctx = context(4);
        let dispatcher = GenerationDispatcher::new(Arc::new(IndexEcho::new()), DispatchOptions::sequential());

        let parents = dispatcher.select(&ctx, &First, 2).unwrap();
        assert_eq!(parents.len(), 2);

        let next = dispatcher.reinsert(&ctx, &Keep, &parents, &parents).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(ctx.current_stage(), EvolutionStage::Reinsertion);
    }
}
