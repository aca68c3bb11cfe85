//! # DefaultMetaHeuristic
//!
//! The leaf of every composition: applies the genetic operators directly,
//! the way a plain genetic algorithm would.
use std::sync::Arc;

use tracing::trace;

use super::{HeuristicId, MetaHeuristic, MetaHeuristicContext};
use crate::{
    chromosome::Chromosome,
    error::Result,
    operators::{Crossover, Mutation, Reinsertion},
    selection::Selection,
};

/// # DefaultMetaHeuristic
///
/// - selection and reinsertion are handed to the operators with the
///   context's population;
/// - mating crosses the window `parents[index .. index + arity]` of the
///   context's individual. A parent list no longer than the crossover arity
///   is an already matched set and is crossed as a whole. The cross happens
///   when the set is complete and a uniform draw falls below the probability;
///   otherwise the result is `None`;
/// - mutation is handed to the operator with the incoming probability.
#[derive(Debug)]
pub struct DefaultMetaHeuristic {
    id: HeuristicId,
}

impl DefaultMetaHeuristic {
    /// Creates a new `DefaultMetaHeuristic` instance.
    pub fn new() -> Self {
        Self {
            id: HeuristicId::next(),
        }
    }
}

impl Default for DefaultMetaHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Chromosome> MetaHeuristic<C> for DefaultMetaHeuristic {
    fn id(&self) -> HeuristicId {
        self.id
    }

    fn select_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        selection: &dyn Selection<C>,
        count: usize,
    ) -> Result<Vec<Arc<C>>> {
        selection.select_chromosomes(count, &ctx.population(), ctx.random())
    }

    fn match_parents_and_cross(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        crossover: &dyn Crossover<C>,
        probability: f32,
        parents: &[Arc<C>],
    ) -> Result<Option<Vec<Arc<C>>>> {
        let arity = crossover.parents_number();

        let selected = if parents.len() <= arity {
            parents
        } else {
            let start = ctx.index().min(parents.len());
            let end = (start + arity).min(parents.len());
            &parents[start..end]
        };

        if selected.len() < arity {
            trace!(
                index = ctx.index(),
                available = selected.len(),
                arity,
                "incomplete parent set, skipping crossover"
            );
            return Ok(None);
        }

        if ctx.random().gen_double() < f64::from(probability) {
            crossover.cross(selected, ctx.random()).map(Some)
        } else {
            Ok(None)
        }
    }

    fn mutate_chromosome(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut C,
    ) -> Result<()> {
        mutation.mutate(offspring, probability, ctx.random())
    }

    fn reinsert(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        reinsertion: &dyn Reinsertion<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>> {
        reinsertion.select_chromosomes(&ctx.population(), offspring, parents)
    }
}
