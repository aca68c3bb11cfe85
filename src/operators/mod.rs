//! # Operators
//!
//! Contracts of the genetic operators the metaheuristics invoke but do not
//! implement: crossover, mutation and reinsertion. Selection lives in
//! [`crate::selection`] next to the roulette wheel it shares with the
//! matching techniques.
//!
//! Every operator receives the randomization collaborator of the running
//! generation instead of owning its own generator, so that seeded runs stay
//! reproducible and parallel individuals stay lock-free.
use std::fmt::Debug;
use std::sync::Arc;

use crate::{
    chromosome::Chromosome, error::Result, population::Population, rng::Randomization,
};

/// # Crossover
///
/// Combines a fixed number of parents into a fixed number of children.
pub trait Crossover<C: Chromosome>: Debug + Send + Sync {
    /// Number of parents required by one call to [`Crossover::cross`].
    fn parents_number(&self) -> usize;

    /// Number of children produced by one call to [`Crossover::cross`].
    fn children_number(&self) -> usize;

    /// Crosses the given parents.
    ///
    /// ## Errors
    ///
    /// Implementations should fail if `parents.len()` differs from
    /// [`Crossover::parents_number`].
    fn cross(&self, parents: &[Arc<C>], random: &dyn Randomization) -> Result<Vec<Arc<C>>>;
}

/// # Mutation
///
/// Alters a single chromosome in place with the given probability.
pub trait Mutation<C: Chromosome>: Debug + Send + Sync {
    fn mutate(&self, chromosome: &mut C, probability: f32, random: &dyn Randomization)
        -> Result<()>;
}

/// # Reinsertion
///
/// Chooses which chromosomes make up the next generation.
pub trait Reinsertion<C: Chromosome>: Debug + Send + Sync {
    fn select_chromosomes(
        &self,
        population: &Population<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>>;
}
