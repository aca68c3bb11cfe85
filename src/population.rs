//! # Population
//!
//! A snapshot of one generation as seen by the heuristics: its number, its
//! chromosomes and its best chromosome. The population is read-only while
//! the individuals of a generation are processed; the driver installs the
//! next generation by handing a new `Population` to the context.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::chromosome::Chromosome;
use crate::error::{GeneticError, OptionExt, Result};

/// One generation of chromosomes.
#[derive(Debug, Clone)]
pub struct Population<C: Chromosome> {
    generation_number: usize,
    chromosomes: Vec<Arc<C>>,
    best_chromosome: Option<Arc<C>>,
}

impl<C: Chromosome> Population<C> {
    /// Creates a population for the given generation.
    ///
    /// The best chromosome is the one with the highest evaluated fitness;
    /// chromosomes without a fitness are not candidates.
    pub fn new(generation_number: usize, chromosomes: Vec<Arc<C>>) -> Self {
        let best_chromosome = chromosomes
            .iter()
            .filter(|c| c.fitness().map_or(false, f64::is_finite))
            .max_by(|a, b| {
                a.fitness()
                    .partial_cmp(&b.fitness())
                    .unwrap_or(Ordering::Equal)
            })
            .cloned();

        Self {
            generation_number,
            chromosomes,
            best_chromosome,
        }
    }

    /// Creates a population from owned chromosomes.
    pub fn from_chromosomes(generation_number: usize, chromosomes: Vec<C>) -> Self {
        Self::new(
            generation_number,
            chromosomes.into_iter().map(Arc::new).collect(),
        )
    }

    /// Returns the number of the generation this population belongs to.
    pub fn generation_number(&self) -> usize {
        self.generation_number
    }

    pub fn chromosomes(&self) -> &[Arc<C>] {
        &self.chromosomes
    }

    pub fn size(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn best_chromosome(&self) -> Option<&Arc<C>> {
        self.best_chromosome.as_ref()
    }

    /// Returns the best chromosome, failing on a population without any
    /// evaluated chromosome.
    pub fn require_best_chromosome(&self) -> Result<Arc<C>> {
        if self.chromosomes.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        self.best_chromosome.clone().ok_or_else_genetic(|| {
            GeneticError::FitnessCalculation(format!(
                "Generation {} has no evaluated chromosome",
                self.generation_number
            ))
        })
    }
}
