use std::sync::Arc;

use crate::chromosome::Chromosome;
use crate::error::{GeneticError, OptionExt, Result};
use crate::rng::Randomization;

/// A cumulative fitness-proportionate distribution over a pool of chromosomes.
///
/// Entry `i` holds the cumulative share of fitness of chromosomes `0..=i`;
/// the last entry is exactly `1.0`. Spinning the wheel with a uniform pointer
/// in `[0, 1)` selects chromosome `i` with probability proportional to its
/// fitness.
///
/// The wheel requires all fitness values to be non-negative and at least one
/// of them to be positive.
///
/// # Examples
///
/// ```
/// use metaheur::selection::RouletteWheel;
///
/// let wheel = RouletteWheel::from_fitness(&[1.0, 3.0]).unwrap();
/// assert_eq!(wheel.cumulative(), &[0.25, 1.0]);
/// assert_eq!(wheel.select_index(0.1), 0);
/// assert_eq!(wheel.select_index(0.9), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RouletteWheel {
    cumulative: Vec<f64>,
}

impl RouletteWheel {
    /// Builds the wheel from raw fitness values.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool is empty, if any fitness value is negative
    /// or not finite, or if all fitness values are zero.
    pub fn from_fitness(fitness: &[f64]) -> Result<Self> {
        if fitness.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        if let Some(bad) = fitness.iter().find(|f| !f.is_finite()) {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Roulette wheel cannot weigh a fitness of {}",
                bad
            )));
        }

        if fitness.iter().any(|&f| f < 0.0) {
            return Err(GeneticError::Configuration(
                "Roulette wheel selection requires non-negative fitness values".to_string(),
            ));
        }

        let sum: f64 = fitness.iter().sum();
        if sum == 0.0 {
            return Err(GeneticError::Configuration(
                "Roulette wheel selection requires at least one individual with non-zero fitness"
                    .to_string(),
            ));
        }

        let mut cumulative = Vec::with_capacity(fitness.len());
        let mut running = 0.0;
        for &f in fitness {
            running += f / sum;
            cumulative.push(running);
        }

        // Avoid floating-point drift on the last slot
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }

        Ok(Self { cumulative })
    }

    /// Builds the wheel from the fitness of evaluated chromosomes.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::FitnessCalculation` if a chromosome has not been
    /// evaluated, plus every error of [`RouletteWheel::from_fitness`].
    pub fn from_chromosomes<C: Chromosome>(chromosomes: &[Arc<C>]) -> Result<Self> {
        let fitness = chromosomes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                c.fitness().ok_or_else_genetic(|| {
                    GeneticError::FitnessCalculation(format!(
                        "Chromosome {} has no fitness to weigh on the roulette wheel",
                        i
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        Self::from_fitness(&fitness)
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Returns the first slot whose cumulative share reaches `pointer`.
    pub fn select_index(&self, pointer: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&share| pointer <= share)
            .unwrap_or(self.cumulative.len().saturating_sub(1))
    }

    /// Spins the wheel with one uniform draw.
    pub fn spin(&self, random: &dyn Randomization) -> usize {
        self.select_index(random.gen_double())
    }
}
