use std::fmt::Debug;

/// Handle on the running genetic algorithm, as seen from inside a generation.
///
/// The generational driver implements this trait; heuristics and parameter
/// generators read run-level settings through it.
pub trait GeneticAlgorithm: Debug + Send + Sync {
    /// Number of generations evolved so far.
    fn generations_number(&self) -> usize;

    /// Configured crossover probability.
    fn crossover_probability(&self) -> f32;

    /// Configured mutation probability.
    fn mutation_probability(&self) -> f32;
}
