use std::fmt::Debug;
use std::sync::Arc;

use crate::chromosome::Chromosome;
use crate::error::Result;
use crate::population::Population;
use crate::rng::Randomization;

/// Trait for selection strategies.
///
/// Selection strategies choose the parents of the next generation from the
/// current population. Concrete strategies are provided by the caller; the
/// metaheuristics only dispatch to them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use metaheur::chromosome::Chromosome;
/// use metaheur::error::Result;
/// use metaheur::population::Population;
/// use metaheur::rng::{Randomization, SeededRandomization};
/// use metaheur::selection::Selection;
///
/// #[derive(Clone, Debug)]
/// struct Value(f64);
///
/// impl Chromosome for Value {
///     fn fitness(&self) -> Option<f64> {
///         Some(self.0)
///     }
/// }
///
/// #[derive(Debug)]
/// struct FirstN;
///
/// impl Selection<Value> for FirstN {
///     fn select_chromosomes(
///         &self,
///         number: usize,
///         population: &Population<Value>,
///         _random: &dyn Randomization,
///     ) -> Result<Vec<Arc<Value>>> {
///         Ok(population.chromosomes().iter().take(number).cloned().collect())
///     }
/// }
///
/// fn main() -> Result<()> {
///     let population = Population::from_chromosomes(0, vec![Value(1.0), Value(2.0), Value(3.0)]);
///     let random = SeededRandomization::new(42);
///     let selected = FirstN.select_chromosomes(2, &population, &random)?;
///     assert_eq!(selected.len(), 2);
///     Ok(())
/// }
/// ```
pub trait Selection<C>: Debug + Send + Sync
where
    C: Chromosome,
{
    /// Selects `number` chromosomes from the population.
    ///
    /// # Errors
    ///
    /// Returns an error if the population is empty or the selection process
    /// fails (e.g., random number generation fails).
    fn select_chromosomes(
        &self,
        number: usize,
        population: &Population<C>,
        random: &dyn Randomization,
    ) -> Result<Vec<Arc<C>>>;
}
