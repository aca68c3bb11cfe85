//! # Chromosome Trait
//!
//! The `Chromosome` trait is the contract through which the caching and
//! composition layers see candidate solutions. Gene encodings, fitness
//! functions and the crossover/mutation semantics themselves belong to the
//! implementing crate; the core only needs to read back an evaluated fitness.
//!
//! Chromosomes travel between heuristics as `Arc<C>` so that parent sets can
//! be assembled without copying genes, and so that offspring can be told
//! apart from their parents by reference (`Arc::ptr_eq`).
//!
//! ## Example
//!
//! ```rust
//! use metaheur::chromosome::Chromosome;
//!
//! #[derive(Clone, Debug)]
//! struct Coordinates {
//!     genes: Vec<f64>,
//!     fitness: Option<f64>,
//! }
//!
//! impl Chromosome for Coordinates {
//!     fn fitness(&self) -> Option<f64> {
//!         self.fitness
//!     }
//! }
//! ```

use std::fmt::Debug;

/// Trait for candidate solutions handled by the metaheuristics.
///
/// Types implementing this trait must also implement `Clone`, `Debug`, `Send`
/// and `Sync` so that individuals can be evaluated in parallel and mutated
/// copy-on-write through `Arc::make_mut`.
pub trait Chromosome: Clone + Debug + Send + Sync + 'static {
    /// Returns the evaluated fitness, or `None` if the chromosome has not been
    /// evaluated yet.
    fn fitness(&self) -> Option<f64>;
}
