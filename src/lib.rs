pub mod caching;
pub mod chromosome;
pub mod error;
pub mod evolution;
pub mod metaheuristics;
pub mod operators;
pub mod population;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result};
