//! # Error Types
//!
//! This module defines the error type shared by the caching engine and the
//! metaheuristic composition layer.
//!
//! A declined probability gate is *not* an error: mating entry points return
//! `Ok(None)` for "nothing to do", which callers can tell apart from
//! `Ok(Some(vec![]))`.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use metaheur::error::{GeneticError, Result};
//!
//! fn check_probability(p: f32) -> Result<f32> {
//!     if !(0.0..=1.0).contains(&p) {
//!         return Err(GeneticError::Configuration(format!("invalid probability {}", p)));
//!     }
//!     Ok(p)
//! }
//!
//! assert!(check_probability(0.5).is_ok());
//! assert!(check_probability(1.5).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use metaheur::error::{GeneticError, OptionExt};
//!
//! fn first_parent(parents: &[i32]) -> metaheur::error::Result<i32> {
//!     parents.first().cloned().ok_or_else_genetic(|| GeneticError::EmptyPopulation)
//! }
//! ```

use thiserror::Error;

/// Represents errors that can occur while composing and running metaheuristics.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// Error that occurs when a crossover operation fails.
    #[error("Crossover error: {0}")]
    Crossover(String),

    /// Error that occurs when a mutation operation fails.
    #[error("Mutation error: {0}")]
    Mutation(String),

    /// Error that occurs when a selection or reinsertion operation fails.
    #[error("Selection error: {0}")]
    Selection(String),

    /// Error that occurs when an invalid configuration is provided.
    ///
    /// Configuration errors are fatal and never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when a chromosome has not been evaluated yet.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when a parameter name has no registered definition.
    #[error("Unknown parameter: no definition registered under '{0}'")]
    UnknownParameter(String),

    /// Error that occurs when a cached value is read back with another type.
    #[error("Parameter '{name}' does not hold a value of type {expected}")]
    ParameterType {
        /// Logical name of the parameter.
        name: String,
        /// Type requested by the caller.
        expected: &'static str,
    },

    /// Error raised by a parameter generator.
    #[error("Parameter generation error: {0}")]
    Generator(String),

    /// Error that occurs when a random number generation fails.
    #[error("Random generation error: {0}")]
    RandomGeneration(String),

    /// Error that occurs when NaN or infinity values are encountered.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for metaheuristic operations.
///
/// ```rust
/// use metaheur::error::Result;
///
/// fn may_fail() -> Result<i32> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an Option to a Result using a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
