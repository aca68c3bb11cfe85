//! # DispatchOptions
//!
//! The `DispatchOptions` struct controls how the individuals of a generation
//! are handed to a heuristic: one after the other through the population
//! context, or in parallel through one individual context each.
//!
//! ## Example
//!
//! ```rust
//! use metaheur::evolution::options::DispatchOptions;
//!
//! // Parallel from 1000 individuals on
//! let default_options = DispatchOptions::default();
//! assert!(default_options.use_parallel(1000));
//! assert!(!default_options.use_parallel(999));
//!
//! // Always sequential
//! let sequential = DispatchOptions::builder().parallel(false).build();
//! assert!(!sequential.use_parallel(1_000_000));
//! ```
//!
//! ## Fields
//!
//! - `parallel`: Whether parallel dispatch is allowed at all.
//! - `parallel_threshold`: The minimum number of individuals to process in parallel.

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    parallel: bool,
    /// Minimum number of individuals to process in parallel
    parallel_threshold: usize,
}

impl DispatchOptions {
    pub fn new(parallel: bool, parallel_threshold: usize) -> Self {
        Self {
            parallel,
            parallel_threshold,
        }
    }

    /// Options that always dispatch sequentially.
    pub fn sequential() -> Self {
        Self::new(false, usize::MAX)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the minimum number of individuals to process in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Whether `count` individuals are dispatched in parallel.
    pub fn use_parallel(&self, count: usize) -> bool {
        self.parallel && count >= self.parallel_threshold
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Sets the parallel threshold.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Returns a builder for creating a `DispatchOptions` instance.
    pub fn builder() -> DispatchOptionsBuilder {
        DispatchOptionsBuilder::default()
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 1000, // Default parallel threshold
        }
    }
}

/// Builder for `DispatchOptions`.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptionsBuilder {
    parallel: Option<bool>,
    parallel_threshold: Option<usize>,
}

impl DispatchOptionsBuilder {
    /// Allows or forbids parallel dispatch.
    pub fn parallel(mut self, value: bool) -> Self {
        self.parallel = Some(value);
        self
    }

    /// Sets the parallel threshold.
    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `DispatchOptions` instance.
    pub fn build(self) -> DispatchOptions {
        DispatchOptions {
            parallel: self.parallel.unwrap_or(true),
            parallel_threshold: self.parallel_threshold.unwrap_or(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_decides_mode() {
        let options = DispatchOptions::builder().parallel_threshold(4).build();
        assert!(options.is_parallel());
        assert!(!options.use_parallel(3));
        assert!(options.use_parallel(4));
    }

    #[test]
    fn test_sequential_never_goes_parallel() {
        let mut options = DispatchOptions::sequential();
        assert!(!options.use_parallel(usize::MAX));

        options.set_parallel(true);
        options.set_parallel_threshold(0);
        assert!(options.use_parallel(0));
        assert_eq!(options.get_parallel_threshold(), 0);
    }
}
