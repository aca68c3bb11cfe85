//! # Randomization
//!
//! The `Randomization` trait is the randomization collaborator consumed by the
//! matching techniques and the probability gates: uniform integer draws and
//! uniform real draws in `[0, 1)`.
//!
//! Two implementations are provided. `BasicRandomization` uses the `rand`
//! crate's thread-local `ThreadRng`, so concurrent individuals never contend on
//! a lock. `SeededRandomization` gives every worker thread its own `StdRng`
//! derived from one base seed, which keeps seeded single-threaded runs
//! reproducible while staying lock-free under rayon.
//!
//! ## Example
//!
//! ```rust
//! use metaheur::rng::{Randomization, SeededRandomization};
//!
//! let random = SeededRandomization::new(42);
//! let index = random.gen_int(0, 10).unwrap();
//! assert!(index < 10);
//!
//! let pointer = random.gen_double();
//! assert!((0.0..1.0).contains(&pointer));
//! ```

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};

use rand::{rngs::StdRng, thread_rng, Rng, SeedableRng};
use thread_local::ThreadLocal;

use crate::error::{GeneticError, Result};

/// Source of uniform random draws shared by every individual of a generation.
pub trait Randomization: Debug + Send + Sync {
    /// Returns a uniform integer in `[min, max)`.
    ///
    /// # Errors
    ///
    /// Returns `GeneticError::RandomGeneration` if the range is empty.
    fn gen_int(&self, min: usize, max: usize) -> Result<usize>;

    /// Returns a uniform real in `[0, 1)`.
    fn gen_double(&self) -> f64;

    /// Returns a uniform `f32` in `[0, 1)`.
    fn gen_float(&self) -> f32 {
        self.gen_double() as f32
    }
}

fn check_range(min: usize, max: usize) -> Result<()> {
    if min >= max {
        return Err(GeneticError::RandomGeneration(format!(
            "Cannot draw an integer from the empty range [{}, {})",
            min, max
        )));
    }
    Ok(())
}

/// Randomization backed by the thread-local `ThreadRng` of the `rand` crate.
///
/// It is automatically seeded from system entropy on every thread.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicRandomization;

impl BasicRandomization {
    pub fn new() -> Self {
        Self
    }
}

impl Randomization for BasicRandomization {
    fn gen_int(&self, min: usize, max: usize) -> Result<usize> {
        check_range(min, max)?;
        Ok(thread_rng().gen_range(min..max))
    }

    fn gen_double(&self) -> f64 {
        thread_rng().gen::<f64>()
    }
}

/// Randomization with one seeded `StdRng` per worker thread.
///
/// The first thread to draw receives the base seed itself; every further
/// thread receives a distinct seed derived from it.
pub struct SeededRandomization {
    seed: u64,
    streams: AtomicU64,
    rngs: ThreadLocal<RefCell<StdRng>>,
}

impl SeededRandomization {
    /// Creates a new seeded randomization.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: AtomicU64::new(0),
            rngs: ThreadLocal::new(),
        }
    }

    /// Returns the base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let cell = self.rngs.get_or(|| {
            let stream = self.streams.fetch_add(1, Ordering::Relaxed);
            let seed = self
                .seed
                .wrapping_add(stream.wrapping_mul(0x9E37_79B9_7F4A_7C15));
            RefCell::new(StdRng::seed_from_u64(seed))
        });
        let mut rng = cell.borrow_mut();
        f(&mut rng)
    }
}

impl Debug for SeededRandomization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRandomization")
            .field("seed", &self.seed)
            .field("streams", &self.streams.load(Ordering::Relaxed))
            .finish()
    }
}

impl Randomization for SeededRandomization {
    fn gen_int(&self, min: usize, max: usize) -> Result<usize> {
        check_range(min, max)?;
        Ok(self.with_rng(|rng| rng.gen_range(min..max)))
    }

    fn gen_double(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }
}
