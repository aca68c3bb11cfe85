//! # Metaheuristics
//!
//! Composable heuristic steps. A metaheuristic implements the per-stage
//! operations of one generation (parent selection, mating, mutation and
//! reinsertion) on top of the genetic operators it is handed, and may wrap
//! another metaheuristic to which it delegates.
//!
//! Composition is explicit: a wrapper owns an `Arc<dyn MetaHeuristic<C>>`
//! and calls its entry points directly. The tree of heuristics is static for
//! a run; each node carries a [`HeuristicId`] that is part of the cache key of
//! heuristic-scoped values.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use metaheur::chromosome::Chromosome;
//! use metaheur::metaheuristics::{
//!     DefaultMetaHeuristic, MatchMetaHeuristic, MatchingTechnique, MetaHeuristic,
//! };
//!
//! #[derive(Clone, Debug)]
//! struct Value(f64);
//!
//! impl Chromosome for Value {
//!     fn fitness(&self) -> Option<f64> {
//!         Some(self.0)
//!     }
//! }
//!
//! let leaf: Arc<dyn MetaHeuristic<Value>> = Arc::new(DefaultMetaHeuristic::new());
//! let matching = MatchMetaHeuristic::new(leaf, 2)
//!     .with_matching_techniques(vec![MatchingTechnique::RouletteWheel]);
//! assert_eq!(matching.number_of_matches(), 2);
//! ```

pub mod container;
pub mod context;
pub mod default;
pub mod factory;
pub mod matching;
pub mod options;
pub mod parameter;

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    chromosome::Chromosome,
    error::Result,
    operators::{Crossover, Mutation, Reinsertion},
    selection::Selection,
};

pub use container::{should_run, ContainerMetaHeuristic, ProbabilitySource, ProbabilityStrategy};
pub use context::{ContextExt, EvolutionContext, IndividualContext, MetaHeuristicContext};
pub use default::DefaultMetaHeuristic;
pub use factory::MetaHeuristicsFactory;
pub use matching::{MatchMetaHeuristic, MatchingTechnique, ROULETTE_WHEEL_PARAMETER};
pub use options::{MatchOptions, MatchOptionsBuilder};
pub use parameter::{Generator, Parameter, ParameterDefinition};

/// Process-unique identity of a heuristic instance.
///
/// Identities are allocated on construction and never derived from the
/// heuristic's configuration, so two identically configured instances keep
/// independent caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeuristicId(u64);

impl HeuristicId {
    /// Allocates a fresh identity.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HeuristicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "heuristic#{}", self.0)
    }
}

/// # MetaHeuristic
///
/// The per-stage operations of one generation. Every operation receives the
/// context of the request, which may be the population-wide view or the view
/// of a single individual.
pub trait MetaHeuristic<C: Chromosome>: Debug + Send + Sync {
    /// Identity of this node of the composition tree.
    fn id(&self) -> HeuristicId;

    /// Selects `count` parents from the context's population.
    fn select_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        selection: &dyn Selection<C>,
        count: usize,
    ) -> Result<Vec<Arc<C>>>;

    /// Matches parents for the context's individual and crosses them.
    ///
    /// ## Returns
    ///
    /// `Ok(None)` when the step did not run this call (a probability gate
    /// declined, or no complete parent set was available), as opposed to
    /// `Ok(Some(offspring))` when it ran, even if it produced no offspring.
    fn match_parents_and_cross(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        crossover: &dyn Crossover<C>,
        probability: f32,
        parents: &[Arc<C>],
    ) -> Result<Option<Vec<Arc<C>>>>;

    /// Mutates the offspring of the context's individual.
    fn mutate_chromosome(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        mutation: &dyn Mutation<C>,
        probability: f32,
        offspring: &mut C,
    ) -> Result<()>;

    /// Chooses the chromosomes of the next generation.
    fn reinsert(
        &self,
        ctx: &dyn MetaHeuristicContext<C>,
        reinsertion: &dyn Reinsertion<C>,
        offspring: &[Arc<C>],
        parents: &[Arc<C>],
    ) -> Result<Vec<Arc<C>>>;

    /// Registers the parameters declared by this heuristic and the heuristics
    /// it wraps into `ctx`.
    fn register_parameters(&self, _ctx: &dyn MetaHeuristicContext<C>) -> Result<()> {
        Ok(())
    }
}
