use std::thread::{self, ThreadId};

use super::Scope;
use crate::chromosome::Chromosome;
use crate::evolution::EvolutionStage;
use crate::metaheuristics::{HeuristicId, MetaHeuristicContext};

/// Canonical key of a cached value.
///
/// Components excluded by a [`Scope`] are stored as `None`: `heuristic: None`
/// is the global placeholder shared by all heuristic instances,
/// `individual: None` the population-wide placeholder and `thread: None`
/// matches every thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    name: String,
    generation: usize,
    stage: EvolutionStage,
    heuristic: Option<HeuristicId>,
    individual: Option<usize>,
    thread: Option<ThreadId>,
}

impl CacheKey {
    /// Creates a population-wide, heuristic-independent key.
    pub fn new(name: impl Into<String>, generation: usize, stage: EvolutionStage) -> Self {
        Self {
            name: name.into(),
            generation,
            stage,
            heuristic: None,
            individual: None,
            thread: None,
        }
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicId) -> Self {
        self.heuristic = Some(heuristic);
        self
    }

    pub fn with_individual(mut self, individual: usize) -> Self {
        self.individual = Some(individual);
        self
    }

    pub fn with_thread(mut self, thread: ThreadId) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Resolves the canonical key of `name` for a request issued through `ctx`.
    ///
    /// Generation and stage always come from the context. The heuristic
    /// identity, the context's individual index and the current thread are
    /// only kept when `scope` selects them, so the same request resolves to
    /// the same key whether it comes from a population context or from any
    /// individual view over it.
    pub fn resolve<C: Chromosome>(
        name: &str,
        scope: Scope,
        heuristic: HeuristicId,
        ctx: &dyn MetaHeuristicContext<C>,
    ) -> Self {
        let mut key = Self::new(name, ctx.generation_number(), ctx.current_stage());
        if scope.per_heuristic() {
            key = key.with_heuristic(heuristic);
        }
        if scope.per_individual() {
            key = key.with_individual(ctx.index());
        }
        if scope.per_thread() {
            key = key.with_thread(thread::current().id());
        }
        key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn stage(&self) -> EvolutionStage {
        self.stage
    }

    pub fn heuristic(&self) -> Option<HeuristicId> {
        self.heuristic
    }

    pub fn individual(&self) -> Option<usize> {
        self.individual
    }

    pub fn thread(&self) -> Option<ThreadId> {
        self.thread
    }
}
