//! # Evolution contexts
//!
//! Two views of one generation implement the [`MetaHeuristicContext`]
//! contract:
//!
//! - [`EvolutionContext`], the population-wide view owned by the driver for
//!   the duration of a generation. It holds all shared state: the running
//!   algorithm, the population, the stage, the parameter registry and the
//!   cache.
//! - [`IndividualContext`], a lightweight borrowed view that adds an
//!   individual index and forwards everything else to the population view.
//!
//! Heuristics only ever talk to `&dyn MetaHeuristicContext<C>` and cannot
//! tell the two apart except through [`MetaHeuristicContext::index`].

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::parameter::ParameterDefinition;
use super::MetaHeuristic;
use crate::caching::{CacheKey, CachedValue, ScopedCache};
use crate::chromosome::Chromosome;
use crate::error::{GeneticError, Result};
use crate::evolution::{EvolutionStage, GeneticAlgorithm};
use crate::population::Population;
use crate::rng::{BasicRandomization, Randomization};

/// The context contract shared by the population and individual views.
///
/// The contract is object safe; typed access to cached values goes through
/// the [`ContextExt`] extension trait, implemented for every context.
pub trait MetaHeuristicContext<C: Chromosome>: Send + Sync {
    /// The running algorithm, if the driver registered one.
    fn ga(&self) -> Option<Arc<dyn GeneticAlgorithm>>;

    fn set_ga(&self, ga: Option<Arc<dyn GeneticAlgorithm>>);

    /// The population of the current generation.
    fn population(&self) -> Arc<Population<C>>;

    /// Installs a population; the population size is updated accordingly.
    fn set_population(&self, population: Arc<Population<C>>);

    /// Number of individuals processed in this generation.
    fn count(&self) -> usize;

    fn set_count(&self, count: usize);

    fn current_stage(&self) -> EvolutionStage;

    fn set_current_stage(&self, stage: EvolutionStage);

    /// Number of the current generation.
    fn generation_number(&self) -> usize;

    /// Index of the current individual.
    fn index(&self) -> usize;

    /// The randomization collaborator of this generation.
    fn random(&self) -> &dyn Randomization;

    /// Narrows the context to one individual.
    ///
    /// On an individual context this returns the context itself: narrowing
    /// twice keeps the first index.
    fn get_individual(&self, index: usize) -> IndividualContext<'_, C>;

    /// Returns the value cached under `key`, creating it with `factory` if it
    /// is absent.
    fn get_or_add_erased(
        &self,
        key: CacheKey,
        factory: &mut dyn FnMut() -> Result<CachedValue>,
    ) -> Result<CachedValue>;

    /// Resolves the registered parameter `name` on behalf of `heuristic`.
    fn get_parameter_value_erased(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        name: &str,
    ) -> Result<CachedValue>;

    /// Registers a parameter definition, replacing any previous one with the
    /// same name.
    fn register_parameter(&self, name: &str, definition: Arc<dyn ParameterDefinition<C>>);

    fn get_parameter_definition(&self, name: &str) -> Option<Arc<dyn ParameterDefinition<C>>>;
}

/// Typed access to the context cache.
pub trait ContextExt<C: Chromosome>: MetaHeuristicContext<C> {
    /// Returns the value cached under `key`, running `factory` at most once
    /// per canonical key.
    ///
    /// # Errors
    ///
    /// Propagates the factory error, in which case nothing is cached, and
    /// returns `GeneticError::ParameterType` if the cached value is not a `T`.
    fn get_or_add<T, F>(&self, key: CacheKey, factory: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T>,
    {
        let name = key.name().to_string();
        let mut factory = Some(factory);
        let value = self.get_or_add_erased(key, &mut || {
            let factory = factory
                .take()
                .ok_or_else(|| GeneticError::Generator(format!("{} already generated", name)))?;
            factory().map(|value| Arc::new(value) as CachedValue)
        })?;
        downcast_value(value, &name)
    }

    /// Resolves the registered parameter `name` for `heuristic` as a `T`.
    fn get_parameter_value<T>(&self, heuristic: &dyn MetaHeuristic<C>, name: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        downcast_value(self.get_parameter_value_erased(heuristic, name)?, name)
    }
}

impl<C: Chromosome, X: MetaHeuristicContext<C> + ?Sized> ContextExt<C> for X {}

pub(crate) fn downcast_value<T: Any + Send + Sync>(value: CachedValue, name: &str) -> Result<Arc<T>> {
    value.downcast::<T>().map_err(|_| GeneticError::ParameterType {
        name: name.to_string(),
        expected: type_name::<T>(),
    })
}

struct SharedState<C: Chromosome> {
    ga: Option<Arc<dyn GeneticAlgorithm>>,
    population: Arc<Population<C>>,
    count: usize,
    stage: EvolutionStage,
}

/// Population-wide view of one generation.
///
/// The driver creates one per generation. In sequential mode it reuses the
/// same context for every individual and moves [`EvolutionContext::set_index`]
/// along; in parallel mode every task works through its own
/// [`IndividualContext`] obtained with [`MetaHeuristicContext::get_individual`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use metaheur::caching::CacheKey;
/// use metaheur::chromosome::Chromosome;
/// use metaheur::metaheuristics::{ContextExt, EvolutionContext, MetaHeuristicContext};
/// use metaheur::population::Population;
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
/// let population = Population::from_chromosomes(0, vec![Value(1.0), Value(2.0)]);
/// let ctx = EvolutionContext::new(Arc::new(population));
///
/// let key = CacheKey::new("total", ctx.generation_number(), ctx.current_stage());
/// let total = ctx.get_or_add(key.clone(), || Ok(3.0_f64)).unwrap();
/// let again = ctx.get_individual(1).get_or_add(key, || Ok(0.0_f64)).unwrap();
/// assert!(Arc::ptr_eq(&total, &again));
/// ```
pub struct EvolutionContext<C: Chromosome> {
    state: RwLock<SharedState<C>>,
    index: AtomicUsize,
    random: Arc<dyn Randomization>,
    cache: Arc<ScopedCache>,
    parameters: RwLock<HashMap<String, Arc<dyn ParameterDefinition<C>>>>,
}

impl<C: Chromosome> EvolutionContext<C> {
    /// Creates the context of the generation held by `population`, with a
    /// fresh cache and thread-local randomization.
    pub fn new(population: Arc<Population<C>>) -> Self {
        let count = population.size();
        Self {
            state: RwLock::new(SharedState {
                ga: None,
                population,
                count,
                stage: EvolutionStage::default(),
            }),
            index: AtomicUsize::new(0),
            random: Arc::new(BasicRandomization::new()),
            cache: Arc::new(ScopedCache::new()),
            parameters: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_random(mut self, random: Arc<dyn Randomization>) -> Self {
        self.random = random;
        self
    }

    pub fn with_ga(mut self, ga: Arc<dyn GeneticAlgorithm>) -> Self {
        self.state_mut().ga = Some(ga);
        self
    }

    /// Uses a cache shared with previous generations.
    ///
    /// Entries of generations older than this context's are evicted.
    pub fn with_cache(mut self, cache: Arc<ScopedCache>) -> Self {
        let generation = self.state_mut().population.generation_number();
        cache.evict_superseded(generation);
        self.cache = cache;
        self
    }

    /// Moves the current individual of the population view.
    pub fn set_index(&self, index: usize) {
        self.index.store(index, Ordering::Relaxed);
    }

    pub fn cache(&self) -> &Arc<ScopedCache> {
        &self.cache
    }

    /// Returns one individual view per individual of the generation.
    pub fn individuals(&self) -> impl Iterator<Item = IndividualContext<'_, C>> + '_ {
        (0..self.count()).map(move |index| IndividualContext::new(self, index))
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, SharedState<C>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, SharedState<C>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn state_mut(&mut self) -> &mut SharedState<C> {
        self.state.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves a registered parameter, handing `view` to its generator so
    /// that individual-scoped parameters see the requesting individual.
    fn resolve_parameter(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        name: &str,
        view: &dyn MetaHeuristicContext<C>,
    ) -> Result<CachedValue> {
        let definition = self
            .get_parameter_definition(name)
            .ok_or_else(|| GeneticError::UnknownParameter(name.to_string()))?;
        let key = CacheKey::resolve(name, definition.scope(), heuristic.id(), view);
        self.cache
            .get_or_add(key, &mut || definition.generate(heuristic, view))
    }
}

impl<C: Chromosome> MetaHeuristicContext<C> for EvolutionContext<C> {
    fn ga(&self) -> Option<Arc<dyn GeneticAlgorithm>> {
        self.state().ga.clone()
    }

    fn set_ga(&self, ga: Option<Arc<dyn GeneticAlgorithm>>) {
        self.state_write().ga = ga;
    }

    fn population(&self) -> Arc<Population<C>> {
        Arc::clone(&self.state().population)
    }

    fn set_population(&self, population: Arc<Population<C>>) {
        let mut state = self.state_write();
        state.count = population.size();
        state.population = population;
    }

    fn count(&self) -> usize {
        self.state().count
    }

    fn set_count(&self, count: usize) {
        self.state_write().count = count;
    }

    fn current_stage(&self) -> EvolutionStage {
        self.state().stage
    }

    fn set_current_stage(&self, stage: EvolutionStage) {
        self.state_write().stage = stage;
    }

    fn generation_number(&self) -> usize {
        self.state().population.generation_number()
    }

    fn index(&self) -> usize {
        self.index.load(Ordering::Relaxed)
    }

    fn random(&self) -> &dyn Randomization {
        self.random.as_ref()
    }

    fn get_individual(&self, index: usize) -> IndividualContext<'_, C> {
        IndividualContext::new(self, index)
    }

    fn get_or_add_erased(
        &self,
        key: CacheKey,
        factory: &mut dyn FnMut() -> Result<CachedValue>,
    ) -> Result<CachedValue> {
        self.cache.get_or_add(key, factory)
    }

    fn get_parameter_value_erased(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        name: &str,
    ) -> Result<CachedValue> {
        self.resolve_parameter(heuristic, name, self)
    }

    fn register_parameter(&self, name: &str, definition: Arc<dyn ParameterDefinition<C>>) {
        let previous = self
            .parameters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), definition);
        if previous.is_some() {
            debug!(parameter = name, "replaced parameter definition");
        }
    }

    fn get_parameter_definition(&self, name: &str) -> Option<Arc<dyn ParameterDefinition<C>>> {
        self.parameters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl<C: Chromosome> fmt::Debug for EvolutionContext<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("EvolutionContext")
            .field("generation", &state.population.generation_number())
            .field("count", &state.count)
            .field("stage", &state.stage)
            .field("index", &self.index())
            .field("cache", &self.cache)
            .finish()
    }
}

/// Single-individual view over a borrowed [`EvolutionContext`].
///
/// It only adds an index; every property and cache operation is forwarded to
/// the population context, and writes through it change the shared state.
pub struct IndividualContext<'a, C: Chromosome> {
    population: &'a EvolutionContext<C>,
    index: usize,
}

impl<'a, C: Chromosome> IndividualContext<'a, C> {
    pub fn new(population: &'a EvolutionContext<C>, index: usize) -> Self {
        Self { population, index }
    }

    /// The population context this view is bound to.
    pub fn population_context(&self) -> &'a EvolutionContext<C> {
        self.population
    }
}

impl<C: Chromosome> Clone for IndividualContext<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Chromosome> Copy for IndividualContext<'_, C> {}

impl<C: Chromosome> MetaHeuristicContext<C> for IndividualContext<'_, C> {
    fn ga(&self) -> Option<Arc<dyn GeneticAlgorithm>> {
        self.population.ga()
    }

    fn set_ga(&self, ga: Option<Arc<dyn GeneticAlgorithm>>) {
        self.population.set_ga(ga);
    }

    fn population(&self) -> Arc<Population<C>> {
        self.population.population()
    }

    fn set_population(&self, population: Arc<Population<C>>) {
        self.population.set_population(population);
    }

    fn count(&self) -> usize {
        self.population.count()
    }

    fn set_count(&self, count: usize) {
        self.population.set_count(count);
    }

    fn current_stage(&self) -> EvolutionStage {
        self.population.current_stage()
    }

    fn set_current_stage(&self, stage: EvolutionStage) {
        self.population.set_current_stage(stage);
    }

    fn generation_number(&self) -> usize {
        self.population.generation_number()
    }

    fn index(&self) -> usize {
        self.index
    }

    fn random(&self) -> &dyn Randomization {
        self.population.random()
    }

    fn get_individual(&self, _index: usize) -> IndividualContext<'_, C> {
        *self
    }

    fn get_or_add_erased(
        &self,
        key: CacheKey,
        factory: &mut dyn FnMut() -> Result<CachedValue>,
    ) -> Result<CachedValue> {
        self.population.get_or_add_erased(key, factory)
    }

    fn get_parameter_value_erased(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        name: &str,
    ) -> Result<CachedValue> {
        self.population.resolve_parameter(heuristic, name, self)
    }

    fn register_parameter(&self, name: &str, definition: Arc<dyn ParameterDefinition<C>>) {
        self.population.register_parameter(name, definition);
    }

    fn get_parameter_definition(&self, name: &str) -> Option<Arc<dyn ParameterDefinition<C>>> {
        self.population.get_parameter_definition(name)
    }
}

impl<C: Chromosome> fmt::Debug for IndividualContext<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndividualContext")
            .field("index", &self.index)
            .field("generation", &self.population.generation_number())
            .finish()
    }
}
