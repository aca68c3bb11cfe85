use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use super::{ContextExt, MetaHeuristic, MetaHeuristicContext};
use crate::caching::{CacheKey, CachedValue, Scope};
use crate::chromosome::Chromosome;
use crate::error::Result;

/// Generator of a parameter value.
pub type Generator<'g, C, T> =
    dyn Fn(&dyn MetaHeuristic<C>, &dyn MetaHeuristicContext<C>) -> Result<T> + Send + Sync + 'g;

/// A lazily evaluated, scope-aware cached value.
///
/// For a fixed canonical key (name, generation, stage and, depending on the
/// scope, heuristic instance, individual and thread) the generator runs at
/// most once; later reads return the same `Arc`.
///
/// A parameter may borrow data for `'g`, which suits values built on the
/// fly from a call's arguments. Only `'static` parameters can be registered
/// in a context as named [`ParameterDefinition`]s.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use metaheur::caching::Scope;
/// use metaheur::chromosome::Chromosome;
/// use metaheur::metaheuristics::{DefaultMetaHeuristic, EvolutionContext, MetaHeuristicContext, Parameter};
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
/// let population = Population::from_chromosomes(0, vec![Value(1.0), Value(3.0)]);
/// let ctx = EvolutionContext::new(Arc::new(population));
/// let heuristic = DefaultMetaHeuristic::new();
///
/// let mean_fitness = Parameter::new("meanFitness", Scope::GENERATION, |_, c: &dyn MetaHeuristicContext<Value>| {
///     let population = c.population();
///     let total: f64 = population.chromosomes().iter().filter_map(|c| c.fitness()).sum();
///     Ok(total / population.size() as f64)
/// });
///
/// assert_eq!(*mean_fitness.get_or_add(&heuristic, &ctx).unwrap(), 2.0);
/// ```
pub struct Parameter<'g, C: Chromosome, T> {
    name: String,
    scope: Scope,
    generator: Box<Generator<'g, C, T>>,
}

impl<'g, C, T> Parameter<'g, C, T>
where
    C: Chromosome,
    T: Any + Send + Sync,
{
    pub fn new<F>(name: impl Into<String>, scope: Scope, generator: F) -> Self
    where
        F: Fn(&dyn MetaHeuristic<C>, &dyn MetaHeuristicContext<C>) -> Result<T> + Send + Sync + 'g,
    {
        Self {
            name: name.into(),
            scope,
            generator: Box::new(generator),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Runs the generator without consulting the cache.
    pub fn generate(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
    ) -> Result<T> {
        (self.generator)(heuristic, ctx)
    }

    /// Canonical key of this parameter for a request by `heuristic` through `ctx`.
    pub fn key(&self, heuristic: &dyn MetaHeuristic<C>, ctx: &dyn MetaHeuristicContext<C>) -> CacheKey {
        CacheKey::resolve(&self.name, self.scope, heuristic.id(), ctx)
    }

    /// Returns the memoized value, generating it on first request.
    ///
    /// # Errors
    ///
    /// Propagates generator failures; nothing is cached in that case and the
    /// next request runs the generator again.
    pub fn get_or_add(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
    ) -> Result<Arc<T>> {
        ctx.get_or_add(self.key(heuristic, ctx), || self.generate(heuristic, ctx))
    }
}

impl<C: Chromosome, T> fmt::Debug for Parameter<'_, C, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// A named, introspectable parameter registered in a context.
///
/// Nested heuristics discover definitions by name through
/// [`MetaHeuristicContext::get_parameter_definition`] and resolve them with
/// [`ContextExt::get_parameter_value`].
pub trait ParameterDefinition<C: Chromosome>: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn scope(&self) -> Scope;

    /// Name of the generated value's type.
    fn value_type(&self) -> &'static str;

    /// Runs the generator and erases the value's type.
    fn generate(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
    ) -> Result<CachedValue>;
}

impl<C, T> ParameterDefinition<C> for Parameter<'static, C, T>
where
    C: Chromosome,
    T: Any + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn scope(&self) -> Scope {
        self.scope
    }

    fn value_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn generate(
        &self,
        heuristic: &dyn MetaHeuristic<C>,
        ctx: &dyn MetaHeuristicContext<C>,
    ) -> Result<CachedValue> {
        Parameter::generate(self, heuristic, ctx).map(|value| Arc::new(value) as CachedValue)
    }
}
