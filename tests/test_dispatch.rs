use metaheur::{
    caching::{Scope, ScopedCache},
    chromosome::Chromosome,
    error::Result,
    evolution::{DispatchOptions, EvolutionStage, GeneticAlgorithm, GenerationDispatcher},
    metaheuristics::{
        EvolutionContext, MatchOptions, MatchingTechnique, MetaHeuristicContext,
        MetaHeuristicsFactory, ProbabilityStrategy,
    },
    operators::{Crossover, Mutation, Reinsertion},
    population::Population,
    rng::{Randomization, SeededRandomization},
    selection::Selection,
};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
struct XCoordinate {
    x: f64,
}

impl XCoordinate {
    fn new(x: f64) -> Self {
        Self { x }
    }
}

impl Chromosome for XCoordinate {
    // Closer to 10 is better
    fn fitness(&self) -> Option<f64> {
        Some(1.0 / (1.0 + (self.x - 10.0).abs()))
    }
}

#[derive(Debug)]
struct Midpoint;

impl Crossover<XCoordinate> for Midpoint {
    fn parents_number(&self) -> usize {
        2
    }

    fn children_number(&self) -> usize {
        2
    }

    fn cross(&self, parents: &[Arc<XCoordinate>], random: &dyn Randomization) -> Result<Vec<Arc<XCoordinate>>> {
        let blend = random.gen_double();
        let (a, b) = (parents[0].x, parents[1].x);
        Ok(vec![
            Arc::new(XCoordinate::new(a * blend + b * (1.0 - blend))),
            Arc::new(XCoordinate::new(b * blend + a * (1.0 - blend))),
        ])
    }
}

#[derive(Debug)]
struct Nudge;

impl Mutation<XCoordinate> for Nudge {
    fn mutate(&self, chromosome: &mut XCoordinate, probability: f32, random: &dyn Randomization) -> Result<()> {
        if random.gen_double() < f64::from(probability) {
            chromosome.x += random.gen_double() - 0.5;
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Truncation;

impl Selection<XCoordinate> for Truncation {
    fn select_chromosomes(
        &self,
        number: usize,
        population: &Population<XCoordinate>,
        _random: &dyn Randomization,
    ) -> Result<Vec<Arc<XCoordinate>>> {
        let mut sorted = population.chromosomes().to_vec();
        sorted.sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());
        Ok(sorted.into_iter().cycle().take(number).collect())
    }
}

#[derive(Debug)]
struct Elitist {
    size: usize,
}

impl Reinsertion<XCoordinate> for Elitist {
    fn select_chromosomes(
        &self,
        _population: &Population<XCoordinate>,
        offspring: &[Arc<XCoordinate>],
        parents: &[Arc<XCoordinate>],
    ) -> Result<Vec<Arc<XCoordinate>>> {
        let mut pool: Vec<_> = offspring.iter().chain(parents).cloned().collect();
        pool.sort_by(|a, b| b.fitness().partial_cmp(&a.fitness()).unwrap());
        pool.truncate(self.size);
        Ok(pool)
    }
}

#[derive(Debug)]
struct Settings;

impl GeneticAlgorithm for Settings {
    fn generations_number(&self) -> usize {
        0
    }

    fn crossover_probability(&self) -> f32 {
        0.9
    }

    fn mutation_probability(&self) -> f32 {
        0.5
    }
}

fn run(options: DispatchOptions, size: usize, generations: usize) -> Population<XCoordinate> {
    let heuristic = MetaHeuristicsFactory::matched_pipeline(
        MatchOptions::builder()
            .number_of_matches(1)
            .matching_technique(MatchingTechnique::RouletteWheel)
            .roulette_caching_scope(Scope::GENERATION | Scope::META_HEURISTIC)
            .mutation_probability_strategy(ProbabilityStrategy::test())
            .build(),
        None,
    )
    .unwrap();
    let dispatcher = GenerationDispatcher::new(heuristic, options);
    let cache = Arc::new(ScopedCache::new());
    let random: Arc<dyn Randomization> = Arc::new(SeededRandomization::new(99));

    let mut population = Arc::new(Population::from_chromosomes(
        0,
        (0..size).map(|i| XCoordinate::new(i as f64 * 0.1)).collect(),
    ));

    for generation in 0..generations {
        let ctx = EvolutionContext::new(Arc::clone(&population))
            .with_cache(Arc::clone(&cache))
            .with_random(Arc::clone(&random))
            .with_ga(Arc::new(Settings));
        dispatcher.register_parameters(&ctx).unwrap();

        let ga = ctx.ga().unwrap();
        let parents = dispatcher.select(&ctx, &Truncation, size).unwrap();
        let mut offspring = dispatcher
            .cross(&ctx, &Midpoint, ga.crossover_probability(), &parents)
            .unwrap();
        dispatcher
            .mutate(&ctx, &Nudge, ga.mutation_probability(), &mut offspring)
            .unwrap();
        let next = dispatcher
            .reinsert(&ctx, &Elitist { size }, &offspring, &parents)
            .unwrap();

        assert_eq!(ctx.current_stage(), EvolutionStage::Reinsertion);
        assert!(cache.len() <= 1, "only this generation's wheel may be cached");
        population = Arc::new(Population::new(generation + 1, next));
    }

    Arc::try_unwrap(population).unwrap_or_else(|shared| (*shared).clone())
}

#[test]
fn test_sequential_generations() {
    let result = run(DispatchOptions::sequential(), 20, 10);

    assert_eq!(result.generation_number(), 10);
    assert_eq!(result.size(), 20);
    let start_best = XCoordinate::new(19.0 * 0.1).fitness().unwrap();
    assert!(result.best_chromosome().unwrap().fitness().unwrap() >= start_best);
}

#[test]
fn test_parallel_generations() {
    let options = DispatchOptions::builder().parallel_threshold(8).build();
    let result = run(options, 32, 5);

    assert_eq!(result.generation_number(), 5);
    assert_eq!(result.size(), 32);
    // elitist reinsertion never loses the best starting point
    let start_best = XCoordinate::new(31.0 * 0.1).fitness().unwrap();
    assert!(result.best_chromosome().unwrap().fitness().unwrap() >= start_best);
}
