use metaheur::{
    caching::Scope,
    chromosome::Chromosome,
    error::{GeneticError, Result},
    metaheuristics::{
        DefaultMetaHeuristic, EvolutionContext, HeuristicId, MatchMetaHeuristic, MatchOptions,
        MatchingTechnique, MetaHeuristic, MetaHeuristicContext, MetaHeuristicsFactory,
        ProbabilityStrategy,
    },
    operators::{Crossover, Mutation, Reinsertion},
    population::Population,
    rng::{Randomization, SeededRandomization},
    selection::Selection,
};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
struct Individual {
    id: usize,
    fitness: f64,
}

impl Chromosome for Individual {
    fn fitness(&self) -> Option<f64> {
        Some(self.fitness)
    }
}

// Two parents, two fresh children
#[derive(Debug)]
struct SwapCrossover;

impl Crossover<Individual> for SwapCrossover {
    fn parents_number(&self) -> usize {
        2
    }

    fn children_number(&self) -> usize {
        2
    }

    fn cross(&self, parents: &[Arc<Individual>], _random: &dyn Randomization) -> Result<Vec<Arc<Individual>>> {
        if parents.len() != 2 {
            return Err(GeneticError::Crossover(format!(
                "expected 2 parents, got {}",
                parents.len()
            )));
        }
        Ok(vec![
            Arc::new(Individual {
                id: parents[1].id,
                fitness: parents[0].fitness,
            }),
            Arc::new(Individual {
                id: parents[0].id,
                fitness: parents[1].fitness,
            }),
        ])
    }
}

// Records the ids of every parent set handed to it
#[derive(Debug)]
struct RecordingHeuristic {
    id: HeuristicId,
    matches: Mutex<Vec<Vec<usize>>>,
}

impl RecordingHeuristic {
    fn new() -> Self {
        Self {
            id: HeuristicId::next(),
            matches: Mutex::new(Vec::new()),
        }
    }

    fn matches(&self) -> Vec<Vec<usize>> {
        self.matches.lock().unwrap().clone()
    }
}

impl MetaHeuristic<Individual> for RecordingHeuristic {
    fn id(&self) -> HeuristicId {
        self.id
    }

    fn select_parents(
        &self,
        ctx: &dyn MetaHeuristicContext<Individual>,
        selection: &dyn Selection<Individual>,
        count: usize,
    ) -> Result<Vec<Arc<Individual>>> {
        selection.select_chromosomes(count, &ctx.population(), ctx.random())
    }

    fn match_parents_and_cross(
        &self,
        _ctx: &dyn MetaHeuristicContext<Individual>,
        _crossover: &dyn Crossover<Individual>,
        _probability: f32,
        parents: &[Arc<Individual>],
    ) -> Result<Option<Vec<Arc<Individual>>>> {
        self.matches
            .lock()
            .unwrap()
            .push(parents.iter().map(|p| p.id).collect());
        Ok(Some(Vec::new()))
    }

    fn mutate_chromosome(
        &self,
        _ctx: &dyn MetaHeuristicContext<Individual>,
        _mutation: &dyn Mutation<Individual>,
        _probability: f32,
        _offspring: &mut Individual,
    ) -> Result<()> {
        Ok(())
    }

    fn reinsert(
        &self,
        _ctx: &dyn MetaHeuristicContext<Individual>,
        _reinsertion: &dyn Reinsertion<Individual>,
        offspring: &[Arc<Individual>],
        _parents: &[Arc<Individual>],
    ) -> Result<Vec<Arc<Individual>>> {
        Ok(offspring.to_vec())
    }
}

fn population(fitness: &[f64]) -> Population<Individual> {
    Population::from_chromosomes(
        0,
        fitness
            .iter()
            .enumerate()
            .map(|(id, &fitness)| Individual { id, fitness })
            .collect(),
    )
}

fn context(fitness: &[f64], seed: u64) -> EvolutionContext<Individual> {
    EvolutionContext::new(Arc::new(population(fitness)))
        .with_random(Arc::new(SeededRandomization::new(seed)))
}

#[test]
fn test_random_matching_end_to_end() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 42);
    let parents = ctx.population().chromosomes().to_vec();
    let heuristic = MatchMetaHeuristic::new(Arc::new(DefaultMetaHeuristic::new()), 2)
        .with_matching_techniques(vec![MatchingTechnique::Randomize]);

    let offspring = heuristic
        .match_parents_and_cross(&ctx, &SwapCrossover, 1.0, &parents)
        .unwrap()
        .expect("the step should have run");

    assert_eq!(offspring.len(), 4);
    for child in &offspring {
        assert!(parents.iter().all(|parent| !Arc::ptr_eq(parent, child)));
    }
}

#[test]
fn test_probability_gate_extremes() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 7);
    let parents = ctx.population().chromosomes().to_vec();
    let heuristic = MatchMetaHeuristic::new(Arc::new(DefaultMetaHeuristic::new()), 1)
        .with_matching_techniques(vec![MatchingTechnique::Randomize])
        .with_crossover_probability_strategy(ProbabilityStrategy::test());

    for index in 0..50 {
        let individual = ctx.get_individual(index % 4);
        let declined = heuristic
            .match_parents_and_cross(&individual, &SwapCrossover, 0.0, &parents)
            .unwrap();
        assert!(declined.is_none());

        let ran = heuristic
            .match_parents_and_cross(&individual, &SwapCrossover, 1.0, &parents)
            .unwrap()
            .expect("gate at 1.0 always runs");
        assert!(!ran.is_empty());
    }
}

#[test]
fn test_roulette_wheel_follows_fitness_share() {
    let mut fitness = vec![1.0; 10];
    fitness[0] = 1000.0;
    let ctx = context(&fitness, 2024);
    let parents = ctx.population().chromosomes().to_vec();
    let recorder = Arc::new(RecordingHeuristic::new());
    let heuristic = MatchMetaHeuristic::new(recorder.clone(), 1)
        .with_matching_techniques(vec![MatchingTechnique::RouletteWheel]);

    let samples = 10_000;
    ctx.set_index(5);
    for _ in 0..samples {
        heuristic
            .match_parents_and_cross(&ctx, &SwapCrossover, 1.0, &parents)
            .unwrap();
    }

    let dominant = recorder
        .matches()
        .iter()
        .filter(|set| set[0] == 5 && set[1] == 0)
        .count();
    let share = dominant as f64 / samples as f64;
    let expected = 1000.0 / 1009.0;
    assert!(
        (share - expected).abs() < 0.01,
        "dominant share {} too far from {}",
        share,
        expected
    );

    // one wheel for the whole generation
    assert_eq!(ctx.cache().len(), 1);
}

#[test]
fn test_roulette_scope_per_individual() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 3);
    let parents = ctx.population().chromosomes().to_vec();
    let heuristic = MetaHeuristicsFactory::roulette_matching(
        Arc::new(RecordingHeuristic::new()),
        1,
        Scope::GENERATION | Scope::META_HEURISTIC | Scope::INDIVIDUAL,
    );

    for index in 0..4 {
        heuristic
            .match_parents_and_cross(&ctx.get_individual(index), &SwapCrossover, 1.0, &parents)
            .unwrap();
    }

    assert_eq!(ctx.cache().len(), 4);
}

#[test]
fn test_neighbor_at_last_index_is_omitted() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 11);
    let parents = ctx.population().chromosomes().to_vec();
    let recorder = Arc::new(RecordingHeuristic::new());
    let heuristic = MetaHeuristicsFactory::neighbor_matching(recorder.clone(), 1);

    let result = heuristic
        .match_parents_and_cross(&ctx.get_individual(3), &SwapCrossover, 1.0, &parents)
        .unwrap();

    assert_eq!(result, Some(Vec::new()));
    assert_eq!(recorder.matches(), vec![vec![3]]);
}

#[test]
fn test_incomplete_match_is_skipped_by_leaf() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 11);
    let parents = ctx.population().chromosomes().to_vec();
    let heuristic = MetaHeuristicsFactory::neighbor_matching(Arc::new(DefaultMetaHeuristic::new()), 1);

    let result = heuristic
        .match_parents_and_cross(&ctx.get_individual(3), &SwapCrossover, 1.0, &parents)
        .unwrap();

    // the step ran but the lone parent could not be crossed
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn test_best_matching_pairs_with_best() {
    let ctx = context(&[5.0, 1.0, 9.0, 2.0], 1);
    let parents = ctx.population().chromosomes().to_vec();
    let recorder = Arc::new(RecordingHeuristic::new());
    let heuristic = MetaHeuristicsFactory::best_matching(recorder.clone(), 2);

    heuristic
        .match_parents_and_cross(&ctx.get_individual(1), &SwapCrossover, 1.0, &parents)
        .unwrap();

    assert_eq!(recorder.matches(), vec![vec![1, 2], vec![2, 2]]);
}

#[test]
fn test_heuristic_instances_keep_separate_wheels() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 9);
    let parents = ctx.population().chromosomes().to_vec();
    let first = MetaHeuristicsFactory::roulette_matching(
        Arc::new(DefaultMetaHeuristic::new()),
        1,
        Scope::GENERATION | Scope::META_HEURISTIC,
    );
    let second = MetaHeuristicsFactory::roulette_matching(
        Arc::new(DefaultMetaHeuristic::new()),
        1,
        Scope::GENERATION | Scope::META_HEURISTIC,
    );

    first
        .match_parents_and_cross(&ctx, &SwapCrossover, 1.0, &parents)
        .unwrap();
    second
        .match_parents_and_cross(&ctx, &SwapCrossover, 1.0, &parents)
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(ctx.cache().len(), 2);
}

#[test]
fn test_configuration_errors() {
    assert!(matches!(
        MatchingTechnique::from_str("Tournament"),
        Err(GeneticError::Configuration(_))
    ));

    let ctx = context(&[1.0, 2.0, 3.0], 5);
    let parents = ctx.population().chromosomes().to_vec();
    let heuristic = MatchMetaHeuristic::new(Arc::new(DefaultMetaHeuristic::new()), 1);
    assert!(matches!(
        heuristic.match_parents_and_cross(&ctx, &SwapCrossover, 1.0, &parents),
        Err(GeneticError::Configuration(_))
    ));

    let options = MatchOptions::builder().number_of_matches(0).build();
    assert!(MatchMetaHeuristic::<Individual>::from_options(Arc::new(DefaultMetaHeuristic::new()), options).is_err());
}

#[test]
fn test_pipeline_from_options() {
    let ctx = context(&[1.0, 2.0, 3.0, 4.0], 13);
    let parents = ctx.population().chromosomes().to_vec();
    let options = MatchOptions::builder()
        .number_of_matches(3)
        .matching_technique(MatchingTechnique::Randomize)
        .crossover_probability_strategy(ProbabilityStrategy::overwrite_and_test(1.0))
        .build();
    let pipeline = MetaHeuristicsFactory::matched_pipeline::<Individual>(options, None).unwrap();

    let offspring = pipeline
        .match_parents_and_cross(&ctx.get_individual(2), &SwapCrossover, 0.0, &parents)
        .unwrap()
        .unwrap();
    assert_eq!(offspring.len(), 6);
}
