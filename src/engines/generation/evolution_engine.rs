use crate::config::{BacktestingConfig, ConfigSection, EvolutionConfig, GenomeBounds};
use crate::engines::evaluation::{FitnessEvaluator, Individual};
use crate::engines::generation::{
    genome::Genome,
    operators::{crossover, mutate, random_genome, tournament_selection},
};
use crate::error::{LeadLagError, Result};
use crate::types::PricePair;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Everything one optimization run needs besides the prices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub evolution: EvolutionConfig,
    pub backtesting: BacktestingConfig,
    pub search_space: GenomeBounds,
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()?;
        self.backtesting.validate()?;
        self.search_space.validate()?;
        Ok(())
    }
}

/// Best fitness of every generation, in order. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationHistory {
    best_fitness: Vec<f64>,
}

impl GenerationHistory {
    pub fn push(&mut self, best_fitness: f64) {
        self.best_fitness.push(best_fitness);
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.best_fitness
    }

    pub fn len(&self) -> usize {
        self.best_fitness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_fitness.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.best_fitness.last().copied()
    }
}

pub trait ProgressCallback: Send {
    fn on_generation_start(&mut self, generation: usize);
    fn on_generation_complete(&mut self, generation: usize, best: &Individual, mutation_rate: f64);
    fn on_mutation_escalated(&mut self, generation: usize, mutation_rate: f64);
}

impl<T: ProgressCallback + ?Sized> ProgressCallback for &mut T {
    fn on_generation_start(&mut self, generation: usize) {
        (**self).on_generation_start(generation);
    }

    fn on_generation_complete(&mut self, generation: usize, best: &Individual, mutation_rate: f64) {
        (**self).on_generation_complete(generation, best, mutation_rate);
    }

    fn on_mutation_escalated(&mut self, generation: usize, mutation_rate: f64) {
        (**self).on_mutation_escalated(generation, mutation_rate);
    }
}

/// Counts non-improving generations and raises the mutation rate once the
/// count passes the configured patience.
struct StagnationTracker {
    base_rate: f64,
    current_rate: f64,
    previous_best: Option<f64>,
    stagnant_generations: usize,
}

impl StagnationTracker {
    fn new(base_rate: f64) -> Self {
        Self {
            base_rate,
            current_rate: base_rate,
            previous_best: None,
            stagnant_generations: 0,
        }
    }

    /// Returns true when the rate was escalated on this generation.
    fn observe(&mut self, best: f64, config: &EvolutionConfig) -> bool {
        let adaptive = &config.adaptive_mutation;
        if !adaptive.enabled {
            return false;
        }

        match self.previous_best {
            Some(previous) if best - previous <= adaptive.epsilon => {
                self.stagnant_generations += 1;
            }
            Some(_) => {
                self.stagnant_generations = 0;
                self.current_rate = self.base_rate;
            }
            None => self.stagnant_generations = 0,
        }
        self.previous_best = Some(best);

        if self.stagnant_generations > adaptive.patience {
            self.current_rate = (self.current_rate * adaptive.factor).min(adaptive.max_rate);
            self.stagnant_generations = 0;
            return true;
        }
        false
    }
}

/// Result of a finished run: the fittest individual of the final population
/// and the per-generation best fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub best: Individual,
    pub history: GenerationHistory,
}

pub struct EvolutionEngine {
    config: OptimizerConfig,
    evaluator: FitnessEvaluator,
    rng: StdRng,
}

impl EvolutionEngine {
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;

        let rng = match config.evolution.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let evaluator = FitnessEvaluator::new(&config.backtesting);

        Ok(Self {
            config,
            evaluator,
            rng,
        })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Run the evolution process
    pub fn run<C: ProgressCallback>(
        &mut self,
        prices: &PricePair,
        mut callback: C,
    ) -> Result<OptimizationOutcome> {
        let max_lag = self.config.search_space.lag.1;
        if prices.len() <= max_lag {
            return Err(LeadLagError::InvalidInput(format!(
                "{} bars cannot hold the largest lag of {} bars",
                prices.len(),
                max_lag
            )));
        }

        let evolution = self.config.evolution.clone();
        let population_size = evolution.population_size;
        let elite_count = ((evolution.elite_fraction * population_size as f64) as usize)
            .clamp(1, population_size);

        log::info!(
            "Starting evolution: population={}, generations={}, elite={}, bars={}",
            population_size,
            evolution.generations,
            elite_count,
            prices.len()
        );

        let initial = self.initialize_population();
        let mut population = self.evaluate_population(&initial, prices)?;
        let mut history = GenerationHistory::default();
        let mut stagnation = StagnationTracker::new(evolution.mutation_rate);

        for generation in 0..evolution.generations {
            callback.on_generation_start(generation);

            sort_by_fitness(&mut population);
            let best = &population[0];
            history.push(best.fitness);

            if stagnation.observe(best.fitness, &evolution) {
                log::info!(
                    "Generation {}: stagnation, mutation rate raised to {:.4}",
                    generation + 1,
                    stagnation.current_rate
                );
                callback.on_mutation_escalated(generation, stagnation.current_rate);
            }

            log::debug!(
                "Generation {}/{} | fit {:.4} | ret {:.2}% | mdd {:.2}% | calmar {:.2} | sortino {:.2} | trades {}",
                generation + 1,
                evolution.generations,
                best.fitness,
                best.metrics.total_return_pct,
                best.metrics.max_drawdown_pct,
                best.metrics.calmar,
                best.metrics.sortino,
                best.metrics.n_trades
            );
            callback.on_generation_complete(generation, best, stagnation.current_rate);

            population = self.create_next_generation(
                population,
                elite_count,
                stagnation.current_rate,
                prices,
            )?;
        }

        sort_by_fitness(&mut population);
        let best = population
            .into_iter()
            .next()
            .ok_or_else(|| LeadLagError::InvalidInput("population is empty".to_string()))?;

        log::info!(
            "Evolution finished: best fitness {:.4}, return {:.2}%, {} trades",
            best.fitness,
            best.metrics.total_return_pct,
            best.metrics.n_trades
        );

        Ok(OptimizationOutcome { best, history })
    }

    fn initialize_population(&mut self) -> Vec<Genome> {
        (0..self.config.evolution.population_size)
            .map(|_| random_genome(&self.config.search_space, &mut self.rng))
            .collect()
    }

    fn evaluate_population(&self, genomes: &[Genome], prices: &PricePair) -> Result<Vec<Individual>> {
        if self.config.evolution.parallel_evaluation {
            genomes
                .par_iter()
                .map(|genome| self.evaluator.evaluate(genome, prices))
                .collect()
        } else {
            genomes
                .iter()
                .map(|genome| self.evaluator.evaluate(genome, prices))
                .collect()
        }
    }

    /// Elites survive unchanged; the rest are bred by tournament selection,
    /// crossover and mutation. Offspring genomes are drawn first so the random
    /// stream does not depend on how they are evaluated.
    fn create_next_generation(
        &mut self,
        population: Vec<Individual>,
        elite_count: usize,
        mutation_rate: f64,
        prices: &PricePair,
    ) -> Result<Vec<Individual>> {
        let population_size = self.config.evolution.population_size;
        let tournament_size = self.config.evolution.tournament_size;
        let bounds = &self.config.search_space;

        let mut offspring = Vec::with_capacity(population_size.saturating_sub(elite_count));
        while elite_count + offspring.len() < population_size {
            let parent1 = tournament_selection(&population, tournament_size, &mut self.rng);
            let parent2 = tournament_selection(&population, tournament_size, &mut self.rng);
            let (Some(parent1), Some(parent2)) = (parent1, parent2) else {
                return Err(LeadLagError::InvalidInput(
                    "cannot select parents from an empty population".to_string(),
                ));
            };

            let child = crossover(&parent1.genome, &parent2.genome, bounds, &mut self.rng);
            offspring.push(mutate(&child, mutation_rate, bounds, &mut self.rng));
        }

        let mut next_generation: Vec<Individual> =
            population.into_iter().take(elite_count).collect();
        next_generation.extend(self.evaluate_population(&offspring, prices)?);

        Ok(next_generation)
    }
}

/// Descending by fitness; ties keep their current order.
fn sort_by_fitness(population: &mut [Individual]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Run a complete optimization with a silent progress callback.
pub fn optimize(prices: &PricePair, config: &OptimizerConfig) -> Result<(Individual, GenerationHistory)> {
    let mut engine = EvolutionEngine::new(config.clone())?;
    let outcome = engine.run(prices, super::progress::SilentProgressCallback)?;
    Ok((outcome.best, outcome.history))
}
