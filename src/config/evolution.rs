use super::traits::ConfigSection;
use crate::error::LeadLagError;
use serde::{Deserialize, Serialize};

/// Mutation-rate escalation after a run of non-improving generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveMutationConfig {
    pub enabled: bool,
    /// Improvements at or below this count as stagnant.
    pub epsilon: f64,
    /// Stagnant generations tolerated before escalating.
    pub patience: usize,
    pub factor: f64,
    pub max_rate: f64,
}

impl Default for AdaptiveMutationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            epsilon: 1e-6,
            patience: 10,
            factor: 10.0,
            max_rate: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub generations: usize,
    pub elite_fraction: f64,
    pub mutation_rate: f64,
    pub tournament_size: usize,
    pub seed: Option<u64>,
    pub parallel_evaluation: bool,
    pub adaptive_mutation: AdaptiveMutationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 150,
            generations: 60,
            elite_fraction: 0.2,
            mutation_rate: 0.3,
            tournament_size: 3,
            seed: Some(42),
            parallel_evaluation: false,
            adaptive_mutation: AdaptiveMutationConfig::default(),
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), LeadLagError> {
        if self.population_size < 2 {
            return Err(LeadLagError::Configuration(
                "Population size must be at least 2".to_string()
            ));
        }
        if self.generations == 0 {
            return Err(LeadLagError::Configuration(
                "At least one generation is required".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.elite_fraction) {
            return Err(LeadLagError::Configuration(
                "Elite fraction must be between 0 and 1".to_string()
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(LeadLagError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(LeadLagError::Configuration(
                "Tournament size must be between 1 and the population size".to_string()
            ));
        }
        let adaptive = &self.adaptive_mutation;
        if adaptive.enabled {
            if adaptive.factor < 1.0 {
                return Err(LeadLagError::Configuration(
                    "Adaptive mutation factor must be at least 1".to_string()
                ));
            }
            if !(0.0..=1.0).contains(&adaptive.max_rate) {
                return Err(LeadLagError::Configuration(
                    "Adaptive mutation cap must be between 0 and 1".to_string()
                ));
            }
        }
        Ok(())
    }
}
