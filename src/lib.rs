pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod types;

pub use engines::evaluation::{simulate, Backtester, FitnessEvaluator, Individual};
pub use engines::generation::{optimize, EvolutionEngine, GenerationHistory, Genome, OptimizerConfig};
pub use error::{LeadLagError, Result};
pub use types::{ExitReason, PricePair, SimulationResult, Trade};
