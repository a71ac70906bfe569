pub mod evolution_engine;
pub mod genome;
pub mod operators;
pub mod optimisation;
pub mod progress;

pub use genome::Genome;
pub use evolution_engine::{
    optimize, EvolutionEngine, GenerationHistory, OptimizationOutcome, OptimizerConfig,
    ProgressCallback,
};
pub use progress::{
    ChannelProgressCallback, ConsoleProgressCallback, ProgressMessage, SilentProgressCallback,
};
pub use optimisation::{
    methods::{
        base::{AggregateMetrics, AggregatedResult, ValidationMethod, ValidationResult},
        wfo::WalkForwardMethod,
    },
    splitters::{
        base::DataSplitter,
        types::{DataSplit, SplitConfig, WindowType},
        wfo::WalkForwardSplitter,
    },
};
