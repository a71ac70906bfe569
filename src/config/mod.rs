pub mod traits;
pub mod search_space;
pub mod backtesting;
pub mod evolution;
pub mod walk_forward;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use search_space::GenomeBounds;
pub use backtesting::{BacktestingConfig, FitnessWeights};
pub use evolution::{AdaptiveMutationConfig, EvolutionConfig};
pub use walk_forward::WalkForwardConfig;
pub use traits::ConfigSection;
