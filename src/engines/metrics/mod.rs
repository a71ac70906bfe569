pub mod consistency;
pub mod engine;
pub mod profitability;
pub mod risk;

pub use consistency::{ConsistencyMetrics, WindowConsistency};
pub use engine::{MetricsEngine, PerformanceReport};
pub use profitability::ProfitabilityMetrics;
pub use risk::RiskMetrics;
