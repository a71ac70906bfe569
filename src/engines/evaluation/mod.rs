pub mod backtester;
pub mod fitness;
pub mod portfolio;

pub use backtester::{simulate, Backtester, DEFAULT_INITIAL_CASH};
pub use fitness::{FitnessEvaluator, Individual};
pub use portfolio::{Portfolio, Position};
