pub mod connectors;
pub mod export;

pub use connectors::{CsvConnector, LoadedPair, PairMetadata};
pub use export::{read_genome, write_equity_csv, write_json, write_trades_csv, RunReport};
