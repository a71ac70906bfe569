mod csv;
mod types;
mod validator;

pub use csv::{CsvConnector, LoadedPair};
pub use types::{PairMetadata, RequiredColumn};
pub use validator::DataValidator;
