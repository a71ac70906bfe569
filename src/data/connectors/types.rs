use serde::{Deserialize, Serialize};

/// Columns a price CSV must provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredColumn {
    Date,
    Close,
}

impl RequiredColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Close => "close",
        }
    }

    /// Common alternative column names
    pub fn aliases(&self) -> Vec<&'static str> {
        match self {
            Self::Date => vec!["date", "Date", "DATE", "datetime", "Datetime", "timestamp", "time"],
            Self::Close => vec!["close", "Close", "CLOSE", "adj_close", "Adj Close", "c"],
        }
    }
}

/// Where a price pair came from and how it was aligned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMetadata {
    pub leader_path: String,
    pub follower_path: String,
    pub leader_rows: usize,
    pub follower_rows: usize,
    pub aligned_rows: usize,
    pub aligned_by_date: bool,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}
