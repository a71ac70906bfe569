use crate::error::{LeadLagError, Result};
use crate::types::PricePair;
use polars::prelude::*;
use std::path::Path;
use super::{
    types::{PairMetadata, RequiredColumn},
    validator::DataValidator,
};

const DATE: &str = "date";
const LEADER: &str = "leader";
const FOLLOWER: &str = "follower";

/// A price pair loaded from disk, with the dates of its bars when the source
/// files carried them.
#[derive(Debug, Clone)]
pub struct LoadedPair {
    pub prices: PricePair,
    pub dates: Option<Vec<String>>,
    pub metadata: PairMetadata,
}

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| {
                LeadLagError::DataLoading(format!(
                    "Failed to read CSV {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        Ok(df)
    }

    /// Load a leader and a follower price file into one aligned pair.
    ///
    /// When both files have a date column the rows are inner-joined on it and
    /// sorted; otherwise the series are aligned by position and truncated to
    /// the shorter one.
    pub fn load_pair<P: AsRef<Path>, Q: AsRef<Path>>(leader_path: P, follower_path: Q) -> Result<LoadedPair> {
        let leader_source = leader_path.as_ref().display().to_string();
        let follower_source = follower_path.as_ref().display().to_string();

        let leader_df = Self::load(&leader_path)?;
        let follower_df = Self::load(&follower_path)?;
        DataValidator::validate_minimum_rows(&leader_df, 2, &leader_source)?;
        DataValidator::validate_minimum_rows(&follower_df, 2, &follower_source)?;

        let leader_close = DataValidator::require_column(&leader_df, &RequiredColumn::Close, &leader_source)?;
        let follower_close =
            DataValidator::require_column(&follower_df, &RequiredColumn::Close, &follower_source)?;
        let leader_date = DataValidator::find_column(&leader_df, &RequiredColumn::Date);
        let follower_date = DataValidator::find_column(&follower_df, &RequiredColumn::Date);

        let (aligned, aligned_by_date) = match (leader_date, follower_date) {
            (Some(leader_date), Some(follower_date)) => {
                let left = Self::project(&leader_df, Some(leader_date), leader_close, LEADER)?;
                let right = Self::project(&follower_df, Some(follower_date), follower_close, FOLLOWER)?;
                (Self::join_on_date(left, right, &leader_source)?, true)
            }
            _ => {
                log::warn!(
                    "No shared date column in {} and {}; aligning rows by position",
                    leader_source,
                    follower_source
                );
                let rows = leader_df.height().min(follower_df.height());
                let left = Self::project(&leader_df.head(Some(rows)), None, leader_close, LEADER)?;
                let right = Self::project(&follower_df.head(Some(rows)), None, follower_close, FOLLOWER)?;
                (left.hstack(right.get_columns())?, false)
            }
        };

        DataValidator::validate_minimum_rows(&aligned, 2, "aligned pair")?;
        let leader = DataValidator::price_series(&aligned, LEADER, &leader_source)?;
        let follower = DataValidator::price_series(&aligned, FOLLOWER, &follower_source)?;
        let dates = if aligned_by_date {
            Some(Self::date_strings(&aligned)?)
        } else {
            None
        };

        let metadata = PairMetadata {
            leader_path: leader_source,
            follower_path: follower_source,
            leader_rows: leader_df.height(),
            follower_rows: follower_df.height(),
            aligned_rows: aligned.height(),
            aligned_by_date,
            first_date: dates.as_ref().and_then(|d| d.first().cloned()),
            last_date: dates.as_ref().and_then(|d| d.last().cloned()),
        };
        log::info!(
            "Loaded price pair: {} aligned bars (leader {} rows, follower {} rows)",
            metadata.aligned_rows,
            metadata.leader_rows,
            metadata.follower_rows
        );

        Ok(LoadedPair {
            prices: PricePair::new(leader, follower)?,
            dates,
            metadata,
        })
    }

    /// Keep only the date and close columns under canonical names.
    fn project(df: &DataFrame, date: Option<&str>, close: &str, name: &str) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(2);
        if let Some(date) = date {
            columns.push(col(date).alias(DATE));
        }
        columns.push(col(close).cast(DataType::Float64).alias(name));

        Ok(df.clone().lazy().select(columns).collect()?)
    }

    fn join_on_date(left: DataFrame, right: DataFrame, source: &str) -> Result<DataFrame> {
        for (df, side) in [(&left, LEADER), (&right, FOLLOWER)] {
            if df.column(DATE)?.as_materialized_series().n_unique()? != df.height() {
                return Err(LeadLagError::DataLoading(format!(
                    "{} file has duplicate dates",
                    side
                )));
            }
        }

        let joined = left
            .lazy()
            .join(
                right.lazy(),
                [col(DATE)],
                [col(DATE)],
                JoinArgs::new(JoinType::Inner),
            )
            .sort([DATE], SortMultipleOptions::default())
            .collect()?;

        if joined.height() == 0 {
            return Err(LeadLagError::DataLoading(format!(
                "{}: leader and follower share no dates",
                source
            )));
        }
        Ok(joined)
    }

    fn date_strings(df: &DataFrame) -> Result<Vec<String>> {
        let dates = df.column(DATE)?.cast(&DataType::String)?;
        Ok(dates
            .str()?
            .into_iter()
            .map(|d| d.unwrap_or_default().to_string())
            .collect())
    }
}
