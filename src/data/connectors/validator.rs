use crate::error::{LeadLagError, Result};
use polars::prelude::*;
use super::types::RequiredColumn;

pub struct DataValidator;

impl DataValidator {
    /// Find column by checking aliases
    pub fn find_column<'a>(df: &'a DataFrame, required: &RequiredColumn) -> Option<&'a str> {
        let columns = df.get_column_names();
        required
            .aliases()
            .into_iter()
            .find_map(|alias| columns.iter().copied().find(|col| col.as_str() == alias))
            .map(|col| col.as_str())
    }

    pub fn require_column<'a>(df: &'a DataFrame, required: &RequiredColumn, source: &str) -> Result<&'a str> {
        Self::find_column(df, required).ok_or_else(|| {
            LeadLagError::DataLoading(format!(
                "{}: missing required column {} (tried aliases: {:?})",
                source,
                required.as_str(),
                required.aliases()
            ))
        })
    }

    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize, source: &str) -> Result<()> {
        if df.height() < min_rows {
            return Err(LeadLagError::DataLoading(format!(
                "{}: has {} rows, need at least {}",
                source,
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Extract a price column as f64, rejecting nulls and non-positive values.
    pub fn price_series(df: &DataFrame, column: &str, source: &str) -> Result<Vec<f64>> {
        let series = df.column(column)?.cast(&DataType::Float64)?;
        let values = series.f64()?;

        values
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(price) if price.is_finite() && price > 0.0 => Ok(price),
                Some(price) => Err(LeadLagError::DataLoading(format!(
                    "{}: row {} has non-positive price {}",
                    source, row, price
                ))),
                None => Err(LeadLagError::DataLoading(format!(
                    "{}: row {} has no price",
                    source, row
                ))),
            })
            .collect()
    }
}
