use crate::data::connectors::PairMetadata;
use crate::engines::generation::Genome;
use crate::error::Result;
use crate::types::{SimulationResult, Trade};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON envelope written after every CLI run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<T: Serialize> {
    pub command: String,
    pub generated_at: String,
    pub data: Option<PairMetadata>,
    pub result: T,
}

impl<T: Serialize> RunReport<T> {
    pub fn new(command: &str, data: Option<PairMetadata>, result: T) -> Self {
        Self {
            command: command.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            data,
            result,
        }
    }
}

fn bar_date(dates: Option<&[String]>, bar: Option<usize>) -> Option<String> {
    match (dates, bar) {
        (Some(dates), Some(bar)) => dates.get(bar).cloned(),
        _ => None,
    }
}

/// One row per trade, with the equity reached after each closed trade.
pub fn trades_frame(result: &SimulationResult, dates: Option<&[String]>) -> Result<DataFrame> {
    let trades: &[Trade] = &result.trades;

    let mut equity = result.initial_cash;
    let equity_after: Vec<Option<f64>> = trades
        .iter()
        .map(|t| {
            t.pnl.map(|pnl| {
                equity += pnl;
                equity
            })
        })
        .collect();

    let mut df = df!(
        "signal_bar" => trades.iter().map(|t| t.signal_bar as u64).collect::<Vec<_>>(),
        "entry_bar" => trades.iter().map(|t| t.entry_bar as u64).collect::<Vec<_>>(),
        "entry_price" => trades.iter().map(|t| t.entry_price).collect::<Vec<_>>(),
        "size" => trades.iter().map(|t| t.size).collect::<Vec<_>>(),
        "entry_fee" => trades.iter().map(|t| t.entry_fee).collect::<Vec<_>>(),
        "exit_bar" => trades.iter().map(|t| t.exit_bar.map(|b| b as u64)).collect::<Vec<_>>(),
        "exit_price" => trades.iter().map(|t| t.exit_price).collect::<Vec<_>>(),
        "exit_fee" => trades.iter().map(|t| t.exit_fee).collect::<Vec<_>>(),
        "pnl" => trades.iter().map(|t| t.pnl).collect::<Vec<_>>(),
        "return_pct" => trades.iter().map(|t| t.return_pct()).collect::<Vec<_>>(),
        "exit_reason" => trades.iter().map(|t| t.exit_reason.map(|r| r.as_str())).collect::<Vec<_>>(),
        "equity_after" => equity_after,
    )?;

    if dates.is_some() {
        let entry_dates: Vec<Option<String>> = trades
            .iter()
            .map(|t| bar_date(dates, Some(t.entry_bar)))
            .collect();
        let exit_dates: Vec<Option<String>> =
            trades.iter().map(|t| bar_date(dates, t.exit_bar)).collect();
        df.with_column(Column::new("entry_date".into(), entry_dates))?;
        df.with_column(Column::new("exit_date".into(), exit_dates))?;
    }

    Ok(df)
}

pub fn equity_frame(result: &SimulationResult, dates: Option<&[String]>) -> Result<DataFrame> {
    let bars: Vec<u64> = (0..result.equity_curve.len() as u64).collect();
    let mut df = df!(
        "bar" => bars,
        "equity" => result.equity_curve.clone(),
    )?;

    if let Some(dates) = dates {
        let column: Vec<Option<String>> = (0..result.equity_curve.len())
            .map(|bar| dates.get(bar).cloned())
            .collect();
        df.with_column(Column::new("date".into(), column))?;
    }
    Ok(df)
}

pub fn write_csv<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    log::info!("Wrote {} rows to {}", df.height(), path.as_ref().display());
    Ok(())
}

pub fn write_trades_csv<P: AsRef<Path>>(
    result: &SimulationResult,
    dates: Option<&[String]>,
    path: P,
) -> Result<()> {
    let mut df = trades_frame(result, dates)?;
    write_csv(&mut df, path)
}

pub fn write_equity_csv<P: AsRef<Path>>(
    result: &SimulationResult,
    dates: Option<&[String]>,
    path: P,
) -> Result<()> {
    let mut df = equity_frame(result, dates)?;
    write_csv(&mut df, path)
}

pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    log::info!("Wrote {}", path.as_ref().display());
    Ok(())
}

/// Read a genome from JSON. Both long field names and the short `tp`/`sl`
/// forms are accepted.
pub fn read_genome<P: AsRef<Path>>(path: P) -> Result<Genome> {
    let file = File::open(path.as_ref())?;
    let genome: Genome = serde_json::from_reader(std::io::BufReader::new(file))?;
    genome.validate()?;
    Ok(genome)
}
