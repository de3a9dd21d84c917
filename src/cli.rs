use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};
use fastnum::D128;

use crate::{report::SAMPLE_FILE_NAME, session::DEFAULT_CURRENCY};

const DEFAULT_PRICE_ARG: &str = "10000";

/// Summarizes a crypto exchange CSV export: holdings, cost basis, profit and ROI.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a transaction export and print the investment report
    Report(ReportArgs),

    /// Print a sample CSV in the expected format
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Transaction CSV exported from the exchange
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Currency code to report on (e.g. ETH, XBT)
    #[arg(short, long, env = "LUNO_CURRENCY", default_value = DEFAULT_CURRENCY)]
    pub currency: String,

    /// Current price of one unit of the currency, in MYR
    #[arg(
        short,
        long,
        env = "LUNO_PRICE",
        value_parser = parse_price,
        default_value = DEFAULT_PRICE_ARG
    )]
    pub price: D128,

    /// List every transaction
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    /// Write the sample to a file instead of stdout
    #[arg(
        short,
        long,
        value_hint = ValueHint::FilePath,
        num_args = 0..=1,
        default_missing_value = SAMPLE_FILE_NAME
    )]
    pub output: Option<PathBuf>,
}

pub fn parse_price(s: &str) -> Result<D128, String> {
    match s.trim().parse::<D128>() {
        Ok(price) if price.is_finite() => Ok(price),
        _ => Err(format!("invalid price '{s}'; expected a decimal number")),
    }
}
