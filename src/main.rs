use std::{fs, io};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr, bail};

use crate::{
    cli::{Cli, Command, ReportArgs, SampleArgs},
    report::SAMPLE_CSV,
    session::{Event, Session},
};

mod cli;
mod domain;
mod engine;
mod metrics;
mod report;
mod session;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Report(args) => run_report(args),
        Command::Sample(args) => write_sample(args),
    }
}

fn run_report(args: ReportArgs) -> eyre::Result<()> {
    let contents = fs::read(&args.file)
        .wrap_err_with(|| format!("Could not read {}", args.file.display()))?;

    let mut session = Session::default()
        .update(Event::CurrencyChanged(args.currency))
        .update(Event::PriceChanged(args.price))
        .update(Event::FileLoaded(contents));
    if args.all {
        session = session.update(Event::ShowAllToggled);
    }

    report::render(&session, &mut io::stdout().lock())?;

    if let Some(error) = session.error {
        bail!(error);
    }
    Ok(())
}

fn write_sample(args: SampleArgs) -> eyre::Result<()> {
    match args.output {
        Some(path) => {
            fs::write(&path, SAMPLE_CSV)
                .wrap_err_with(|| format!("Could not write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Wrote sample CSV");
        }
        None => println!("{SAMPLE_CSV}"),
    }
    Ok(())
}
