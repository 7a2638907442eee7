// src/main.rs

mod analyzer;
mod classifier;
mod cli;
mod collector;
mod error;
mod model;
mod pipeline;
mod predictor;
mod rectifier;
mod report;
mod table;

use clap::Parser;
use cli::{Args, Command, PredictorArgs};
use pipeline::History;
use predictor::{FixTypePredictor, RemotePredictor, SkipPredictor};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "fixmsg=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    let result = run(args.command);
    tracing::info!("Total time: {:.2?}", start_time.elapsed());

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn build_predictor(args: &PredictorArgs) -> error::Result<Box<dyn FixTypePredictor>> {
    let predictor: Box<dyn FixTypePredictor> = match args.predictor {
        cli::Predictor::Remote => {
            tracing::info!("Predicting fix types with {}", args.endpoint);
            Box::new(RemotePredictor::new(args.remote_config()).map_err(error::Error::PredictorSetup)?)
        }
        cli::Predictor::Skip => Box::new(SkipPredictor),
    };
    Ok(predictor)
}

fn run(command: Command) -> error::Result<()> {
    match command {
        Command::Mine { history, output } => {
            let history = History::from_args(&history)?;
            let fixes = pipeline::mine(&history, &output)?;
            println!("Saved {} bug-fix commits to {}", fixes.len(), output.display());
        }
        Command::Diff { history, commits, output, predictor } => {
            let history = History::from_args(&history)?;
            let predictor = build_predictor(&predictor)?;
            let fixes = table::read_commits(&commits)?;
            pipeline::diff(&history, &fixes, predictor.as_ref(), &output)?;
            println!("Saved file-level bug-fix records to {}", output.display());
        }
        Command::Rectify { input, output } => {
            let report = pipeline::rectify(&input, &output)?;
            println!("Rectified {} records into {}\n", report.total(), output.display());
            println!("{report}");
        }
        Command::Report { input } => {
            let records = table::read_rectified(&input)?;
            println!("{}", pipeline::report(&records));
        }
        Command::Run { history, out_dir, predictor } => {
            let history = History::from_args(&history)?;
            let predictor = build_predictor(&predictor)?;
            std::fs::create_dir_all(&out_dir)?;
            let commits_path = out_dir.join(cli::COMMITS_FILE);
            let changes_path = out_dir.join(cli::CHANGES_FILE);
            let rectified_path = out_dir.join(cli::RECTIFIED_FILE);

            let fixes = pipeline::mine(&history, &commits_path)?;
            pipeline::diff(&history, &fixes, predictor.as_ref(), &changes_path)?;
            let report = pipeline::rectify(&changes_path, &rectified_path)?;
            println!("Rectified {} records into {}\n", report.total(), rectified_path.display());
            println!("{report}");
        }
    }
    Ok(())
}
