use carbonara::aggregators::AggregationMethod;
use carbonara::common::Granularity;
use carbonara::parser::parse_duration;
use carbonara::series::{ArchiveDefinition, TimeSerieArchive};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Create a fresh, empty archive and write its serialized blob to a file.
#[derive(Parser)]
#[command(name = "carbonara-create")]
struct Args {
    /// A single `granularity_seconds,points` pair, e.g. `2,2`.
    defs: String,
    /// Destination file for the serialized archive.
    file: PathBuf,
}

fn run(args: Args) -> carbonara::CarbonaraResult<()> {
    let (gran_str, points_str) = args
        .defs
        .split_once(',')
        .ok_or_else(|| carbonara::CarbonaraError::InvalidDuration {
            input: args.defs.clone(),
        })?;
    let granularity = match gran_str.parse::<f64>() {
        Ok(secs) => Granularity::from_seconds_f64(secs)?,
        Err(_) => parse_duration(gran_str)?,
    };
    let points: usize = points_str
        .parse()
        .map_err(|_| carbonara::CarbonaraError::InvalidDuration {
            input: args.defs.clone(),
        })?;

    let archive = TimeSerieArchive::from_definitions(
        vec![ArchiveDefinition::new(granularity, Some(points))],
        AggregationMethod::Mean,
    )?;

    let bytes = archive.serialize()?;
    std::fs::write(&args.file, bytes).map_err(|e| carbonara::CarbonaraError::Serialization {
        reason: e.to_string(),
    })?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::try_init().ok();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
