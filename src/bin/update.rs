use carbonara::parser::parse_sample_line;
use carbonara::series::TimeSerieArchive;
use clap::Parser;
use std::process::ExitCode;

/// Ingest one or more `YYYY-MM-DD HH:MM:SS,value` sample lines into an
/// existing archive file, in a single `set_values` call, and write the
/// result back in place.
#[derive(Parser)]
#[command(name = "carbonara-update")]
struct Args {
    /// Sample lines followed by the archive file as the last argument.
    #[arg(required = true, num_args = 2..)]
    args: Vec<String>,
}

fn run(args: Args) -> carbonara::CarbonaraResult<()> {
    let (file, lines) = args
        .args
        .split_last()
        .expect("clap enforces at least two args");
    let file = std::path::Path::new(file);

    let bytes = std::fs::read(file).map_err(|e| carbonara::CarbonaraError::Deserialization {
        reason: e.to_string(),
    })?;
    let mut archive = TimeSerieArchive::unserialize(&bytes)?;

    let samples = lines
        .iter()
        .map(|line| parse_sample_line(line))
        .collect::<carbonara::CarbonaraResult<Vec<_>>>()?;
    archive.set_values(&samples)?;

    let bytes = archive.serialize()?;
    std::fs::write(file, bytes).map_err(|e| carbonara::CarbonaraError::Serialization {
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

