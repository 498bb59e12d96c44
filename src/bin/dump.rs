use carbonara::series::TimeSerieArchive;
use clap::Parser;
use comfy_table::{Table, presets::ASCII_FULL};
use std::path::PathBuf;
use std::process::ExitCode;

/// Print a text report describing an archive's raw buffer and each of its
/// aggregated views.
#[derive(Parser)]
#[command(name = "carbonara-dump")]
struct Args {
    file: PathBuf,
}

fn measure_table(rows: impl Iterator<Item = (carbonara::Timestamp, f64)>) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.set_header(vec!["Timestamp", "Value"]);
    for (ts, value) in rows {
        table.add_row(vec![ts.to_string(), value.to_string()]);
    }
    table
}

fn run(args: Args) -> carbonara::CarbonaraResult<()> {
    let bytes = std::fs::read(&args.file).map_err(|e| carbonara::CarbonaraError::Deserialization {
        reason: e.to_string(),
    })?;
    let archive = TimeSerieArchive::unserialize(&bytes)?;

    let raw = archive.raw();
    println!("Aggregation method: {}", archive.aggregation_method());
    println!(
        "Number of aggregated timeserie: {}",
        archive.aggregated_series().len()
    );
    let block_size_secs = raw.block_size().map(|b| b.seconds_f64()).unwrap_or(0.0);
    let back_window = raw.back_window();
    println!(
        "Back window: {} × {}s = {}s",
        back_window,
        render_secs(block_size_secs),
        render_secs(block_size_secs * back_window as f64)
    );
    println!();

    let raw_rows: Vec<_> = raw.iter().map(|s| (s.timestamp, s.value)).collect();
    println!("Number of full resolution measures: {}", raw_rows.len());
    println!("{}", measure_table(raw_rows.into_iter()));

    for (i, series) in archive.aggregated_series().iter().enumerate() {
        let gran_secs = series.sampling().seconds_f64();
        let size = series.max_size().unwrap_or(series.len());
        println!(
            "Aggregated timeserie #{}: {}s × {} = {}s",
            i + 1,
            render_secs(gran_secs),
            size,
            render_secs(gran_secs * size as f64)
        );
        let rows = series.fetch(None, None);
        println!("Number of measures: {}", rows.len());
        println!("{}", measure_table(rows.into_iter()));
    }

    Ok(())
}

fn render_secs(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as i64)
    } else {
        format!("{secs}")
    }
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
