//! CSV export for dispatch schedules and benchmark results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::opt::benchmark::HourlySeries;
use crate::opt::types::Schedule;

/// Column header for dispatch schedule CSV export.
const SCHEDULE_HEADER: &str = "step,price,power_mw,flow_m3s,volume_m3";

/// Column header for benchmark series CSV export.
const BENCHMARK_HEADER: &str = "step,historical_price,programmed_price,\
                                power_stable,power_programmed,power_hindsight";

/// Exports a dispatch schedule to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step. The volume
/// column reports the reservoir level at the end of each step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_schedule_csv(prices: &[f64], schedule: &Schedule, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_schedule_csv(prices, schedule, buf)
}

/// Writes a dispatch schedule as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_schedule_csv(
    prices: &[f64],
    schedule: &Schedule,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(SCHEDULE_HEADER.split(',').map(str::trim))?;

    // Data rows
    for (t, (price, power)) in prices.iter().zip(&schedule.power_mw).enumerate() {
        wtr.write_record(&[
            t.to_string(),
            format!("{price:.2}"),
            format!("{power:.4}"),
            format!("{:.4}", schedule.flow_m3s[t]),
            format!("{:.3}", schedule.volume_m3[t + 1]),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports benchmark hourly series to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_benchmark_csv(series: &HourlySeries, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_benchmark_csv(series, buf)
}

/// Writes benchmark hourly series as CSV to any writer.
///
/// One row per step: both price tracks and the three power tracks being
/// compared.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_benchmark_csv(series: &HourlySeries, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(BENCHMARK_HEADER.split(',').map(str::trim))?;

    // Data rows
    for t in 0..series.historical_prices.len() {
        wtr.write_record(&[
            t.to_string(),
            format!("{:.2}", series.historical_prices[t]),
            format!("{:.2}", series.programmed_prices[t]),
            format!("{:.4}", series.power_stable[t]),
            format!("{:.4}", series.power_programmed[t]),
            format!("{:.4}", series.power_hindsight[t]),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
