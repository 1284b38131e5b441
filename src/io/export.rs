//! CSV export of a simulation run's chart series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::SimulationResult;

/// Column header for CSV export.
const HEADER: &str = "time,baseline,ai_load,attempted,throttled,shed";

/// Exports a simulation result to a CSV file at the given path.
///
/// Writes a header row followed by one data row per step. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(result: &SimulationResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(result, buf)
}

/// Writes a simulation result as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(result: &SimulationResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for s in result.steps() {
        wtr.write_record(&[
            s.time.to_string(),
            format!("{:.4}", s.baseline),
            format!("{:.4}", s.ai_load),
            format!("{:.4}", s.attempted),
            format!("{:.4}", s.throttled),
            format!("{:.4}", s.shed),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;
    use crate::sim::engine::run_scenario;

    fn make_result(steps: usize) -> SimulationResult {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.seed = Some(42);
        cfg.simulation.horizon_steps = steps;
        cfg.simulation.horizon_hours = steps as f64;
        run_scenario(cfg).unwrap()
    }

    fn to_string(result: &SimulationResult) -> String {
        let mut buf = Vec::new();
        write_csv(result, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_matches_schema() {
        let output = to_string(&make_result(1));
        assert_eq!(output.lines().next(), Some(HEADER));
    }

    #[test]
    fn row_count_matches_step_count() {
        let output = to_string(&make_result(24));
        // 1 header + 24 data rows
        assert_eq!(output.lines().count(), 25);
    }

    #[test]
    fn deterministic_output() {
        let result = make_result(5);
        assert_eq!(to_string(&result), to_string(&result));
    }

    #[test]
    fn rows_parse_back_as_numbers() {
        let output = to_string(&make_result(3));
        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(6));

        let mut row_count = 0;
        for record in rdr.records() {
            let rec = record.unwrap();
            assert_eq!(rec[0].parse::<usize>().ok(), Some(row_count));
            for i in 1..6 {
                assert!(rec[i].parse::<f64>().is_ok(), "column {i} should parse as f64");
            }
            row_count += 1;
        }
        assert_eq!(row_count, 3);
    }

    #[test]
    fn export_writes_file() {
        let path = std::env::temp_dir().join(format!("grid-guard-export-{}.csv", std::process::id()));
        export_csv(&make_result(4), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written.lines().count(), 5);
    }
}
