//! # stint-report - Offline Results Viewer
//!
//! Loads a results file captured with `ProfilerResults::write_to_file` and
//! prints the per-thread, per-frame text report. No live profiling is
//! involved; this is the replay path for captures recorded earlier, possibly
//! on another machine of the same architecture.
//!
//! ```bash
//! # Print the report in milliseconds
//! stint-report run.stint
//!
//! # Microsecond durations, plus a Chrome trace for Perfetto
//! stint-report run.stint --unit us --export-chrome run.json
//! ```

use std::fs::File;
use std::io::BufWriter;

use anyhow::{bail, Context, Result};
use clap::Parser;

use stint::cli::Args;
use stint::export::ChromeTraceExporter;
use stint::trace_data::ProfilerResults;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(results) = ProfilerResults::load_from_file(&args.results) else {
        bail!(
            "{} is not a readable stint results file (run with RUST_LOG=debug for details)",
            args.results.display()
        );
    };

    if !args.quiet {
        print!("{}", results.write_report(args.unit.into()));
        if !results.has_any_records() {
            eprintln!("note: the capture contains no recorded events");
        }
        if results.is_frame_data_missing() {
            eprintln!("note: no frame boundaries were recorded; the single frame is synthetic");
        }
    }

    if let Some(path) = &args.export_chrome {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let exporter = ChromeTraceExporter::from_results(&results);
        exporter
            .export(BufWriter::new(file))
            .with_context(|| format!("failed to write Chrome trace to {}", path.display()))?;
        eprintln!("wrote {} trace events to {}", exporter.event_count(), path.display());
    }

    Ok(())
}
