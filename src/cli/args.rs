//! CLI argument definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::export::DurationUnit;

/// Inspect a captured stint results file.
#[derive(Parser)]
#[command(name = "stint-report", version, about)]
pub struct Args {
    /// Results file produced by ProfilerResults::write_to_file
    pub results: PathBuf,

    /// Duration unit for the text report
    #[arg(long, value_enum, default_value = "ms")]
    pub unit: UnitArg,

    /// Also export the capture as Chrome Trace JSON to this file
    #[arg(long, value_name = "FILE")]
    pub export_chrome: Option<PathBuf>,

    /// Skip printing the text report (useful with --export-chrome)
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Ms,
    Us,
    Ns,
}

impl From<UnitArg> for DurationUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Ms => DurationUnit::Millis,
            UnitArg::Us => DurationUnit::Micros,
            UnitArg::Ns => DurationUnit::Nanos,
        }
    }
}
