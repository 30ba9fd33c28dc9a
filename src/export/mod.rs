//! Results export surfaces
//!
//! Three ways out of a [`ProfilerResults`](crate::trace_data::ProfilerResults):
//! - `binary`: the native results format (magic `IYFR`, version 1); the only
//!   format that round-trips losslessly
//! - `text_report`: the human-readable per-thread, per-frame dump
//! - `chrome_trace`: Chrome Trace Event Format JSON for Perfetto,
//!   Speedscope or `chrome://tracing`

pub(crate) mod binary;
pub mod chrome_trace;
pub mod text_report;

pub use chrome_trace::ChromeTraceExporter;
pub use text_report::DurationUnit;
