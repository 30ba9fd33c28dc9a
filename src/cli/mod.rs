//! Command-line interface for the report binary.

pub mod args;

pub use args::{Args, UnitArg};
