//! Core types: tracing setup, cell value matrices, rendering

pub mod tracing;
pub mod values;

pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use values::{ValueMatrix, ValuesError, column_count, parse_cells, render_json, render_tsv};
