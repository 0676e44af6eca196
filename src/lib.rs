//! `climate-align` library crate.
//!
//! The binary (`climate`) is a thin wrapper around this library so that:
//!
//! - the normalization/alignment pipeline is testable without spawning processes
//! - the pipeline stays independent of the CLI and the dashboard
//!
//! Data flow: `io` loads raw tables, `normalize` reduces each to a yearly
//! series (using `schema` to find columns), `align` joins them, and `pipeline`
//! runs the whole thing and turns any failure into one `PipelineError`.

pub mod align;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod schema;
pub mod tui;
