//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - per-year series produced by the normalizers (`YearlySeries`)
//! - the aligned output table (`AlignedTable`, `AlignedRecord`)
//! - small enums shared by the CLI and front-ends (`Dataset`, `ChartKind`, `ExportFormat`)

pub mod types;

pub use types::*;
