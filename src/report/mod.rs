//! Reporting utilities: run summaries and the aligned table as text.

pub mod format;

pub use format::*;
