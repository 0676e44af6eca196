//! Input/output helpers.
//!
//! - untyped CSV tables (`raw`)
//! - loading tables from files or URLs (`source`)
//! - aligned table exports (CSV/JSON) (`export`)

pub mod export;
pub mod raw;
pub mod source;

pub use export::*;
pub use raw::*;
pub use source::*;
