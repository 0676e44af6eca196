//! Terminal charts for `climate run`.

pub mod ascii;

pub use ascii::render_ascii_chart;
