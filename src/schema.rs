//! Column resolution against tables whose column names are not known ahead of time.
//!
//! Each semantic field (e.g. "year") is declared as a `FieldRule` holding a
//! keyword. A column matches when its trimmed, uppercased name contains the
//! uppercased keyword. Columns are scanned in declared order and the first
//! match wins; there is no further disambiguation.

use crate::io::raw::RawTable;
use crate::pipeline::error::SchemaError;

/// Default keyword for the emissions year column.
pub const DEFAULT_YEAR_KEYWORD: &str = "YEAR";
/// Default keyword for the emissions value column.
pub const DEFAULT_VALUE_KEYWORD: &str = "CO2_EMISSIONS";

/// A concrete column picked for a semantic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    pub index: usize,
    /// Trimmed column name.
    pub name: String,
}

/// Outcome of a single lookup; never partially resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ColumnRef),
    NotFound,
}

impl Resolution {
    pub fn found(self) -> Option<ColumnRef> {
        match self {
            Resolution::Found(column) => Some(column),
            Resolution::NotFound => None,
        }
    }
}

/// Declared mapping from a semantic field name to its matching keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub keyword: String,
}

impl FieldRule {
    pub fn new(field: &'static str, keyword: impl Into<String>) -> Self {
        Self {
            field,
            keyword: keyword.into(),
        }
    }
}

/// Find the first column whose name contains `keyword` (case-insensitive).
///
/// Positional (unnamed) columns never match, and neither does a blank keyword.
pub fn resolve(table: &RawTable, keyword: &str) -> Resolution {
    let needle = keyword.trim().to_uppercase();
    if needle.is_empty() {
        return Resolution::NotFound;
    }

    table
        .columns()
        .iter()
        .enumerate()
        .find_map(|(index, column)| {
            let name = normalize_column_name(column.name()?);
            name.to_uppercase().contains(&needle).then(|| ColumnRef {
                index,
                name: name.to_string(),
            })
        })
        .map_or(Resolution::NotFound, Resolution::Found)
}

/// Resolve a declared field, turning `NotFound` into a `SchemaError`.
pub fn resolve_field(table: &RawTable, rule: &FieldRule) -> Result<ColumnRef, SchemaError> {
    resolve(table, &rule.keyword)
        .found()
        .ok_or_else(|| SchemaError::MissingColumn {
            field: rule.field,
            keyword: rule.keyword.clone(),
            available: table.column_names(),
        })
}

fn normalize_column_name(name: &str) -> &str {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim()
}
