use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column header information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    /// Column identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Column type
    pub column_type: ColumnType,
}

impl ColumnHeader {
    pub fn grouping(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type: ColumnType::Grouping,
        }
    }

    pub fn aggregated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type: ColumnType::Aggregated,
        }
    }
}

/// Type of column in the pivot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Grouping column
    Grouping,
    /// Aggregated numeric column
    Aggregated,
}

/// A single row in the pivot table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotRow {
    /// Hierarchy level (0 = top grouping level)
    pub level: usize,
    /// Values by column ID
    pub values: HashMap<String, CellValue>,
    /// Whether this row is a subtotal/total row
    pub is_total: bool,
    /// Child rows (for hierarchical display)
    pub children: Vec<PivotRow>,
}

/// Value in a pivot table cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Text value
    Text(String),
    /// Numeric value
    Number(f64),
    /// Null value
    Null,
}

impl CellValue {
    /// Numeric view of the cell, `None` for text and null cells
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) | CellValue::Null => None,
        }
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map(CellValue::Number).unwrap_or(CellValue::Null)
    }
}
