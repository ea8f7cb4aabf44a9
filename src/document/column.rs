use crate::grid::cell::Cell;
use crate::grid::cell::CellValue;

/// Inferred data types for table columns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Boolean values (true/false)
    Boolean,
    /// Whole numbers
    Integer,
    /// Numbers with a fractional part
    Float,
    /// Textual values, also the fallback for mixed columns
    Text,
    /// Date and time values
    DateTime,
}

/// A named table column with its inferred data type.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (from the header row or generated)
    pub name: String,
    /// Inferred column data type
    pub kind: ColumnType,
}

impl ColumnType {
    /// Returns the string representation of the column type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Boolean => "boolean",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::DateTime => "datetime",
        }
    }

    /// Maps a cell to its candidate column type. Numbers with no fractional
    /// part count as integers.
    pub(crate) fn from_cell(cell: &Cell) -> ColumnType {
        match &cell.value {
            CellValue::Boolean(_) => ColumnType::Boolean,
            CellValue::Number(value) if value.fract() == 0.0 => ColumnType::Integer,
            CellValue::Number(_) => ColumnType::Float,
            CellValue::DateTime(_) => ColumnType::DateTime,
            _ => ColumnType::Text,
        }
    }

    /// Detects the dominant type from a collection of candidates. A kind is
    /// kept only when its share reaches the consistency threshold; integer
    /// and float candidates pool together and widen to float when mixed.
    /// Inconsistent or empty collections fall back to text.
    pub(crate) fn detect(kinds: &[ColumnType], consistency: f64) -> ColumnType {
        if kinds.is_empty() {
            return ColumnType::Text;
        }
        let total = kinds.len() as f64;
        let booleans = kinds.iter().filter(|kind| **kind == ColumnType::Boolean).count();
        let integers = kinds.iter().filter(|kind| **kind == ColumnType::Integer).count();
        let floats = kinds.iter().filter(|kind| **kind == ColumnType::Float).count();
        let date_times = kinds.iter().filter(|kind| **kind == ColumnType::DateTime).count();

        if booleans as f64 / total >= consistency {
            ColumnType::Boolean
        } else if integers as f64 / total >= consistency && floats == 0 {
            ColumnType::Integer
        } else if (integers + floats) as f64 / total >= consistency {
            ColumnType::Float
        } else if date_times as f64 / total >= consistency {
            ColumnType::DateTime
        } else {
            ColumnType::Text
        }
    }
}
