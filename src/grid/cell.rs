use crate::grid::merge::MergeRange;
use crate::grid::reference::index_to_reference;
use chrono::NaiveDateTime;

/// Types of cell values in a sheet grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellType {
    #[default]
    Empty,
    /// Text values
    Text,
    /// Numeric values
    Number,
    /// Boolean values (true/false)
    Boolean,
    /// Date/time values
    DateTime,
    /// Formula text for cells without a cached result
    Formula,
}

/// A cell value tagged by its semantic type.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
    Formula(String),
}

impl CellValue {
    /// Returns the type discriminant of this value.
    pub fn kind(&self) -> CellType {
        match self {
            CellValue::Empty => CellType::Empty,
            CellValue::Text(_) => CellType::Text,
            CellValue::Number(_) => CellType::Number,
            CellValue::Boolean(_) => CellType::Boolean,
            CellValue::DateTime(_) => CellType::DateTime,
            CellValue::Formula(_) => CellType::Formula,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(value) => Some(*value),
            _ => None,
        }
    }
}

/// Represents a single cell in a sheet grid with position, typed value,
/// display text, and optional merge/formula/comment/hyperlink metadata.
///
/// Cells are constructed by the spreadsheet access layer and mutated only by
/// the merge processor before any analysis runs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Parsed cell value
    pub value: CellValue,
    /// Cell text as displayed
    pub raw_text: String,
    /// Merge region this cell belongs to, stamped by the merge processor
    pub merge: Option<MergeRange>,
    /// Formula text, when the cell is formula-backed
    pub formula: Option<String>,
    /// Comment attached to the cell
    pub comment: Option<String>,
    /// Hyperlink target attached to the cell
    pub hyperlink: Option<String>,
}

impl Cell {
    pub fn empty(row: usize, col: usize) -> Cell {
        Cell {
            row,
            col,
            ..Cell::default()
        }
    }

    pub fn text(row: usize, col: usize, value: &str) -> Cell {
        Cell {
            row,
            col,
            value: CellValue::Text(value.to_owned()),
            raw_text: value.to_owned(),
            ..Cell::default()
        }
    }

    pub fn number(row: usize, col: usize, value: f64) -> Cell {
        Cell {
            row,
            col,
            value: CellValue::Number(value),
            raw_text: value.to_string(),
            ..Cell::default()
        }
    }

    pub fn boolean(row: usize, col: usize, value: bool) -> Cell {
        Cell {
            row,
            col,
            value: CellValue::Boolean(value),
            raw_text: value.to_string(),
            ..Cell::default()
        }
    }

    pub fn date_time(row: usize, col: usize, value: NaiveDateTime) -> Cell {
        Cell {
            row,
            col,
            raw_text: value.format("%Y-%m-%d %H:%M:%S").to_string(),
            value: CellValue::DateTime(value),
            ..Cell::default()
        }
    }

    pub fn formula(row: usize, col: usize, text: &str) -> Cell {
        Cell {
            row,
            col,
            value: CellValue::Formula(text.to_owned()),
            raw_text: text.to_owned(),
            formula: Some(text.to_owned()),
            ..Cell::default()
        }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is_merged(&self) -> bool {
        self.merge.is_some()
    }

    /// True only for the top-left cell of a merged region.
    pub fn is_merge_origin(&self) -> bool {
        self.merge.map(|range| range.is_origin).unwrap_or(false)
    }

    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    pub fn has_comment(&self) -> bool {
        self.comment.is_some()
    }

    pub fn has_hyperlink(&self) -> bool {
        self.hyperlink.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_kinds() {
        assert_eq!(CellValue::Empty.kind(), CellType::Empty);
        assert_eq!(CellValue::Text("a".to_owned()).kind(), CellType::Text);
        assert_eq!(CellValue::Number(1.5).kind(), CellType::Number);
        assert_eq!(CellValue::Boolean(true).kind(), CellType::Boolean);
        assert_eq!(CellValue::Formula("=A1".to_owned()).kind(), CellType::Formula);
    }

    #[test]
    fn date_time_cells_format_raw_text() {
        use chrono::NaiveDate;
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let cell = Cell::date_time(0, 0, timestamp);
        assert_eq!(cell.raw_text, "2024-01-31 08:30:00");
        assert_eq!(cell.value.kind(), CellType::DateTime);
        assert_eq!(cell.value.as_date_time(), Some(timestamp));
    }

    #[test]
    fn constructors() {
        let cell = Cell::text(2, 1, "Name");
        assert_eq!(cell.reference(), "B3");
        assert_eq!(cell.raw_text, "Name");
        assert!(!cell.is_empty());
        assert!(!cell.is_merged());

        let cell = Cell::empty(0, 0);
        assert!(cell.is_empty());
        assert_eq!(cell.raw_text, "");

        let cell = Cell::formula(0, 0, "=SUM(A1:A3)");
        assert!(cell.has_formula());
        assert_eq!(cell.value.kind(), CellType::Formula);
    }
}
