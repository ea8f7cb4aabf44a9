use crate::detect::TableBoundary;
use crate::document::table::Row;
use crate::document::table::Table;
use crate::grid::cell::Cell;
use crate::grid::Grid;

/// Materializes the data rows of a detected table into header-keyed
/// structures.
#[derive(Default)]
pub struct RowParser;

impl RowParser {
    pub fn new() -> RowParser {
        RowParser
    }

    /// Builds one `Row` per non-empty grid row between the header row and
    /// the boundary's last row. Columns missing from a short grid row are
    /// synthesized as empty cells so every row matches the header count;
    /// rows whose cells are all empty are dropped.
    pub fn parse_rows(
        &self,
        grid: &Grid,
        headers: &[String],
        header_row: usize,
        boundary: &TableBoundary,
    ) -> Vec<Row> {
        let mut rows = Vec::new();
        for grid_row in (header_row + 1)..=boundary.end_row {
            let mut cells = Vec::with_capacity(headers.len());
            let mut all_empty = true;
            for position in 0..headers.len() {
                let col = boundary.start_col + position;
                let cell = grid
                    .get(grid_row, col)
                    .cloned()
                    .unwrap_or_else(|| Cell::empty(grid_row, col));
                if !cell.is_empty() {
                    all_empty = false;
                }
                cells.push(cell);
            }
            if all_empty {
                continue;
            }
            rows.push(Row::new(rows.len(), headers, cells));
        }
        rows
    }

    /// Composes headers, boundary, and parsed rows into a finished table.
    pub fn parse_table(
        &self,
        grid: &Grid,
        name: &str,
        headers: Vec<String>,
        header_row: usize,
        boundary: TableBoundary,
    ) -> Table {
        let rows = self.parse_rows(grid, &headers, header_row, &boundary);
        Table {
            name: name.to_owned(),
            headers,
            rows,
            header_row,
            boundary,
        }
    }
}
