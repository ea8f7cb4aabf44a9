use crate::detect::TableBoundary;
use crate::document::column::Column;
use crate::document::column::ColumnType;
use crate::grid::cell::Cell;
use std::collections::HashMap;

/// One data row of a table, addressable both positionally and by header
/// name. The row index counts kept data rows, not grid rows.
#[derive(Clone, Debug)]
pub struct Row {
    /// Position among the table's data rows (0-based)
    pub index: usize,
    /// Cells in header order
    pub cells: Vec<Cell>,
    /// Header name to cell mapping
    values: HashMap<String, Cell>,
}

impl Row {
    pub(crate) fn new(index: usize, headers: &[String], cells: Vec<Cell>) -> Row {
        let values = headers
            .iter()
            .zip(cells.iter())
            .map(|(header, cell)| (header.to_owned(), cell.clone()))
            .collect();
        Row {
            index,
            cells,
            values,
        }
    }

    /// Gets the cell under the named header, or None for unknown headers.
    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.values.get(header)
    }
}

/// A materialized table with ordered, unique headers and header-keyed rows.
///
/// Tables are immutable after construction; the transform methods return new
/// values and leave the original untouched.
#[derive(Clone, Debug)]
pub struct Table {
    /// Table name, `"<sheet>_Table<n>"` for detected tables
    pub name: String,
    /// Ordered column names, unique after normalization
    pub headers: Vec<String>,
    /// Data rows in original order
    pub rows: Vec<Row>,
    /// Grid row index the headers were read from
    pub header_row: usize,
    /// Grid region the table was detected in
    pub boundary: TableBoundary,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Returns a new table keeping only rows matching the predicate,
    /// re-indexed in original order.
    pub fn filter<P>(&self, predicate: P) -> Table
    where
        P: Fn(&Row) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .enumerate()
            .map(|(index, row)| Row::new(index, &self.headers, row.cells.clone()))
            .collect();
        Table {
            name: self.name.to_owned(),
            headers: self.headers.to_owned(),
            rows,
            header_row: self.header_row,
            boundary: self.boundary,
        }
    }

    /// Returns a new table keeping the named columns in the given order.
    /// Names not present in the table are ignored.
    pub fn select(&self, names: &[&str]) -> Table {
        let positions: Vec<usize> = names
            .iter()
            .filter_map(|name| self.headers.iter().position(|header| header == name))
            .collect();
        let headers: Vec<String> = positions
            .iter()
            .map(|position| self.headers[*position].to_owned())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let cells = positions
                    .iter()
                    .filter_map(|position| row.cells.get(*position))
                    .cloned()
                    .collect();
                Row::new(row.index, &headers, cells)
            })
            .collect();
        Table {
            name: self.name.to_owned(),
            headers,
            rows,
            header_row: self.header_row,
            boundary: self.boundary,
        }
    }

    /// Returns a new table with one header renamed; rows are re-keyed to the
    /// new name. Unknown names leave the table unchanged.
    pub fn rename(&self, from: &str, to: &str) -> Table {
        let headers: Vec<String> = self
            .headers
            .iter()
            .map(|header| {
                if header == from {
                    to.to_owned()
                } else {
                    header.to_owned()
                }
            })
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| Row::new(row.index, &headers, row.cells.clone()))
            .collect();
        Table {
            name: self.name.to_owned(),
            headers,
            rows,
            header_row: self.header_row,
            boundary: self.boundary,
        }
    }

    /// Infers a data type per column from the cells beneath each header.
    /// A column keeps a typed kind only when the share of agreeing non-empty
    /// cells reaches the consistency threshold, otherwise it falls back to
    /// text.
    pub fn analyze_columns(&self, column_consistency: f64) -> Vec<Column> {
        self.headers
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let kinds: Vec<ColumnType> = self
                    .rows
                    .iter()
                    .filter_map(|row| row.cells.get(position))
                    .filter(|cell| !cell.is_empty())
                    .map(ColumnType::from_cell)
                    .collect();
                Column {
                    name: name.to_owned(),
                    kind: ColumnType::detect(&kinds, column_consistency),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fruit_table() -> Table {
        let headers = vec!["ID".to_owned(), "Name".to_owned(), "Price".to_owned()];
        let rows = vec![
            Row::new(
                0,
                &headers,
                vec![
                    Cell::number(1, 0, 1.0),
                    Cell::text(1, 1, "Apple"),
                    Cell::number(1, 2, 1.5),
                ],
            ),
            Row::new(
                1,
                &headers,
                vec![
                    Cell::number(2, 0, 2.0),
                    Cell::text(2, 1, "Pear"),
                    Cell::number(2, 2, 2.0),
                ],
            ),
        ];
        Table {
            name: "Sheet1_Table1".to_owned(),
            headers,
            rows,
            header_row: 0,
            boundary: TableBoundary::new(0, 0, 2, 2),
        }
    }

    #[test]
    fn filter_reindexes_kept_rows() {
        let table = fruit_table();
        let filtered = table.filter(|row| row.get("Name").map(|cell| cell.raw_text == "Pear").unwrap_or(false));
        assert_eq!(filtered.row_count(), 1);
        assert_eq!(filtered.rows[0].index, 0);
        assert_eq!(filtered.rows[0].get("Name").unwrap().raw_text, "Pear");
        // original untouched
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn select_keeps_named_columns_in_order() {
        let table = fruit_table();
        let selected = table.select(&["Price", "Name", "Missing"]);
        assert_eq!(selected.headers, vec!["Price", "Name"]);
        assert_eq!(selected.rows[0].cells[0].raw_text, "1.5");
        assert_eq!(selected.rows[0].get("Name").unwrap().raw_text, "Apple");
        assert!(selected.rows[0].get("ID").is_none());
    }

    #[test]
    fn rename_rekeys_rows() {
        let table = fruit_table();
        let renamed = table.rename("Name", "Product");
        assert_eq!(renamed.headers, vec!["ID", "Product", "Price"]);
        assert_eq!(renamed.rows[0].get("Product").unwrap().raw_text, "Apple");
        assert!(renamed.rows[0].get("Name").is_none());
    }

    #[test]
    fn column_analysis_types_each_header() {
        let table = fruit_table();
        let columns = table.analyze_columns(0.7);
        assert_eq!(columns[0].kind, ColumnType::Integer);
        assert_eq!(columns[1].kind, ColumnType::Text);
        assert_eq!(columns[2].kind, ColumnType::Float);
        assert_eq!(columns[0].name, "ID");
    }
}
