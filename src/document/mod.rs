//! # Document Tree Module
//!
//! The in-memory result of a workbook read: a `Workbook` of `Sheet`s, each
//! holding its detected `Table`s in detection order. The tree is created
//! fresh per read and never mutated afterwards; table transformations return
//! new values.
pub mod column;
pub mod table;

use crate::document::table::Table;

/// A sheet's inferred tables, in detection order.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Sheet name as reported by the source
    pub name: String,
    /// Sheet position in the workbook (0-based)
    pub index: usize,
    /// Detected tables in top-to-bottom, left-to-right order
    pub tables: Vec<Table>,
}

impl Sheet {
    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|table| table.name == name)
    }
}

/// Root of the document tree produced by one workbook read.
#[derive(Clone, Debug)]
pub struct Workbook {
    /// Path or identifier of the source workbook
    pub file_path: String,
    /// Sheets in their original workbook order
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Looks up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Looks up a table by name across all sheets, in sheet order.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find_map(|sheet| sheet.table(name))
    }

    /// Flattens the workbook to a list of every table, in sheet order.
    pub fn tables(&self) -> Vec<&Table> {
        self.sheets.iter().flat_map(|sheet| &sheet.tables).collect()
    }
}
