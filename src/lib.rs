//! # Sheet Tables
//!
//! Infers structured, header-mapped tables from unstructured, sparse
//! two-dimensional grids of spreadsheet cells, without a predefined schema.
//!
//! ## Features
//!
//! - **Table boundary detection**: expands boundaries from seed cells using
//!   contiguity and density rules over a visited mask
//! - **Header detection**: scores candidate rows by density, text ratio, and
//!   vocabulary to pick the most likely header row
//! - **Merged-cell handling**: normalizes raw merge descriptors, propagates
//!   origin values, and never splits a merge across a table boundary
//! - **Hierarchical headers**: detects multi-row header bands and flattens
//!   them into single column names
//! - **Row materialization**: header-keyed rows with positional access,
//!   tolerant of jagged and irregular grids
//! - **Parallel sheet processing**: one worker per sheet with results
//!   identical to the sequential mode
//!
//! The low-level spreadsheet file decoder is not part of this crate; callers
//! plug one in through the [`SheetSource`] trait and receive a [`Workbook`]
//! document tree in return.
pub mod detect;
pub mod document;
pub mod error;
pub mod grid;
pub mod reader;

pub use crate::detect::DetectionConfig;
pub use crate::detect::TableBoundary;
pub use crate::document::column::Column;
pub use crate::document::column::ColumnType;
pub use crate::document::table::Row;
pub use crate::document::table::Table;
pub use crate::document::Sheet;
pub use crate::document::Workbook;
pub use crate::error::SheetTablesError;
pub use crate::grid::cell::Cell;
pub use crate::grid::cell::CellType;
pub use crate::grid::cell::CellValue;
pub use crate::grid::merge::MergeDescriptor;
pub use crate::grid::merge::MergeRange;
pub use crate::grid::Grid;
pub use crate::reader::SheetSelector;
pub use crate::reader::SheetSource;
pub use crate::reader::WorkbookReader;

/// Reads every sheet of the workbook behind `source` and returns the
/// document tree.
///
/// # Arguments
///
/// * `source` - The spreadsheet access layer to read grids from
/// * `config` - Detection tunables, usually `DetectionConfig::default()`
///
/// # Errors
///
/// Propagates source failures wrapped with sheet context.
pub fn read_workbook<S: SheetSource>(
    source: &S,
    config: DetectionConfig,
) -> Result<Workbook, SheetTablesError> {
    WorkbookReader::new(config).read_workbook(source)
}

/// Reads a single sheet by name and returns its detected tables.
///
/// # Arguments
///
/// * `source` - The spreadsheet access layer to read grids from
/// * `sheet_name` - Name of the sheet to analyze
/// * `config` - Detection tunables, usually `DetectionConfig::default()`
///
/// # Errors
///
/// Returns an error for unknown sheet names and propagates source failures
/// wrapped with sheet context.
pub fn read_sheet<S: SheetSource>(
    source: &S,
    sheet_name: &str,
    config: DetectionConfig,
) -> Result<Sheet, SheetTablesError> {
    WorkbookReader::new(config).read_sheet(source, sheet_name)
}
