//! # Workbook Reader Module
//!
//! Orchestrates the structural inference pipeline per sheet: obtain the grid
//! and merge descriptors from the external spreadsheet access layer, apply
//! merges, detect table boundaries, detect and extract headers, and
//! materialize rows. Sheets are processed sequentially or with one worker
//! per sheet; both modes produce identical results.
use crate::detect::analyzer::TableAnalyzer;
use crate::detect::header::HeaderDetector;
use crate::detect::rows::RowParser;
use crate::detect::DetectionConfig;
use crate::detect::TableBoundary;
use crate::document::table::Table;
use crate::document::Sheet;
use crate::document::Workbook;
use crate::error::ResultMessage;
use crate::error::SheetTablesError;
use crate::grid::merge::MergeDescriptor;
use crate::grid::merge::MergeProcessor;
use crate::grid::Grid;
use glob::Pattern;
use log::debug;
use rayon::prelude::*;
use thiserror::Error;

/// Separator joining the levels of a flattened hierarchical header.
const HEADER_LEVEL_SEPARATOR: &str = "_";

/// Errors produced while orchestrating workbook reads.
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),
}

/// External spreadsheet access layer.
///
/// Implementations decode a workbook file into per-sheet cell grids and raw
/// merge-region descriptors. Every method may be called from concurrent
/// per-sheet workers; each call must use its own underlying read handle
/// rather than sharing one across callers.
pub trait SheetSource: Sync {
    /// Path or identifier of the workbook.
    fn name(&self) -> String;

    /// Ordered list of sheet names.
    ///
    /// # Errors
    ///
    /// Returns an error when the workbook structure cannot be read.
    fn sheet_names(&self) -> anyhow::Result<Vec<String>>;

    /// Reads one sheet's cell grid, with per-cell types and formula/comment/
    /// hyperlink metadata already in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the sheet cannot be decoded.
    fn read_grid(&self, sheet_name: &str) -> anyhow::Result<Grid>;

    /// Raw merge-region descriptors for one sheet.
    ///
    /// # Errors
    ///
    /// Returns an error when the merge metadata cannot be read.
    fn merge_regions(&self, sheet_name: &str) -> anyhow::Result<Vec<MergeDescriptor>>;
}

/// Sheet-name filter applied when reading a subset of a workbook.
#[derive(Clone, Debug, Default)]
pub struct SheetSelector {
    /// Sheet name patterns; None accepts every sheet
    pub sheet_name_patterns: Option<Vec<Pattern>>,
    /// Maximum number of sheets to read
    pub sheet_limit: Option<usize>,
}

impl SheetSelector {
    /// Checks if a sheet name matches the selector patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        if let Some(patterns) = &self.sheet_name_patterns {
            patterns.iter().any(|pattern| pattern.matches(sheet_name))
        } else {
            true
        }
    }
}

/// Reads workbooks through a `SheetSource` and produces the document tree.
///
/// Owns one analyzer, one header detector, and one row parser, all
/// constructed from a single shared `DetectionConfig`. The components are
/// stateless with respect to a given grid, so one reader may serve many
/// reads and many worker threads.
pub struct WorkbookReader {
    config: DetectionConfig,
    analyzer: TableAnalyzer,
    headers: HeaderDetector,
    rows: RowParser,
}

impl WorkbookReader {
    pub fn new(config: DetectionConfig) -> WorkbookReader {
        WorkbookReader {
            config,
            analyzer: TableAnalyzer::new(config),
            headers: HeaderDetector::new(config),
            rows: RowParser::new(),
        }
    }

    /// Reads every sheet sequentially, in workbook order.
    ///
    /// # Errors
    ///
    /// Propagates the first source failure, wrapped with sheet context.
    pub fn read_workbook<S: SheetSource>(&self, source: &S) -> Result<Workbook, SheetTablesError> {
        let names = source.sheet_names()?;
        let sheets = names
            .iter()
            .enumerate()
            .map(|(index, name)| self.read_sheet_at(source, name, index))
            .collect::<Result<Vec<Sheet>, SheetTablesError>>()?;
        Ok(Workbook {
            file_path: source.name(),
            sheets,
        })
    }

    /// Reads sheets with one worker per sheet. With a single sheet this
    /// degrades to the sequential path. Sheets appear in their original
    /// order regardless of worker completion order: results are collected
    /// into slots indexed by sheet position, and the first failure in sheet
    /// order is surfaced while partial results are discarded.
    ///
    /// # Errors
    ///
    /// Propagates the first source failure, wrapped with sheet context.
    pub fn read_workbook_parallel<S: SheetSource>(
        &self,
        source: &S,
    ) -> Result<Workbook, SheetTablesError> {
        let names = source.sheet_names()?;
        if names.len() <= 1 {
            let sheets = names
                .iter()
                .enumerate()
                .map(|(index, name)| self.read_sheet_at(source, name, index))
                .collect::<Result<Vec<Sheet>, SheetTablesError>>()?;
            return Ok(Workbook {
                file_path: source.name(),
                sheets,
            });
        }

        let results: Vec<Result<Sheet, SheetTablesError>> = names
            .par_iter()
            .enumerate()
            .map(|(index, name)| self.read_sheet_at(source, name, index))
            .collect();
        let sheets = results
            .into_iter()
            .collect::<Result<Vec<Sheet>, SheetTablesError>>()?;
        Ok(Workbook {
            file_path: source.name(),
            sheets,
        })
    }

    /// Reads the sheets accepted by the selector, sequentially, preserving
    /// workbook order and stopping at the sheet limit.
    ///
    /// # Errors
    ///
    /// Propagates the first source failure, wrapped with sheet context.
    pub fn read_workbook_where<S: SheetSource>(
        &self,
        source: &S,
        selector: &SheetSelector,
    ) -> Result<Workbook, SheetTablesError> {
        let names = source.sheet_names()?;
        let mut sheets = Vec::new();
        for (index, name) in names.iter().enumerate() {
            if selector
                .sheet_limit
                .map(|limit| sheets.len() >= limit)
                .unwrap_or(false)
            {
                break;
            }
            if selector.accept(name) {
                sheets.push(self.read_sheet_at(source, name, index)?);
            }
        }
        Ok(Workbook {
            file_path: source.name(),
            sheets,
        })
    }

    /// Reads a single sheet by name.
    ///
    /// # Errors
    ///
    /// Returns `ReaderError::SheetNotFound` for unknown names and propagates
    /// source failures wrapped with sheet context.
    pub fn read_sheet<S: SheetSource>(
        &self,
        source: &S,
        sheet_name: &str,
    ) -> Result<Sheet, SheetTablesError> {
        let names = source.sheet_names()?;
        let index = names
            .iter()
            .position(|name| name == sheet_name)
            .ok_or_else(|| ReaderError::SheetNotFound(sheet_name.to_owned()))?;
        self.read_sheet_at(source, sheet_name, index)
    }

    fn read_sheet_at<S: SheetSource>(
        &self,
        source: &S,
        sheet_name: &str,
        index: usize,
    ) -> Result<Sheet, SheetTablesError> {
        let prefix = format!("sheet '{}'", sheet_name);
        let mut grid = source
            .read_grid(sheet_name)
            .map_err(SheetTablesError::from)
            .with_prefix(&prefix)?;
        if grid.is_empty() {
            debug!("sheet '{}' is empty", sheet_name);
            return Ok(Sheet {
                name: sheet_name.to_owned(),
                index,
                tables: Vec::new(),
            });
        }

        let descriptors = source
            .merge_regions(sheet_name)
            .map_err(SheetTablesError::from)
            .with_prefix(&prefix)?;
        let processor = MergeProcessor::new(self.config);
        let merges = processor
            .parse(&descriptors)
            .map_err(SheetTablesError::from)
            .with_prefix(&prefix)?;
        processor.apply(&mut grid, &merges);

        let boundaries = self.analyzer.detect_tables(&grid, &merges);
        debug!("sheet '{}': {} table(s) detected", sheet_name, boundaries.len());
        let tables = boundaries
            .into_iter()
            .enumerate()
            .map(|(position, boundary)| self.build_table(&grid, sheet_name, position, boundary))
            .collect();
        Ok(Sheet {
            name: sheet_name.to_owned(),
            index,
            tables,
        })
    }

    /// Builds one table from a detected boundary. When merged headers form a
    /// band of more than one row and the best-scoring header row falls
    /// inside that band, the band is flattened into single column names and
    /// row parsing starts after the band.
    fn build_table(
        &self,
        grid: &Grid,
        sheet_name: &str,
        position: usize,
        boundary: TableBoundary,
    ) -> Table {
        let name = format!("{}_Table{}", sheet_name, position + 1);
        let header_row = self.headers.detect_header_row(grid, &boundary);
        let band = self.headers.detect_header_rows(grid, &boundary);
        if band.len() > 1 && band.contains(&header_row) {
            let levels = self.headers.extract_hierarchical_headers(grid, &band, &boundary);
            let headers = self
                .headers
                .flatten_hierarchical_headers(&levels, HEADER_LEVEL_SEPARATOR);
            let band_end = band.last().copied().unwrap_or(header_row);
            self.rows.parse_table(grid, &name, headers, band_end, boundary)
        } else {
            let headers = self.headers.extract_headers(grid, header_row, &boundary);
            self.rows.parse_table(grid, &name, headers, header_row, boundary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::Cell;

    /// In-memory source serving hand-built sheets.
    struct VecSource {
        sheets: Vec<(String, Vec<Vec<Cell>>, Vec<MergeDescriptor>)>,
        fail_on: Option<String>,
    }

    impl VecSource {
        fn new(sheets: Vec<(&str, Vec<Vec<Cell>>, Vec<MergeDescriptor>)>) -> VecSource {
            VecSource {
                sheets: sheets
                    .into_iter()
                    .map(|(name, rows, merges)| (name.to_owned(), rows, merges))
                    .collect(),
                fail_on: None,
            }
        }
    }

    impl SheetSource for VecSource {
        fn name(&self) -> String {
            "memory.xlsx".to_owned()
        }

        fn sheet_names(&self) -> anyhow::Result<Vec<String>> {
            Ok(self.sheets.iter().map(|(name, _, _)| name.to_owned()).collect())
        }

        fn read_grid(&self, sheet_name: &str) -> anyhow::Result<Grid> {
            if self.fail_on.as_deref() == Some(sheet_name) {
                anyhow::bail!("decode failure");
            }
            self.sheets
                .iter()
                .find(|(name, _, _)| name == sheet_name)
                .map(|(_, rows, _)| Grid::new(rows.to_owned()))
                .ok_or_else(|| anyhow::anyhow!("unknown sheet '{}'", sheet_name))
        }

        fn merge_regions(&self, sheet_name: &str) -> anyhow::Result<Vec<MergeDescriptor>> {
            self.sheets
                .iter()
                .find(|(name, _, _)| name == sheet_name)
                .map(|(_, _, merges)| merges.to_owned())
                .ok_or_else(|| anyhow::anyhow!("unknown sheet '{}'", sheet_name))
        }
    }

    fn fruit_rows() -> Vec<Vec<Cell>> {
        vec![
            vec![Cell::text(0, 0, "ID"), Cell::text(0, 1, "Name")],
            vec![Cell::number(1, 0, 1.0), Cell::text(1, 1, "Apple")],
            vec![Cell::number(2, 0, 2.0), Cell::text(2, 1, "Pear")],
        ]
    }

    fn reader() -> WorkbookReader {
        WorkbookReader::new(DetectionConfig::default())
    }

    #[test]
    fn single_sheet_workbook() {
        let source = VecSource::new(vec![("Fruit", fruit_rows(), Vec::new())]);
        let workbook = reader().read_workbook(&source).unwrap();

        assert_eq!(workbook.file_path, "memory.xlsx");
        assert_eq!(workbook.sheets.len(), 1);
        let sheet = &workbook.sheets[0];
        assert_eq!(sheet.name, "Fruit");
        assert_eq!(sheet.tables.len(), 1);
        let table = &sheet.tables[0];
        assert_eq!(table.name, "Fruit_Table1");
        assert_eq!(table.headers, vec!["ID", "Name"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].get("Name").unwrap().raw_text, "Apple");
    }

    #[test]
    fn empty_sheet_yields_zero_tables() {
        let source = VecSource::new(vec![("Blank", Vec::new(), Vec::new())]);
        let workbook = reader().read_workbook(&source).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        assert!(workbook.sheets[0].tables.is_empty());
    }

    #[test]
    fn sheet_not_found() {
        let source = VecSource::new(vec![("Fruit", fruit_rows(), Vec::new())]);
        let error = reader().read_sheet(&source, "Missing").unwrap_err();
        assert!(error.to_string().contains("Missing"));
    }

    #[test]
    fn source_failures_carry_sheet_context() {
        let mut source = VecSource::new(vec![("Fruit", fruit_rows(), Vec::new())]);
        source.fail_on = Some("Fruit".to_owned());
        let error = reader().read_workbook(&source).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("sheet 'Fruit'"));
        assert!(message.contains("decode failure"));
    }

    #[test]
    fn merged_header_band_flattens() {
        let rows = vec![
            vec![
                Cell::text(0, 0, "Region"),
                Cell::text(0, 1, "Sales"),
                Cell::empty(0, 2),
            ],
            vec![
                Cell::empty(1, 0),
                Cell::text(1, 1, "Q1"),
                Cell::text(1, 2, "Q2"),
            ],
            vec![
                Cell::text(2, 0, "North"),
                Cell::number(2, 1, 10.0),
                Cell::number(2, 2, 20.0),
            ],
            vec![
                Cell::text(3, 0, "South"),
                Cell::number(3, 1, 30.0),
                Cell::number(3, 2, 40.0),
            ],
        ];
        let merges = vec![
            MergeDescriptor::new("B1", "C1", "Sales"),
            MergeDescriptor::new("A1", "A2", "Region"),
        ];
        let source = VecSource::new(vec![("Report", rows, merges)]);
        let workbook = reader().read_workbook(&source).unwrap();

        let table = &workbook.sheets[0].tables[0];
        assert_eq!(table.headers, vec!["Region", "Sales_Q1", "Sales_Q2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0].get("Sales_Q1").unwrap().raw_text, "10");
        assert_eq!(table.rows[1].get("Region").unwrap().raw_text, "South");
    }

    #[test]
    fn parallel_matches_sequential() {
        let second = vec![
            vec![Cell::text(0, 0, "City"), Cell::text(0, 1, "Code")],
            vec![Cell::text(1, 0, "Oslo"), Cell::number(1, 1, 1.0)],
        ];
        let source = VecSource::new(vec![
            ("Fruit", fruit_rows(), Vec::new()),
            ("Cities", second, Vec::new()),
            ("Blank", Vec::new(), Vec::new()),
        ]);
        let reader = reader();
        let sequential = reader.read_workbook(&source).unwrap();
        let parallel = reader.read_workbook_parallel(&source).unwrap();

        assert_eq!(sequential.sheets.len(), parallel.sheets.len());
        for (left, right) in sequential.sheets.iter().zip(parallel.sheets.iter()) {
            assert_eq!(left.name, right.name);
            assert_eq!(left.index, right.index);
            assert_eq!(left.tables.len(), right.tables.len());
            for (first, second) in left.tables.iter().zip(right.tables.iter()) {
                assert_eq!(first.name, second.name);
                assert_eq!(first.headers, second.headers);
                assert_eq!(first.row_count(), second.row_count());
            }
        }
    }

    #[test]
    fn parallel_surfaces_first_failure() {
        let mut source = VecSource::new(vec![
            ("Fruit", fruit_rows(), Vec::new()),
            ("Broken", fruit_rows(), Vec::new()),
        ]);
        source.fail_on = Some("Broken".to_owned());
        let error = reader().read_workbook_parallel(&source).unwrap_err();
        assert!(error.to_string().contains("sheet 'Broken'"));
    }

    #[test]
    fn selector_filters_and_limits() {
        let source = VecSource::new(vec![
            ("Data 2023", fruit_rows(), Vec::new()),
            ("Data 2024", fruit_rows(), Vec::new()),
            ("Notes", fruit_rows(), Vec::new()),
        ]);
        let selector = SheetSelector {
            sheet_name_patterns: Some(vec![Pattern::new("Data *").unwrap()]),
            sheet_limit: Some(1),
        };
        let workbook = reader().read_workbook_where(&source, &selector).unwrap();
        assert_eq!(workbook.sheets.len(), 1);
        assert_eq!(workbook.sheets[0].name, "Data 2023");
        // original workbook index is preserved on the sheet
        assert_eq!(workbook.sheets[0].index, 0);
    }
}
