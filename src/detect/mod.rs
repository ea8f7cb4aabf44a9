//! # Table Detection Module
//!
//! Structural inference over a merge-aware cell grid: boundary detection,
//! header detection, and row materialization. All components are constructed
//! from one shared, immutable `DetectionConfig` and are stateless with
//! respect to any given grid.
pub mod analyzer;
pub mod header;
pub mod rows;

use crate::grid::merge::MergeRange;
use thiserror::Error;

/// Errors related to table boundary computation.
#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("Degenerate boundary: rows {start_row}..{end_row}, cols {start_col}..{end_col}")]
    Degenerate {
        start_row: usize,
        end_row: usize,
        start_col: usize,
        end_col: usize,
    },
}

/// Tunable thresholds for table boundary and header detection.
/// Created once and passed by value into each component's constructor.
#[derive(Copy, Clone, Debug)]
pub struct DetectionConfig {
    /// Minimum number of columns for a region to qualify as a table
    pub min_columns: usize,
    /// Minimum number of rows for a region to qualify as a table
    pub min_rows: usize,
    /// Consecutive empty rows tolerated while extending a boundary downward
    pub max_empty_rows: usize,
    /// Minimum non-empty ratio for a window to count as dense
    pub header_density: f64,
    /// Minimum share of agreeing cell types for a column to keep a typed kind
    pub column_consistency: f64,
    /// Copy each merge origin's value into all cells of its range
    pub expand_merged_cells: bool,
    /// Stamp merge metadata onto cells even when not expanding values
    pub track_merge_metadata: bool,
}

impl Default for DetectionConfig {
    fn default() -> DetectionConfig {
        DetectionConfig {
            min_columns: 2,
            min_rows: 2,
            max_empty_rows: 2,
            header_density: 0.5,
            column_consistency: 0.7,
            expand_merged_cells: true,
            track_merge_metadata: true,
        }
    }
}

/// A rectangular sub-region of a grid believed to hold one table,
/// inclusive on both ends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableBoundary {
    pub start_row: usize,
    pub end_row: usize,
    pub start_col: usize,
    pub end_col: usize,
}

impl TableBoundary {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> TableBoundary {
        TableBoundary {
            start_row,
            end_row,
            start_col,
            end_col,
        }
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.start_row <= row && row <= self.end_row && self.start_col <= col && col <= self.end_col
    }

    /// True when both row and column spans intersect; spans are inclusive so
    /// rectangles meeting at a shared cell count as overlapping.
    pub fn intersects(&self, other: &TableBoundary) -> bool {
        self.start_row <= other.end_row
            && other.start_row <= self.end_row
            && self.start_col <= other.end_col
            && other.start_col <= self.end_col
    }

    pub fn union(&self, other: &TableBoundary) -> TableBoundary {
        TableBoundary {
            start_row: self.start_row.min(other.start_row),
            end_row: self.end_row.max(other.end_row),
            start_col: self.start_col.min(other.start_col),
            end_col: self.end_col.max(other.end_col),
        }
    }

    pub fn contains_range(&self, range: &MergeRange) -> bool {
        self.start_row <= range.start_row
            && range.end_row <= self.end_row
            && self.start_col <= range.start_col
            && range.end_col <= self.end_col
    }

    /// Enlarges the boundary so the merge range fits entirely inside it.
    pub fn expand_to_include(&mut self, range: &MergeRange) {
        self.start_row = self.start_row.min(range.start_row);
        self.end_row = self.end_row.max(range.end_row);
        self.start_col = self.start_col.min(range.start_col);
        self.end_col = self.end_col.max(range.end_col);
    }

    /// Clamps the boundary to a grid of the given size.
    ///
    /// # Errors
    ///
    /// Returns `BoundaryError::Degenerate` when clamping leaves a start index
    /// past the matching end index, e.g. a boundary entirely outside the grid.
    pub fn clamped(&self, row_count: usize, col_count: usize) -> Result<TableBoundary, BoundaryError> {
        let end_row = self.end_row.min(row_count.saturating_sub(1));
        let end_col = self.end_col.min(col_count.saturating_sub(1));
        if row_count == 0 || col_count == 0 || self.start_row > end_row || self.start_col > end_col {
            return Err(BoundaryError::Degenerate {
                start_row: self.start_row,
                end_row,
                start_col: self.start_col,
                end_col,
            });
        }
        Ok(TableBoundary {
            start_row: self.start_row,
            end_row,
            start_col: self.start_col,
            end_col,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DetectionConfig::default();
        assert_eq!(config.min_columns, 2);
        assert_eq!(config.min_rows, 2);
        assert_eq!(config.max_empty_rows, 2);
        assert_eq!(config.header_density, 0.5);
        assert_eq!(config.column_consistency, 0.7);
        assert!(config.expand_merged_cells);
        assert!(config.track_merge_metadata);
    }

    #[test]
    fn boundary_spans() {
        let boundary = TableBoundary::new(2, 1, 4, 3);
        assert_eq!(boundary.row_count(), 3);
        assert_eq!(boundary.col_count(), 3);
        assert!(boundary.contains(3, 2));
        assert!(!boundary.contains(5, 2));
    }

    #[test]
    fn boundary_intersection_and_union() {
        let first = TableBoundary::new(0, 0, 2, 2);
        let touching = TableBoundary::new(2, 2, 4, 4);
        let apart = TableBoundary::new(3, 3, 4, 4);
        assert!(first.intersects(&touching));
        assert!(!first.intersects(&apart));
        assert_eq!(first.union(&touching), TableBoundary::new(0, 0, 4, 4));
    }

    #[test]
    fn boundary_merge_expansion() {
        let mut boundary = TableBoundary::new(1, 1, 2, 2);
        let range = MergeRange::new(0, 1, 1, 4);
        assert!(!boundary.contains_range(&range));
        boundary.expand_to_include(&range);
        assert_eq!(boundary, TableBoundary::new(0, 1, 2, 4));
        assert!(boundary.contains_range(&range));
    }

    #[test]
    fn boundary_clamping() {
        let boundary = TableBoundary::new(1, 1, 10, 10);
        assert_eq!(boundary.clamped(4, 3).unwrap(), TableBoundary::new(1, 1, 3, 2));
        assert!(boundary.clamped(1, 1).is_err());
        assert!(boundary.clamped(0, 0).is_err());
    }
}
