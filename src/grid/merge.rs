use crate::detect::DetectionConfig;
use crate::grid::reference::reference_to_index;
use crate::grid::reference::ReferenceError;
use crate::grid::Grid;
use std::collections::HashMap;

/// Raw merge-region descriptor supplied by the spreadsheet access layer,
/// given as two opposing corner references plus the region's display value.
#[derive(Clone, Debug)]
pub struct MergeDescriptor {
    /// One corner of the region (A1-style, e.g. "A1")
    pub first_corner: String,
    /// The opposing corner (e.g. "C3")
    pub last_corner: String,
    /// Value displayed for the merged region
    pub value: String,
}

impl MergeDescriptor {
    pub fn new(first_corner: &str, last_corner: &str, value: &str) -> MergeDescriptor {
        MergeDescriptor {
            first_corner: first_corner.to_owned(),
            last_corner: last_corner.to_owned(),
            value: value.to_owned(),
        }
    }
}

/// A normalized, zero-indexed merged-cell region, inclusive on both ends.
///
/// Every cell inside the rectangle is stamped with an equal range; exactly
/// one stamped copy, on the top-left cell, carries `is_origin = true`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MergeRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
    pub is_origin: bool,
}

impl MergeRange {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> MergeRange {
        MergeRange {
            start_row,
            start_col,
            end_row,
            end_col,
            is_origin: false,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.start_row <= row && row <= self.end_row && self.start_col <= col && col <= self.end_col
    }

    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    fn with_origin(&self, is_origin: bool) -> MergeRange {
        MergeRange { is_origin, ..*self }
    }
}

/// Converts raw merge descriptors into normalized ranges and stamps merge
/// metadata onto every cell of each range according to the configuration.
pub struct MergeProcessor {
    config: DetectionConfig,
}

impl MergeProcessor {
    pub fn new(config: DetectionConfig) -> MergeProcessor {
        MergeProcessor { config }
    }

    /// Parses corner-pair descriptors into zero-indexed, normalized ranges.
    /// Degenerate descriptors whose corners name the same cell are dropped.
    ///
    /// # Errors
    ///
    /// Fails only when a corner reference cannot be parsed into coordinates.
    pub fn parse(&self, descriptors: &[MergeDescriptor]) -> Result<Vec<MergeRange>, ReferenceError> {
        let mut ranges = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let (first_row, first_col) = reference_to_index(&descriptor.first_corner)?;
            let (last_row, last_col) = reference_to_index(&descriptor.last_corner)?;
            if first_row == last_row && first_col == last_col {
                continue;
            }
            ranges.push(MergeRange::new(
                first_row.min(last_row),
                first_col.min(last_col),
                first_row.max(last_row),
                first_col.max(last_col),
            ));
        }
        Ok(ranges)
    }

    /// Stamps each range onto the grid. With `expand_merged_cells` the origin
    /// cell's parsed value and raw text are copied into every other cell of
    /// the range; with `track_merge_metadata` each cell receives the range
    /// with its own `is_origin` flag. Range cells outside the grid are
    /// silently skipped. When both flags are off the grid is left untouched.
    pub fn apply(&self, grid: &mut Grid, ranges: &[MergeRange]) {
        if !self.config.expand_merged_cells && !self.config.track_merge_metadata {
            return;
        }
        for range in ranges {
            let origin = grid
                .get(range.start_row, range.start_col)
                .map(|cell| (cell.value.clone(), cell.raw_text.clone()));
            for row in range.start_row..=range.end_row {
                for col in range.start_col..=range.end_col {
                    let Some(cell) = grid.get_mut(row, col) else {
                        continue;
                    };
                    let is_origin = row == range.start_row && col == range.start_col;
                    if self.config.expand_merged_cells && !is_origin {
                        if let Some((value, raw_text)) = &origin {
                            cell.value = value.clone();
                            cell.raw_text = raw_text.clone();
                        }
                    }
                    if self.config.track_merge_metadata {
                        cell.merge = Some(range.with_origin(is_origin));
                    }
                }
            }
        }
    }
}

/// Lookup map from (row, col) to the merge range covering that position.
pub(crate) struct MergeMap {
    index: HashMap<(usize, usize), MergeRange>,
}

impl MergeMap {
    pub(crate) fn new(ranges: &[MergeRange]) -> MergeMap {
        let mut index = HashMap::new();
        for range in ranges {
            for row in range.start_row..=range.end_row {
                for col in range.start_col..=range.end_col {
                    index.insert((row, col), *range);
                }
            }
        }
        MergeMap { index }
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> Option<&MergeRange> {
        self.index.get(&(row, col))
    }
}
