use crate::detect::DetectionConfig;
use crate::detect::TableBoundary;
use crate::grid::merge::MergeMap;
use crate::grid::merge::MergeRange;
use crate::grid::Grid;
use log::debug;

/// Number of rows sampled per candidate column when expanding a boundary
/// rightward. Columns are judged on a short window rather than a single row
/// so sparse columns inside a table survive.
const RIGHT_SCAN_WINDOW: usize = 10;

/// Scans a merge-aware grid for rectangular regions of related data.
///
/// Detection expands a boundary from each unvisited non-empty seed cell using
/// contiguity and density rules, marks consumed cells in a visited mask, and
/// keeps only rectangles meeting the configured minimum size.
pub struct TableAnalyzer {
    config: DetectionConfig,
}

impl TableAnalyzer {
    pub fn new(config: DetectionConfig) -> TableAnalyzer {
        TableAnalyzer { config }
    }

    /// Detects table boundaries in seed order (top-to-bottom, left-to-right).
    ///
    /// Every cell of an expanded rectangle is marked visited whether or not
    /// the rectangle qualifies, so undersized fragments are never re-detected.
    /// A boundary is enlarged until it fully contains every merge range it
    /// overlaps; a merge is never split across a table boundary.
    pub fn detect_tables(&self, grid: &Grid, merges: &[MergeRange]) -> Vec<TableBoundary> {
        if grid.is_empty() {
            return Vec::new();
        }
        let row_count = grid.row_count();
        let col_count = grid.col_count();
        let merge_map = MergeMap::new(merges);
        let mut visited = vec![vec![false; col_count]; row_count];
        let mut tables = Vec::new();

        for row in 0..row_count {
            for col in 0..col_count {
                if visited[row][col] || !grid.has_value(row, col) {
                    continue;
                }
                let boundary = self.expand_boundary(grid, row, col, &merge_map);
                for visited_row in boundary.start_row..=boundary.end_row.min(row_count - 1) {
                    for visited_col in boundary.start_col..=boundary.end_col.min(col_count - 1) {
                        visited[visited_row][visited_col] = true;
                    }
                }
                if boundary.row_count() >= self.config.min_rows
                    && boundary.col_count() >= self.config.min_columns
                {
                    debug!(
                        "table boundary rows {}..{} cols {}..{} from seed ({row}, {col})",
                        boundary.start_row, boundary.end_row, boundary.start_col, boundary.end_col
                    );
                    tables.push(boundary);
                }
            }
        }
        tables
    }

    /// Finds dense square regions by sliding a window across the grid and
    /// merging overlapping candidates until no two remaining regions touch.
    /// Useful for boundary detection on atypically dense documents; windows
    /// of zero size or larger than the grid yield no regions.
    pub fn find_dense_regions(&self, grid: &Grid, window_size: usize) -> Vec<TableBoundary> {
        if grid.is_empty() || window_size == 0 {
            return Vec::new();
        }
        let row_count = grid.row_count();
        let col_count = grid.col_count();
        if window_size > row_count || window_size > col_count {
            return Vec::new();
        }

        let window_area = (window_size * window_size) as f64;
        let mut candidates = Vec::new();
        for row in 0..=(row_count - window_size) {
            for col in 0..=(col_count - window_size) {
                let mut filled = 0usize;
                for window_row in row..(row + window_size) {
                    for window_col in col..(col + window_size) {
                        if grid.has_value(window_row, window_col) {
                            filled += 1;
                        }
                    }
                }
                if filled as f64 / window_area >= self.config.header_density {
                    candidates.push(TableBoundary::new(
                        row,
                        col,
                        row + window_size - 1,
                        col + window_size - 1,
                    ));
                }
            }
        }
        merge_overlapping(candidates)
    }

    fn expand_boundary(
        &self,
        grid: &Grid,
        seed_row: usize,
        seed_col: usize,
        merges: &MergeMap,
    ) -> TableBoundary {
        let left = find_left(grid, seed_row, seed_col);
        let right = self.find_right(grid, seed_row, seed_col);
        let bottom = self.find_bottom(grid, seed_row, left, right);
        let boundary = TableBoundary::new(seed_row, left, bottom, right);
        cover_merges(boundary, merges)
    }

    /// Extends the right edge column by column, sampling a short row window
    /// per column. At most one fully empty column may bridge two populated
    /// spans; a second consecutive empty column terminates the scan.
    fn find_right(&self, grid: &Grid, seed_row: usize, seed_col: usize) -> usize {
        let mut right = seed_col;
        let mut consecutive_empty = 0usize;
        for col in (seed_col + 1)..grid.col_count() {
            if self.column_has_data(grid, col, seed_row) {
                right = col;
                consecutive_empty = 0;
            } else {
                consecutive_empty += 1;
                if consecutive_empty > 1 {
                    break;
                }
            }
        }
        right
    }

    fn column_has_data(&self, grid: &Grid, col: usize, start_row: usize) -> bool {
        let end_row = (start_row + RIGHT_SCAN_WINDOW).min(grid.row_count());
        (start_row..end_row).any(|row| grid.has_value(row, col))
    }

    /// Extends the bottom edge while any cell in the column span carries
    /// data, tolerating up to `max_empty_rows` consecutive empty rows.
    fn find_bottom(&self, grid: &Grid, seed_row: usize, left: usize, right: usize) -> usize {
        let mut bottom = seed_row;
        let mut consecutive_empty = 0usize;
        for row in (seed_row + 1)..grid.row_count() {
            if (left..=right).any(|col| grid.has_value(row, col)) {
                bottom = row;
                consecutive_empty = 0;
            } else {
                consecutive_empty += 1;
                if consecutive_empty > self.config.max_empty_rows {
                    break;
                }
            }
        }
        bottom
    }
}

/// Walks left from the seed along the seed row while cells remain non-empty.
fn find_left(grid: &Grid, seed_row: usize, seed_col: usize) -> usize {
    let mut left = seed_col;
    while left > 0 && grid.has_value(seed_row, left - 1) {
        left -= 1;
    }
    left
}

/// Repeatedly enlarges the boundary to contain every merge range it overlaps
/// until no overlapping range sticks out.
fn cover_merges(mut boundary: TableBoundary, merges: &MergeMap) -> TableBoundary {
    loop {
        let mut expanded = boundary;
        for row in boundary.start_row..=boundary.end_row {
            for col in boundary.start_col..=boundary.end_col {
                if let Some(range) = merges.get(row, col) {
                    expanded.expand_to_include(range);
                }
            }
        }
        if expanded == boundary {
            return boundary;
        }
        boundary = expanded;
    }
}

/// Unions any two intersecting rectangles until no more merges apply.
fn merge_overlapping(mut regions: Vec<TableBoundary>) -> Vec<TableBoundary> {
    loop {
        let mut merged = false;
        'scan: for first in 0..regions.len() {
            for second in (first + 1)..regions.len() {
                if regions[first].intersects(&regions[second]) {
                    regions[first] = regions[first].union(&regions[second]);
                    regions.remove(second);
                    merged = true;
                    break 'scan;
                }
            }
        }
        if !merged {
            return regions;
        }
    }
}
