use crate::detect::DetectionConfig;
use crate::detect::TableBoundary;
use crate::grid::cell::CellType;
use crate::grid::Grid;
use std::collections::HashMap;

/// Common header vocabulary, checked as case-insensitive substrings of each
/// cell's trimmed text.
const HEADER_TOKENS: &[&str] = &[
    "id", "name", "title", "date", "time", "year", "month", "email", "phone",
    "address", "city", "country", "status", "type", "category", "code",
    "amount", "price", "cost", "total", "count", "quantity", "description",
];

/// Maximum number of boundary rows scored when locating a header row.
const HEADER_SCAN_ROWS: usize = 6;

/// Maximum height of a merged header band.
const MAX_HEADER_BAND: usize = 3;

/// Prefix of generated placeholder column names.
const PLACEHOLDER_PREFIX: &str = "Column_";

/// Scores candidate rows of a table boundary to find the most likely header
/// row, extracts normalized column names, and flattens multi-row header
/// bands produced by merged group headers.
pub struct HeaderDetector {
    config: DetectionConfig,
}

impl HeaderDetector {
    pub fn new(config: DetectionConfig) -> HeaderDetector {
        HeaderDetector { config }
    }

    /// Returns the grid row index of the highest-scoring candidate among the
    /// first rows of the boundary. Ties keep the topmost maximum. A boundary
    /// starting beyond the grid returns its own start row without inspection.
    pub fn detect_header_row(&self, grid: &Grid, boundary: &TableBoundary) -> usize {
        if boundary.start_row >= grid.row_count() {
            return boundary.start_row;
        }
        let last_candidate = boundary
            .end_row
            .min(boundary.start_row + HEADER_SCAN_ROWS - 1);
        let mut best_row = boundary.start_row;
        let mut best_score = f64::MIN;
        for row in boundary.start_row..=last_candidate {
            let score = self.score_header_row(grid, row, boundary);
            if score > best_score {
                best_score = score;
                best_row = row;
            }
        }
        best_row
    }

    /// Additive header likelihood score for one row.
    ///
    /// Density of non-empty cells contributes up to 40 points, the share of
    /// string-typed cells among non-empty cells up to 30, a row that is more
    /// textual than the row beneath it gains 20, each vocabulary match gains
    /// 2, and each merge-origin cell gains 5. Rows outside the grid score 0.
    fn score_header_row(&self, grid: &Grid, row: usize, boundary: &TableBoundary) -> f64 {
        if row >= grid.row_count() {
            return 0.0;
        }
        let total = boundary.col_count();
        let mut non_empty = 0usize;
        let mut strings = 0usize;
        let mut pattern_cells = 0usize;
        let mut merge_origins = 0usize;
        for col in boundary.start_col..=boundary.end_col {
            let Some(cell) = grid.get(row, col) else {
                continue;
            };
            if cell.is_empty() {
                continue;
            }
            non_empty += 1;
            if cell.value.kind() == CellType::Text {
                strings += 1;
            }
            let text = cell.raw_text.trim().to_lowercase();
            if HEADER_TOKENS.iter().any(|token| text.contains(token)) {
                pattern_cells += 1;
            }
            if cell.is_merge_origin() {
                merge_origins += 1;
            }
        }

        let mut score = 0.0;
        if total > 0 {
            score += non_empty as f64 / total as f64 * 40.0;
        }
        if non_empty > 0 {
            score += strings as f64 / non_empty as f64 * 30.0;
        }
        if row + 1 <= boundary.end_row && strings > self.count_strings(grid, row + 1, boundary) {
            score += 20.0;
        }
        score += (pattern_cells * 2) as f64;
        score += (merge_origins * 5) as f64;
        score
    }

    fn count_strings(&self, grid: &Grid, row: usize, boundary: &TableBoundary) -> usize {
        (boundary.start_col..=boundary.end_col)
            .filter_map(|col| grid.get(row, col))
            .filter(|cell| cell.value.kind() == CellType::Text)
            .count()
    }

    /// Reads the header-row cells in column order, trims whitespace, fills
    /// empty names with generated placeholders, and de-duplicates
    /// case-insensitively by appending an occurrence suffix.
    pub fn extract_headers(
        &self,
        grid: &Grid,
        header_row: usize,
        boundary: &TableBoundary,
    ) -> Vec<String> {
        let headers = (boundary.start_col..=boundary.end_col)
            .enumerate()
            .map(|(position, col)| normalized_label(grid, header_row, col, position))
            .collect();
        dedupe_headers(headers)
    }

    /// Requires at least `min_columns` headers with at least half of them
    /// meaningful (neither empty nor a generated placeholder).
    pub fn validate_headers(&self, headers: &[String]) -> bool {
        if headers.len() < self.config.min_columns {
            return false;
        }
        let meaningful = headers
            .iter()
            .filter(|name| !name.is_empty() && !is_placeholder(name))
            .count();
        meaningful * 2 >= headers.len()
    }

    /// Finds the contiguous header band starting at the boundary's first
    /// row: the band extends to the deepest merge range anchored in that
    /// row, capped at three rows and never past the boundary.
    pub fn detect_header_rows(&self, grid: &Grid, boundary: &TableBoundary) -> Vec<usize> {
        let first = boundary.start_row;
        let mut band_end = first;
        if first < grid.row_count() {
            for col in boundary.start_col..=boundary.end_col {
                if let Some(range) = grid.get(first, col).and_then(|cell| cell.merge) {
                    if range.start_row == first {
                        band_end = band_end.max(range.end_row);
                    }
                }
            }
        }
        band_end = band_end
            .min(first + MAX_HEADER_BAND - 1)
            .min(boundary.end_row);
        (first..=band_end).collect()
    }

    /// Extracts one normalized header list per band row. Labels are trimmed
    /// and empty cells become placeholders; no de-duplication is applied so
    /// group labels repeated across merged columns stay intact for
    /// flattening.
    pub fn extract_hierarchical_headers(
        &self,
        grid: &Grid,
        header_rows: &[usize],
        boundary: &TableBoundary,
    ) -> Vec<Vec<String>> {
        header_rows
            .iter()
            .map(|row| {
                (boundary.start_col..=boundary.end_col)
                    .enumerate()
                    .map(|(position, col)| normalized_label(grid, *row, col, position))
                    .collect()
            })
            .collect()
    }

    /// Combines multi-level headers into one name per column, taking
    /// non-placeholder labels from each level, skipping a label identical to
    /// the one above it (a merged group header carried into the next level),
    /// and joining the rest with the separator. Columns with no contributing
    /// labels fall back to the generated placeholder.
    pub fn flatten_hierarchical_headers(
        &self,
        levels: &[Vec<String>],
        separator: &str,
    ) -> Vec<String> {
        let width = levels.iter().map(Vec::len).max().unwrap_or(0);
        let mut flattened = Vec::with_capacity(width);
        for position in 0..width {
            let mut parts: Vec<&str> = Vec::new();
            for level in levels {
                let Some(label) = level.get(position) else {
                    continue;
                };
                if label.is_empty() || is_placeholder(label) {
                    continue;
                }
                if parts.last().map(|previous| *previous == label.as_str()).unwrap_or(false) {
                    continue;
                }
                parts.push(label);
            }
            if parts.is_empty() {
                flattened.push(placeholder(position));
            } else {
                flattened.push(parts.join(separator));
            }
        }
        dedupe_headers(flattened)
    }
}

fn placeholder(position: usize) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, position + 1)
}

fn is_placeholder(name: &str) -> bool {
    name.strip_prefix(PLACEHOLDER_PREFIX)
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

fn normalized_label(grid: &Grid, row: usize, col: usize, position: usize) -> String {
    let text = grid
        .get(row, col)
        .map(|cell| cell.raw_text.trim().to_owned())
        .unwrap_or_default();
    if text.is_empty() {
        placeholder(position)
    } else {
        text
    }
}

/// Case-insensitive de-duplication appending `_<n>` from the second
/// occurrence of a name onward.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.to_lowercase()).or_insert(0);
            *count += 1;
            if *count == 1 {
                name
            } else {
                format!("{}_{}", name, count)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::Cell;
    use crate::grid::merge::MergeProcessor;
    use crate::grid::merge::MergeRange;

    fn detector() -> HeaderDetector {
        HeaderDetector::new(DetectionConfig::default())
    }

    fn sales_grid() -> Grid {
        Grid::new(vec![
            vec![
                Cell::text(0, 0, "ID"),
                Cell::text(0, 1, "Name"),
                Cell::text(0, 2, "Price"),
            ],
            vec![
                Cell::number(1, 0, 1.0),
                Cell::text(1, 1, "Apple"),
                Cell::number(1, 2, 1.5),
            ],
            vec![
                Cell::number(2, 0, 2.0),
                Cell::text(2, 1, "Pear"),
                Cell::number(2, 2, 2.5),
            ],
        ])
    }

    #[test]
    fn textual_first_row_wins() {
        let grid = sales_grid();
        let boundary = TableBoundary::new(0, 0, 2, 2);
        assert_eq!(detector().detect_header_row(&grid, &boundary), 0);
    }

    #[test]
    fn detection_is_deterministic() {
        let grid = sales_grid();
        let boundary = TableBoundary::new(0, 0, 2, 2);
        let detector = detector();
        let first = detector.detect_header_row(&grid, &boundary);
        let second = detector.detect_header_row(&grid, &boundary);
        assert_eq!(first, second);
    }

    #[test]
    fn boundary_past_grid_returns_start_row() {
        let grid = sales_grid();
        let boundary = TableBoundary::new(10, 0, 12, 2);
        assert_eq!(detector().detect_header_row(&grid, &boundary), 10);
    }

    #[test]
    fn headers_deduplicate_case_insensitively() {
        let grid = Grid::new(vec![vec![
            Cell::text(0, 0, "ID"),
            Cell::text(0, 1, "Name"),
            Cell::text(0, 2, "Name"),
        ]]);
        let boundary = TableBoundary::new(0, 0, 0, 2);
        let headers = detector().extract_headers(&grid, 0, &boundary);
        assert_eq!(headers, vec!["ID", "Name", "Name_2"]);
    }

    #[test]
    fn missing_header_cells_get_placeholders() {
        let grid = Grid::new(vec![vec![
            Cell::text(0, 0, "  ID  "),
            Cell::empty(0, 1),
            Cell::text(0, 2, "Total"),
        ]]);
        let boundary = TableBoundary::new(0, 0, 0, 3);
        let headers = detector().extract_headers(&grid, 0, &boundary);
        assert_eq!(headers, vec!["ID", "Column_2", "Total", "Column_4"]);
    }

    #[test]
    fn header_validation() {
        let detector = detector();
        assert!(detector.validate_headers(&[
            "ID".to_owned(),
            "Name".to_owned(),
            "Column_3".to_owned(),
        ]));
        assert!(!detector.validate_headers(&["ID".to_owned()]));
        assert!(!detector.validate_headers(&[
            "ID".to_owned(),
            "Column_2".to_owned(),
            "Column_3".to_owned(),
        ]));
    }

    #[test]
    fn merged_band_detection_and_flattening() {
        // "Quarter" spans two columns on row 0, "Region" spans two rows
        let mut grid = Grid::new(vec![
            vec![
                Cell::text(0, 0, "Region"),
                Cell::text(0, 1, "Quarter"),
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
        ]);
        let processor = MergeProcessor::new(DetectionConfig::default());
        let merges = vec![MergeRange::new(0, 1, 0, 2), MergeRange::new(0, 0, 1, 0)];
        processor.apply(&mut grid, &merges);

        let detector = detector();
        let boundary = TableBoundary::new(0, 0, 2, 2);
        let band = detector.detect_header_rows(&grid, &boundary);
        assert_eq!(band, vec![0, 1]);

        let levels = detector.extract_hierarchical_headers(&grid, &band, &boundary);
        assert_eq!(levels[0], vec!["Region", "Quarter", "Quarter"]);
        assert_eq!(levels[1], vec!["Region", "Q1", "Q2"]);

        let flattened = detector.flatten_hierarchical_headers(&levels, "_");
        assert_eq!(flattened, vec!["Region", "Quarter_Q1", "Quarter_Q2"]);
    }

    #[test]
    fn band_is_capped_at_boundary_and_three_rows() {
        let mut grid = Grid::new(vec![
            vec![Cell::text(0, 0, "Deep"), Cell::text(0, 1, "Header")],
            vec![Cell::empty(1, 0), Cell::empty(1, 1)],
            vec![Cell::empty(2, 0), Cell::empty(2, 1)],
            vec![Cell::empty(3, 0), Cell::empty(3, 1)],
            vec![Cell::text(4, 0, "a"), Cell::text(4, 1, "b")],
        ]);
        let processor = MergeProcessor::new(DetectionConfig::default());
        processor.apply(&mut grid, &[MergeRange::new(0, 0, 4, 0)]);

        let detector = detector();
        let capped = detector.detect_header_rows(&grid, &TableBoundary::new(0, 0, 4, 1));
        assert_eq!(capped, vec![0, 1, 2]);
        let bounded = detector.detect_header_rows(&grid, &TableBoundary::new(0, 0, 1, 1));
        assert_eq!(bounded, vec![0, 1]);
    }

    #[test]
    fn flatten_falls_back_to_placeholders() {
        let levels = vec![
            vec!["Column_1".to_owned(), "Group".to_owned()],
            vec!["".to_owned(), "Group".to_owned()],
        ];
        let flattened = detector().flatten_hierarchical_headers(&levels, "_");
        assert_eq!(flattened, vec!["Column_1", "Group"]);
    }
}
