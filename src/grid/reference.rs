use regex::Regex;
use thiserror::Error;

/// Errors related to A1-style cell reference parsing.
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Invalid cell reference '{0}'")]
    FormatError(String),
}

/// Converts a column label ("A", "BC") to a 0-based column index.
pub(crate) fn col_to_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for character in label.chars() {
        if !character.is_ascii_uppercase() {
            return None;
        }
        index = index * 26 + (character as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Converts a 1-based row label ("1", "42") to a 0-based row index.
pub(crate) fn row_to_index(label: &str) -> Option<usize> {
    label
        .parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .map(|row| row - 1)
}

/// Parses an A1-style cell reference (e.g., "B3") into 0-based (row, col) indexes.
pub fn reference_to_index(reference: &str) -> Result<(usize, usize), ReferenceError> {
    let pattern = Regex::new(r"^([A-Z]+)([0-9]+)$").expect("Hardcode regex pattern");
    let reference = reference.trim().to_ascii_uppercase();
    let captures = pattern
        .captures(reference.as_str())
        .ok_or_else(|| ReferenceError::FormatError(reference.to_owned()))?;
    let col = captures.get(1).map(|matcher| matcher.as_str()).and_then(col_to_index);
    let row = captures.get(2).map(|matcher| matcher.as_str()).and_then(row_to_index);
    row.zip(col).ok_or(ReferenceError::FormatError(reference))
}

/// Converts 0-based (row, col) indexes to an A1-style cell reference.
pub fn index_to_reference(row: usize, col: usize) -> String {
    let row = (row + 1).to_string();
    let mut col: u32 = col as u32 + 1;
    let mut reference = String::new();
    while col > 0 {
        col -= 1;
        let digit = char::from_u32(65 + col % 26).expect("Hardcode letters");
        col /= 26;
        reference.insert(0, digit);
    }
    reference.push_str(row.as_str());
    reference
}
