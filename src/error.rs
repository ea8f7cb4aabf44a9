use thiserror::Error;

/// Main error type for the sheet_tables crate.
/// Aggregates errors from the grid, detection, and reader modules along with
/// failures surfaced by external spreadsheet sources.
#[derive(Error, Debug)]
pub enum SheetTablesError {
    #[error("{0}")]
    WithContextError(String),

    /// Failures reported by a `SheetSource` implementation
    #[error("{0}")]
    SourceError(#[from] anyhow::Error),

    // Grid module errors
    #[error("{0}")]
    ReferenceError(#[from] crate::grid::reference::ReferenceError),

    // Detection module errors
    #[error("{0}")]
    BoundaryError(#[from] crate::detect::BoundaryError),

    // Reader module errors
    #[error("{0}")]
    ReaderError(#[from] crate::reader::ReaderError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, SheetTablesError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| SheetTablesError::WithContextError(format!("{}: {}", message, e)))
    }
}
