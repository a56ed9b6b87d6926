// ==========================================
// Fleet Import - Import Error Types
// ==========================================
// Fatal, file-level failures only. Row and field problems are
// reported as ImportWarning and never surface here.
// ==========================================

use thiserror::Error;

/// Errors that abort a whole import attempt
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv are accepted)")]
    UnsupportedFormat(String),

    #[error("file too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to parse Excel workbook: {0}")]
    ExcelParseError(String),

    #[error("failed to parse CSV: {0}")]
    CsvParseError(String),

    #[error("workbook has no sheets: {0}")]
    EmptyWorkbook(String),

    #[error("missing header row: {0}")]
    MissingHeaderRow(String),

    // ===== Config errors =====
    #[error("failed to read config (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result alias for fatal import errors
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::UnsupportedFormat("pdf".to_string());
        assert!(err.to_string().contains("pdf"));

        let err = ImportError::FileTooLarge { size: 30, limit: 10 };
        assert_eq!(err.to_string(), "file too large: 30 bytes (limit 10 bytes)");
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ImportError = io.into();
        assert!(matches!(err, ImportError::FileReadError(_)));
    }
}
