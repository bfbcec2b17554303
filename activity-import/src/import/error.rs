use std::path::PathBuf;

use thiserror::Error;

/// Broad category of an import failure, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad path, extension or responsible number. Nothing was touched.
    UserInput,
    /// The sheet does not have the expected shape. Nothing was inserted.
    Format,
    /// The staging transaction failed and was rolled back.
    Transaction,
    /// Reading, converting or staging the workbook failed.
    Resource,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no file selected")]
    MissingFile,

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported file type: {} (expected .xls or .xlsx)", .path.display())]
    UnsupportedExtension { path: PathBuf },

    #[error("responsible number must be an integer, got '{0}'")]
    InvalidResponsible(String),

    #[error("no header row found in rows {first}..={last}")]
    HeadersNotFound { first: u32, last: u32 },

    #[error("missing required columns: {}. Headers found: {}", .missing.join(", "), .found.join(", "))]
    MissingColumns {
        missing: Vec<&'static str>,
        found: Vec<String>,
    },

    #[error("workbook has no sheets: {}", .0.display())]
    EmptyWorkbook(PathBuf),

    #[error("import failed: cannot read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("import failed: cannot create temporary file: {0}")]
    TempFile(#[from] std::io::Error),

    #[error("import failed: cannot convert legacy workbook: {0}")]
    LegacyConversion(#[from] rust_xlsxwriter::XlsxError),

    /// Repository failure; the staging table keeps its previous rows
    #[error("import failed: {0:#}")]
    Transaction(anyhow::Error),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::MissingFile
            | ImportError::FileNotFound(_)
            | ImportError::UnsupportedExtension { .. }
            | ImportError::InvalidResponsible(_) => ErrorKind::UserInput,
            ImportError::HeadersNotFound { .. }
            | ImportError::MissingColumns { .. }
            | ImportError::EmptyWorkbook(_) => ErrorKind::Format,
            ImportError::Transaction(_) => ErrorKind::Transaction,
            ImportError::Workbook { .. }
            | ImportError::TempFile(_)
            | ImportError::LegacyConversion(_) => ErrorKind::Resource,
        }
    }

    pub(crate) fn workbook(path: impl Into<PathBuf>, source: impl Into<calamine::Error>) -> Self {
        ImportError::Workbook {
            path: path.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
