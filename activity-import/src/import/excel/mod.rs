//! Workbook access
//!
//! Dispatches on the file extension and hands the extractors a [`Sheet`].
//! Legacy `.xls` files are first rewritten into a temporary `.xlsx` that
//! lives exactly as long as the [`PreparedWorkbook`].

pub mod legacy;
pub mod sheet;

use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx, XlsxError, open_workbook};
use tempfile::NamedTempFile;

use super::error::{ImportError, Result};
use sheet::Sheet;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xls,
    Xlsx,
}

impl SpreadsheetFormat {
    /// Format from the file extension, case-insensitive
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xls" => Some(SpreadsheetFormat::Xls),
            "xlsx" => Some(SpreadsheetFormat::Xlsx),
            _ => None,
        }
    }
}

/// A validated input file, converted to `.xlsx` when needed
#[derive(Debug)]
pub struct PreparedWorkbook {
    source: PathBuf,
    temp: Option<NamedTempFile>,
}

impl PreparedWorkbook {
    /// Validate the path and run the legacy adapter for `.xls` input
    pub fn prepare(path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(ImportError::MissingFile);
        }

        let format = SpreadsheetFormat::from_path(path).ok_or_else(|| {
            ImportError::UnsupportedExtension {
                path: path.to_path_buf(),
            }
        })?;

        if !path.is_file() {
            return Err(ImportError::FileNotFound(path.to_path_buf()));
        }

        let temp = match format {
            SpreadsheetFormat::Xlsx => None,
            SpreadsheetFormat::Xls => {
                log::info!("Converting legacy workbook {}", path.display());
                Some(legacy::convert_to_temp_xlsx(path)?)
            }
        };

        Ok(Self {
            source: path.to_path_buf(),
            temp,
        })
    }

    pub fn is_converted(&self) -> bool {
        self.temp.is_some()
    }

    /// Path actually read: the temporary copy for legacy input
    pub fn read_path(&self) -> &Path {
        match &self.temp {
            Some(temp) => temp.path(),
            None => &self.source,
        }
    }

    /// Open the first worksheet
    pub fn open_first_sheet(&self) -> Result<Sheet> {
        let read_path = self.read_path();
        let mut workbook: Xlsx<_> = open_workbook(read_path)
            .map_err(|e: XlsxError| ImportError::workbook(&self.source, e))?;

        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::EmptyWorkbook(self.source.clone()))?;
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ImportError::workbook(&self.source, e))?;

        let sheet = Sheet::new(name, range);
        log::debug!(
            "Opened sheet '{}' of {} ({} rows, {} date system)",
            sheet.name,
            self.source.display(),
            sheet.last_row(),
            sheet.epoch()
        );
        Ok(sheet)
    }
}

impl Drop for PreparedWorkbook {
    fn drop(&mut self) {
        let Some(temp) = self.temp.take() else {
            return;
        };
        let temp_path = temp.path().to_path_buf();
        match temp.close() {
            Ok(()) => log::debug!("Removed temporary workbook {}", temp_path.display()),
            Err(e) => log::warn!(
                "Failed to remove temporary workbook {}: {}",
                temp_path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::error::ErrorKind;
    use calamine::Data;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("a/Actividades.XLSX")),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("dario.Xls")),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(SpreadsheetFormat::from_path(Path::new("notas.csv")), None);
        assert_eq!(SpreadsheetFormat::from_path(Path::new("sin_extension")), None);
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();

        let err = PreparedWorkbook::prepare(Path::new("")).unwrap_err();
        assert!(matches!(err, ImportError::MissingFile));

        let csv = dir.path().join("actividades.csv");
        std::fs::write(&csv, "a,b").unwrap();
        let err = PreparedWorkbook::prepare(&csv).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedExtension { .. }));
        assert_eq!(err.kind(), ErrorKind::UserInput);

        let err = PreparedWorkbook::prepare(&dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_open_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.xlsx");
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Primera").unwrap().write_string(0, 0, "Fecha").unwrap();
        workbook.add_worksheet().set_name("Segunda").unwrap().write_string(0, 0, "otra").unwrap();
        workbook.save(&path).unwrap();

        let prepared = PreparedWorkbook::prepare(&path).unwrap();
        assert!(!prepared.is_converted());
        assert_eq!(prepared.read_path(), path.as_path());
        let sheet = prepared.open_first_sheet().unwrap();
        assert_eq!(sheet.name, "Primera");
        assert_eq!(sheet.cell(1, 1), &Data::String("Fecha".to_string()));
    }

    #[test]
    fn test_temp_copy_removed_on_drop() {
        let temp = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let temp_path = temp.path().to_path_buf();
        let prepared = PreparedWorkbook {
            source: PathBuf::from("legacy.xls"),
            temp: Some(temp),
        };
        assert!(prepared.is_converted());
        assert_eq!(prepared.read_path(), temp_path.as_path());

        drop(prepared);
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_corrupt_legacy_file_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.xls");
        std::fs::write(&path, b"not a workbook").unwrap();

        let err = PreparedWorkbook::prepare(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resource);
    }
}
