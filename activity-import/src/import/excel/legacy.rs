//! Legacy `.xls` adapter
//!
//! Rewrites the first sheet of a BIFF workbook as a values-only `.xlsx` in a
//! temporary file. Date cells are written as serials with a date format, so
//! a date with no time of day stays a plain calendar date.

use std::path::Path;

use calamine::{Data, Range, Reader, Xls, open_workbook};
use chrono::NaiveTime;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::NamedTempFile;

use crate::import::cells;
use crate::import::error::{ImportError, Result};

const DATE_FORMAT: &str = "yyyy-mm-dd";
const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Convert `source` into a temporary `.xlsx`. The file is removed when the
/// returned handle is dropped.
pub fn convert_to_temp_xlsx(source: &Path) -> Result<NamedTempFile> {
    let mut workbook: Xls<_> =
        open_workbook(source).map_err(|e: calamine::XlsError| ImportError::workbook(source, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportError::EmptyWorkbook(source.to_path_buf()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::workbook(source, e))?;

    let temp = tempfile::Builder::new()
        .prefix("activity-import-")
        .suffix(".xlsx")
        .tempfile()?;

    write_values_only(&range, &sheet_name, temp.path())?;
    log::info!(
        "Converted legacy sheet '{}' from {} to {}",
        sheet_name,
        source.display(),
        temp.path().display()
    );

    Ok(temp)
}

/// Write the values of `range` at their absolute positions. Error cells are
/// left empty.
pub fn write_values_only(range: &Range<Data>, sheet_name: &str, dest: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let datetime_format = Format::new().set_num_format(DATETIME_FORMAT);

    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    for (rel_row, rel_col, value) in range.used_cells() {
        let row = start_row + rel_row as u32;
        let Ok(col) = u16::try_from(start_col as usize + rel_col) else {
            log::warn!("Skipping cell beyond the last column at row {}", row + 1);
            continue;
        };

        match value {
            Data::Empty | Data::Error(_) => {}
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                sheet.write_string(row, col, s)?;
            }
            Data::Int(i) => {
                sheet.write_number(row, col, *i as f64)?;
            }
            Data::Float(f) => {
                sheet.write_number(row, col, *f)?;
            }
            Data::Bool(b) => {
                sheet.write_boolean(row, col, *b)?;
            }
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) if value.time() == NaiveTime::MIN => {
                    let serial = cells::datetime_to_serial(value);
                    sheet.write_number_with_format(row, col, serial, &date_format)?;
                }
                Some(value) => {
                    let serial = cells::datetime_to_serial(value);
                    sheet.write_number_with_format(row, col, serial, &datetime_format)?;
                }
                None => {
                    sheet.write_number(row, col, dt.as_f64())?;
                }
            },
        }
    }

    workbook.save(dest)?;
    Ok(())
}
