//! A single worksheet with 1-based cell addressing

use calamine::{Data, Range};

use crate::import::cells::{self, Epoch};

static EMPTY: Data = Data::Empty;

/// Days between the 1900 and 1904 date system origins
const MAC_EPOCH_OFFSET_DAYS: i64 = 1462;

/// Worksheet contents plus the date system its serial numbers use
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    range: Range<Data>,
    epoch: Epoch,
}

impl Sheet {
    /// Wrap a range, detecting the date system from its native date cells
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        let epoch = detect_epoch(&range);
        Self {
            name: name.into(),
            range,
            epoch,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Cell at a 1-based `(row, column)`. Out-of-range positions read as empty.
    pub fn cell(&self, row: u32, column: u32) -> &Data {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.range
            .get_value((row - 1, column - 1))
            .unwrap_or(&EMPTY)
    }

    /// `width` cells of a row starting at column 1
    pub fn row(&self, row: u32, width: u32) -> Vec<&Data> {
        (1..=width).map(|column| self.cell(row, column)).collect()
    }

    /// Last used row (1-based), 0 for an empty sheet
    pub fn last_row(&self) -> u32 {
        self.range.end().map(|(row, _)| row + 1).unwrap_or(0)
    }

    /// Last used column (1-based), 0 for an empty sheet
    pub fn last_column(&self) -> u32 {
        self.range.end().map(|(_, column)| column + 1).unwrap_or(0)
    }
}

/// Compare the reader's own interpretation of the first native date cell
/// with a 1900-system reading of its serial.
fn detect_epoch(range: &Range<Data>) -> Epoch {
    for cell in range.used_cells().map(|(_, _, cell)| cell) {
        let Data::DateTime(dt) = cell else { continue };
        let (Some(native), Some(windows)) = (
            dt.as_datetime(),
            cells::serial_to_datetime(dt.as_f64(), Epoch::Windows),
        ) else {
            continue;
        };
        return if (native - windows).num_days() == MAC_EPOCH_OFFSET_DAYS {
            Epoch::Mac
        } else {
            Epoch::Windows
        };
    }
    Epoch::Windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (3, 2));
        range.set_value((0, 0), Data::String("Responsable 12".to_string()));
        range.set_value((3, 2), Data::Float(7.0));
        range
    }

    #[test]
    fn test_cell_addressing_is_one_based() {
        let sheet = Sheet::new("Hoja1", sample_range());
        assert_eq!(sheet.cell(1, 1), &Data::String("Responsable 12".to_string()));
        assert_eq!(sheet.cell(4, 3), &Data::Float(7.0));
        assert_eq!(sheet.cell(2, 2), &Data::Empty);
        assert_eq!(sheet.cell(0, 1), &Data::Empty);
        assert_eq!(sheet.cell(40, 40), &Data::Empty);
        assert_eq!(sheet.last_row(), 4);
        assert_eq!(sheet.last_column(), 3);
        assert_eq!(sheet.row(4, 3)[2], &Data::Float(7.0));
    }

    #[test]
    fn test_range_not_starting_at_origin() {
        let mut range = Range::new((2, 1), (4, 3));
        range.set_value((2, 1), Data::String("Fecha".to_string()));
        let sheet = Sheet::new("Hoja1", range);
        assert_eq!(sheet.cell(3, 2), &Data::String("Fecha".to_string()));
        assert_eq!(sheet.cell(1, 1), &Data::Empty);
        assert_eq!(sheet.last_row(), 5);
    }

    #[test]
    fn test_empty_sheet() {
        let sheet = Sheet::new("Vacía", Range::<Data>::empty());
        assert_eq!(sheet.last_row(), 0);
        assert_eq!(sheet.cell(1, 1), &Data::Empty);
        assert_eq!(sheet.epoch(), Epoch::Windows);
    }

    #[test]
    fn test_detect_epoch() {
        let mut range = Range::new((0, 0), (0, 0));
        range.set_value(
            (0, 0),
            Data::DateTime(ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, true)),
        );
        assert_eq!(Sheet::new("mac", range).epoch(), Epoch::Mac);

        let mut range = Range::new((0, 0), (0, 0));
        range.set_value(
            (0, 0),
            Data::DateTime(ExcelDateTime::new(45000.0, ExcelDateTimeType::DateTime, false)),
        );
        assert_eq!(Sheet::new("win", range).epoch(), Epoch::Windows);
    }
}
