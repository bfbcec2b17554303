//! CRM activities sheet extraction
//!
//! The sheet carries the responsible party in A3, a header row somewhere in
//! the first rows, then one activity per row until column A holds something
//! that is not a date (usually a totals line).

use calamine::Data;
use regex::Regex;

use super::cells;
use super::error::{ImportError, Result};
use super::excel::sheet::Sheet;
use super::headers::{self, HeaderRow};
use super::models::{CrmActivity, Responsible};
use crate::config::layout::{CrmLayout, LogicalField};

/// Everything read from a CRM sheet
#[derive(Debug, Clone)]
pub struct CrmExtraction {
    pub responsible: Responsible,
    pub header: HeaderRow,
    /// First row considered as data
    pub start_row: u32,
    /// Row whose column A ended the scan, if any
    pub stopped_at: Option<u32>,
    pub records: Vec<CrmActivity>,
}

/// Mapped columns for the three logical fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CrmColumns {
    date: u32,
    activity_number: u32,
    subject: u32,
}

/// Read `Responsable: <number> <name>`. A cell without digits gives number 0.
pub fn read_responsible(cell: &Data) -> Responsible {
    let Some(text) = cells::cell_text(cell) else {
        return Responsible::default();
    };
    let Ok(re) = Regex::new(r"(\d+)(?:\s*([^\W\d_]\w*))?") else {
        return Responsible::default();
    };
    let Some(caps) = re.captures(&text) else {
        log::warn!("No responsible number found in '{}'", text.trim());
        return Responsible::default();
    };

    Responsible {
        number: caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0),
        name: caps.get(2).map(|m| m.as_str().to_string()),
    }
}

fn resolve_columns(header: &HeaderRow, layout: &CrmLayout) -> Result<CrmColumns> {
    let mut resolved = Vec::with_capacity(LogicalField::ALL.len());
    let mut missing = Vec::new();

    for field in LogicalField::ALL {
        match header.resolve(layout.synonyms.for_field(field)) {
            Some(column) => resolved.push(column),
            None => missing.push(field.label()),
        }
    }

    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            missing,
            found: header.names(),
        });
    }

    Ok(CrmColumns {
        date: resolved[0],
        activity_number: resolved[1],
        subject: resolved[2],
    })
}

/// Locate the header, resolve columns and collect activity rows.
///
/// Fails only on structural problems: no header row in the scan window or
/// a required column that cannot be resolved.
pub fn extract(sheet: &Sheet, layout: &CrmLayout) -> Result<CrmExtraction> {
    let responsible =
        read_responsible(sheet.cell(layout.responsible_row, layout.responsible_column));
    log::info!(
        "Responsible: {} {}",
        responsible.number,
        responsible.name.as_deref().unwrap_or("")
    );

    let window = headers::default_window(sheet, layout.header_scan_rows);
    let (first, last) = (*window.start(), *window.end());
    let header = headers::find_header_row(sheet, window, &layout.header_tokens)
        .ok_or(ImportError::HeadersNotFound { first, last })?;
    log::info!("Header row at {}: {:?}", header.row, header.names());

    let columns = resolve_columns(&header, layout)?;
    let epoch = layout.epoch.unwrap_or(sheet.epoch());
    let primary = move |row: u32| {
        [
            sheet.cell(row, columns.date),
            sheet.cell(row, columns.activity_number),
            sheet.cell(row, columns.subject),
        ]
    };
    let is_blank_or_header = move |row: u32| {
        let values = primary(row);
        values.iter().all(|v| cells::is_empty(v))
            || headers::is_header_like(&values, &layout.header_tokens)
    };

    let mut start_row = (header.row + 1).max(layout.min_data_row);
    if is_blank_or_header(start_row) {
        log::debug!("Row {} is blank or repeats the header, starting one row later", start_row);
        start_row += 1;
    }
    log::info!("Reading activities from row {}", start_row);

    let mut records = Vec::new();
    let mut stopped_at = None;

    for row in start_row..=sheet.last_row() {
        let marker = sheet.cell(row, layout.termination_column);
        if !cells::is_empty(marker) && cells::parse_date(marker, epoch).is_none() {
            log::info!(
                "Stopping at row {}: column {} holds non-date value '{}'",
                row,
                layout.termination_column,
                cells::cell_text(marker).unwrap_or_default().trim()
            );
            stopped_at = Some(row);
            break;
        }

        if is_blank_or_header(row) {
            log::debug!("Skipping row {}: blank or header", row);
            continue;
        }

        let [date_cell, number_cell, subject_cell] = primary(row);
        let date = cells::parse_date(date_cell, epoch);
        let activity_number = cells::parse_activity_number(number_cell);
        let subject = cells::trimmed_text(subject_cell);

        if date.is_none() && activity_number.is_none() && subject.is_none() {
            log::debug!("Skipping row {}: no usable values", row);
            continue;
        }

        records.push(CrmActivity {
            responsible_number: responsible.number,
            date,
            activity_number,
            subject,
            duration: cells::parse_duration(
                sheet.cell(row, layout.hours_column),
                sheet.cell(row, layout.minutes_column),
            ),
        });
    }

    log::info!("Extracted {} CRM activities", records.len());

    Ok(CrmExtraction {
        responsible,
        header,
        start_row,
        stopped_at,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::error::ErrorKind;
    use calamine::Range;
    use chrono::NaiveDate;

    fn text(value: &str) -> Data {
        Data::String(value.to_string())
    }

    /// Build a sheet from `(row, column, value)` triples, 1-based
    fn sheet(cells: Vec<(u32, u32, Data)>) -> Sheet {
        let last_row = cells.iter().map(|(r, _, _)| *r).max().unwrap_or(1);
        let mut range = Range::new((0, 0), (last_row - 1, 11));
        for (row, column, value) in cells {
            range.set_value((row - 1, column - 1), value);
        }
        Sheet::new("Actividades", range)
    }

    fn activity_row(
        row: u32,
        serial: f64,
        code: &str,
        subject: &str,
        hours: f64,
        minutes: f64,
    ) -> Vec<(u32, u32, Data)> {
        vec![
            (row, 1, Data::Float(serial)),
            (row, 2, text(code)),
            (row, 3, text(subject)),
            (row, 10, Data::Float(hours)),
            (row, 12, Data::Float(minutes)),
        ]
    }

    fn header_row(row: u32) -> Vec<(u32, u32, Data)> {
        vec![
            (row, 1, text("Fecha")),
            (row, 2, text("Número")),
            (row, 3, text("Asunto")),
            (row, 10, text("Horas")),
            (row, 12, text("Minutos")),
        ]
    }

    #[test]
    fn test_read_responsible() {
        let r = read_responsible(&text("Responsable: 123 Ana"));
        assert_eq!(r.number, 123);
        assert_eq!(r.name.as_deref(), Some("Ana"));

        let r = read_responsible(&text("Responsable:42"));
        assert_eq!(r.number, 42);
        assert_eq!(r.name, None);

        assert_eq!(read_responsible(&text("Responsable: sin asignar")), Responsible::default());
        assert_eq!(read_responsible(&Data::Empty), Responsible::default());
        assert_eq!(read_responsible(&Data::Float(17.0)).number, 17);
    }

    #[test]
    fn test_rows_above_four_are_never_data() {
        let mut cells = header_row(1);
        cells.extend(activity_row(2, 45000.0, "1-1", "too early", 1.0, 0.0));
        cells.push((3, 1, text("Responsable: 9 Eva")));
        cells.extend(activity_row(4, 45001.0, "1234-007.890", "Reunión", 1.0, 75.0));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.header.row, 1);
        assert_eq!(extraction.start_row, 4);
        assert_eq!(extraction.records.len(), 1);

        let record = &extraction.records[0];
        assert_eq!(record.responsible_number, 9);
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2023, 3, 16));
        assert_eq!(record.activity_number, Some(7890));
        assert_eq!(record.subject.as_deref(), Some("Reunión"));
        assert_eq!(record.duration, "02:15:00");
    }

    #[test]
    fn test_header_at_row_three() {
        let mut cells = vec![(3, 1, text("Responsable: 5 Juan"))];
        cells.extend(vec![
            (3, 2, text("Fecha")),
            (3, 3, text("Numero")),
            (3, 4, text("Descripción")),
        ]);
        cells.extend(vec![
            (4, 2, Data::Float(45000.0)),
            (4, 3, text("9-12")),
            (4, 4, text("  Visita ")),
        ]);

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.start_row, 4);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].subject.as_deref(), Some("Visita"));
        assert_eq!(extraction.records[0].duration, "00:00:00");
    }

    #[test]
    fn test_non_date_in_column_a_stops_scan() {
        let mut cells = header_row(5);
        cells.extend(activity_row(6, 45000.0, "1-1", "uno", 1.0, 0.0));
        cells.extend(activity_row(7, 45001.0, "1-2", "dos", 0.0, 30.0));
        cells.extend(activity_row(8, 45001.0, "1-9", "cierre", 4.0, 0.0));
        cells.push((8, 1, text("Total")));
        cells.extend(activity_row(9, 45002.0, "1-3", "tres", 2.0, 0.0));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.stopped_at, Some(8));
        let subjects: Vec<_> = extraction.records.iter().map(|r| r.subject.clone().unwrap()).collect();
        assert_eq!(subjects, ["uno", "dos"]);
    }

    #[test]
    fn test_string_dates_do_not_stop_scan() {
        let mut cells = header_row(4);
        cells.push((5, 1, text("15/03/2023")));
        cells.push((5, 3, text("texto")));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.stopped_at, None);
        assert_eq!(extraction.records[0].date, NaiveDate::from_ymd_opt(2023, 3, 15));
    }

    #[test]
    fn test_blank_first_row_and_header_echo_skipped() {
        let mut cells = header_row(4);
        // row 5 left blank
        cells.extend(activity_row(6, 45000.0, "1-1", "uno", 0.0, 0.0));
        cells.push((7, 2, text("Número")));
        cells.push((7, 3, text("Asunto")));
        cells.extend(activity_row(8, 45001.0, "1-2", "dos", 0.0, 0.0));
        cells.push((9, 10, Data::Float(3.0)));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.start_row, 6);
        assert_eq!(extraction.records.len(), 2);
    }

    #[test]
    fn test_header_echo_in_first_candidate_row_skipped() {
        let mut cells = header_row(1);
        cells.extend(header_row(4));
        cells.extend(activity_row(5, 45000.0, "1234-001", "uno", 1.0, 0.0));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.header.row, 1);
        assert_eq!(extraction.start_row, 5);
        assert_eq!(extraction.stopped_at, None);
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].activity_number, Some(1));
        assert_eq!(extraction.records[0].subject.as_deref(), Some("uno"));
    }

    #[test]
    fn test_row_with_unparseable_values_skipped() {
        let mut cells = header_row(1);
        cells.push((4, 2, text("sin-numero")));
        cells.extend(activity_row(5, 45000.0, "1-1", "uno", 0.0, 0.0));

        let extraction = extract(&sheet(cells), &CrmLayout::default()).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].subject.as_deref(), Some("uno"));
    }

    #[test]
    fn test_missing_subject_column() {
        let cells = vec![
            (2, 1, text("Fecha")),
            (2, 2, text("Número")),
            (2, 3, text("Horas")),
        ];
        let err = extract(&sheet(cells), &CrmLayout::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        match err {
            ImportError::MissingColumns { missing, found } => {
                assert_eq!(missing, vec!["Asunto"]);
                assert_eq!(found, vec!["fecha", "numero", "horas"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_headers_not_found() {
        let cells = vec![(1, 1, text("Informe")), (4, 1, Data::Float(45000.0))];
        let err = extract(&sheet(cells), &CrmLayout::default()).unwrap_err();
        assert!(matches!(err, ImportError::HeadersNotFound { first: 1, last: 4 }));
    }
}
