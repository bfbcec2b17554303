//! Darío annotations sheet extraction
//!
//! Fixed positional layout: row 1 is a header, every later row is one
//! annotation. There is no terminating row; blank rows are skipped.

use calamine::Data;

use super::cells::{self, Epoch};
use super::excel::sheet::Sheet;
use super::models::DarioActivity;
use crate::config::layout::DarioLayout;

/// 0-based positions within a row
mod cols {
    pub const SIZE: usize = 0;
    pub const NUMBER: usize = 1;
    pub const NAME: usize = 2;
    pub const START: usize = 3;
    pub const END: usize = 4;
    pub const SYNOPSIS: usize = 5;
    pub const OBSERVATIONS: usize = 6;
    pub const VCX_S: usize = 7;
    pub const SYNC_REQUIREMENT: usize = 8;
    pub const VERSION: usize = 9;
}

/// Collect every non-blank row from `layout.first_data_row` down
pub fn extract(
    sheet: &Sheet,
    responsible_number: i64,
    layout: &DarioLayout,
) -> Vec<DarioActivity> {
    let epoch = layout.epoch.unwrap_or(sheet.epoch());
    let key_columns = layout.key_columns as usize;
    let mut records = Vec::new();

    for row in layout.first_data_row..=sheet.last_row() {
        let values = sheet.row(row, layout.width.max(cols::VERSION as u32 + 1));

        if values.iter().take(key_columns).all(|v| cells::is_empty(v)) {
            log::debug!("Skipping row {}: first {} columns empty", row, key_columns);
            continue;
        }

        records.push(read_row(&values, responsible_number, epoch));
    }

    log::info!("Extracted {} Darío annotations", records.len());
    records
}

fn read_row(values: &[&Data], responsible_number: i64, epoch: Epoch) -> DarioActivity {
    let text = |idx: usize| cells::trimmed_text(values[idx]);

    DarioActivity {
        size: text(cols::SIZE),
        number: cells::parse_integer(values[cols::NUMBER]),
        name: text(cols::NAME),
        start: cells::parse_datetime(values[cols::START], epoch),
        end: cells::parse_datetime(values[cols::END], epoch),
        synopsis: text(cols::SYNOPSIS),
        observations: text(cols::OBSERVATIONS),
        vcx_s: text(cols::VCX_S),
        sync_requirement: text(cols::SYNC_REQUIREMENT),
        version: text(cols::VERSION),
        responsible_number,
    }
}
