use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::features::FeatureTable;
use crate::fight_table::FightTable;

const MAX_XLSX_COLUMNS: usize = 16_384;
const ID_COLUMNS: [&str; 6] = [
    "fight_index",
    "fight_id",
    "date",
    "fighter_a_id",
    "fighter_b_id",
    "winner_id",
];

pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
}

/// Writes fight identifiers followed by every feature column, one row per fight.
pub fn export_features(path: &Path, fights: &FightTable, features: &FeatureTable) -> Result<ExportReport> {
    if fights.len() != features.len() {
        return Err(anyhow!(
            "feature table has {} rows but fight table has {}",
            features.len(),
            fights.len()
        ));
    }
    let names = features.schema().column_names();
    let columns = ID_COLUMNS.len() + names.len();
    if columns > MAX_XLSX_COLUMNS {
        return Err(anyhow!("{columns} columns exceed the xlsx limit"));
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Features")?;
        let header: Vec<String> = ID_COLUMNS
            .iter()
            .map(|s| s.to_string())
            .chain(names.iter().cloned())
            .collect();
        write_strings(sheet, 0, 0, &header)?;

        for (row_idx, (fight, row)) in fights.iter().zip(features.rows()).enumerate() {
            let xl_row = (row_idx + 1) as u32;
            sheet
                .write_number(xl_row, 0, fight.index as f64)
                .with_context(|| format!("write index at row {xl_row}"))?;
            let ids = [
                fight.fight_id.clone(),
                fight.date.format("%Y-%m-%d").to_string(),
                fight.fighter_a_id.clone(),
                fight.fighter_b_id.clone(),
                fight.winner_id.clone().unwrap_or_default(),
            ];
            write_strings(sheet, xl_row, 1, &ids)?;
            write_numbers(sheet, xl_row, ID_COLUMNS.len() as u16, &row.values)?;
        }
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Columns")?;
        write_strings(sheet, 0, 0, &["column".to_string(), "name".to_string()])?;
        for (idx, name) in names.iter().enumerate() {
            let xl_row = (idx + 1) as u32;
            sheet
                .write_number(xl_row, 0, (ID_COLUMNS.len() + idx) as f64)
                .with_context(|| format!("write column index {idx}"))?;
            sheet
                .write_string(xl_row, 1, name)
                .with_context(|| format!("write column name {idx}"))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: features.len(),
        columns,
    })
}

fn write_strings(worksheet: &mut Worksheet, row: u32, first_col: u16, values: &[String]) -> Result<()> {
    for (offset, value) in values.iter().enumerate() {
        let col = first_col + offset as u16;
        worksheet
            .write_string(row, col, value)
            .with_context(|| format!("write cell ({row},{col})"))?;
    }
    Ok(())
}

fn write_numbers(worksheet: &mut Worksheet, row: u32, first_col: u16, values: &[f64]) -> Result<()> {
    for (offset, value) in values.iter().enumerate() {
        let col = first_col + offset as u16;
        worksheet
            .write_number(row, col, *value)
            .with_context(|| format!("write cell ({row},{col})"))?;
    }
    Ok(())
}
