use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use tracing::info;

use crate::error::IngestError;
use crate::models::{RawRow, ACTUAL, BENCHMARK, CAMPAIGN_TYPE, DIRECTION, KPI_NAME, REQUIRED_COLUMNS};

/// A sheet as (1-based row number, cells) pairs.
type Grid = Vec<(usize, Vec<Option<String>>)>;

/// Read the first sheet of a spreadsheet (or a CSV file) into raw KPI rows.
pub fn read_table(path: &Path) -> Result<Vec<RawRow>, IngestError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let grid = match extension.as_str() {
        "csv" => read_csv_grid(path)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook_grid(path)?,
        _ => return Err(IngestError::UnsupportedFormat(extension)),
    };

    let rows = rows_from_grid(grid)?;
    info!(path = %path.display(), rows = rows.len(), "read KPI table");
    Ok(rows)
}

fn read_csv_grid(path: &Path) -> Result<Grid, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut grid = Grid::new();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|position| position.line() as usize)
            .unwrap_or(index + 1);
        let cells = record
            .iter()
            .map(|field| (!field.trim().is_empty()).then(|| field.to_string()))
            .collect();
        grid.push((line, cells));
    }

    Ok(grid)
}

fn read_workbook_grid(path: &Path) -> Result<Grid, IngestError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::EmptySheet)?;
    let range = workbook.worksheet_range(&first_sheet)?;

    // Data may not begin at A1.
    let (start_row, _) = range.start().unwrap_or((0, 0));

    Ok(range
        .rows()
        .enumerate()
        .map(|(index, row)| {
            let line = start_row as usize + index + 1;
            (line, row.iter().map(cell_text).collect())
        })
        .collect())
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            (!s.trim().is_empty()).then(|| s.clone())
        }
        Data::Float(n) => Some(format_number(*n)),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Some(format!("#{:?}", e)),
        Data::DateTime(dt) => Some(format_number(dt.as_f64())),
    }
}

/// Integers print without a trailing `.0`; everything else uses the
/// shortest representation that parses back to the same value.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn rows_from_grid(grid: Grid) -> Result<Vec<RawRow>, IngestError> {
    let mut lines = grid
        .into_iter()
        .skip_while(|(_, cells)| cells.iter().all(Option::is_none));

    let (_, header) = lines.next().ok_or(IngestError::EmptySheet)?;
    let mut columns: HashMap<String, usize> = HashMap::new();
    for (index, name) in header.iter().enumerate() {
        if let Some(name) = name {
            columns.entry(name.trim().to_string()).or_insert(index);
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !columns.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let pick = |cells: &[Option<String>], name: &str| {
        columns
            .get(name)
            .and_then(|index| cells.get(*index))
            .cloned()
            .flatten()
    };

    Ok(lines
        .map(|(line, cells)| RawRow {
            row: line,
            campaign_type: pick(&cells, CAMPAIGN_TYPE),
            kpi_name: pick(&cells, KPI_NAME),
            benchmark: pick(&cells, BENCHMARK),
            actual: pick(&cells, ACTUAL),
            direction: pick(&cells, DIRECTION),
        })
        .collect())
}

/// Write a CSV with the required headers and two sample rows.
pub fn write_template(path: &Path) -> Result<(), IngestError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(REQUIRED_COLUMNS)?;
    writer.write_record(["Events", "Registrations", "500", "460", "HigherIsBetter"])?;
    writer.write_record(["Digital/Search", "Cost per Click", "2.50", "2.70", "LowerIsBetter"])?;
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
