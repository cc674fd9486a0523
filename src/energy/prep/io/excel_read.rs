use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};

use crate::energy::prep::error::{PrepError, Result};

/// Opens an `.xlsx` workbook.
pub fn open(path: &Path) -> Result<Xlsx<std::io::BufReader<std::fs::File>>> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()));
    }
    Ok(open_workbook(path)?)
}

pub fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| PrepError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(PrepError::from)?;
    Ok(range)
}

/// Reads the first sheet of a workbook. Returns the trimmed header row and
/// the sheet range; body rows start at relative row 1.
pub fn read_first_sheet(path: &Path) -> Result<(Vec<String>, Range<DataType>)> {
    let mut workbook = open(path)?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PrepError::InvalidWorkbook("workbook has no sheets".into()))?;
    let range = read_required_sheet(&mut workbook, &name)?;

    let headers: Vec<String> = match range.rows().next() {
        Some(first_row) => first_row
            .iter()
            .map(|cell| cell_to_string(Some(cell)).trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    Ok((headers, range))
}

pub fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => format_float(*value),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Numeric value of a cell; text cells are parsed, anything else is `None`.
pub fn cell_to_f64(cell: Option<&DataType>) -> Option<f64> {
    let value = match cell {
        Some(DataType::Float(value)) => *value,
        Some(DataType::Int(value)) => *value as f64,
        Some(DataType::String(value)) => value.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

// Whole numbers keep no fractional part so year headers read as "2020".
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
