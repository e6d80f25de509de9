//! Report export to `.xlsx` or `.csv`.
use std::{
    fs,
    path::{Path, PathBuf},
};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

pub const SHEET_NAME: &str = "Report Data";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("too many columns for a worksheet: {0}")]
    TooManyColumns(usize),
}

/// A labelled column and how to render one row into it.
pub struct Column<T> {
    pub label: &'static str,
    pub render: fn(&T) -> String,
}

impl<T> Column<T> {
    pub const fn new(label: &'static str, render: fn(&T) -> String) -> Self {
        Self { label, render }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Xlsx => Self::Csv,
            Self::Csv => Self::Xlsx,
        }
    }
}

/// Writes `{dir}/{filename}.{ext}` and returns the path written.
pub fn export_rows<T>(
    rows: &[T],
    columns: &[Column<T>],
    dir: &Path,
    filename: &str,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{filename}.{}", format.extension()));
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| (column.render)(row)).collect())
        .collect();

    match format {
        ExportFormat::Xlsx => write_xlsx(columns, &cells, &path)?,
        ExportFormat::Csv => write_csv(columns, &cells, &path)?,
    }
    info!(path = %path.display(), rows = rows.len(), "report exported");
    Ok(path)
}

fn write_xlsx<T>(columns: &[Column<T>], cells: &[Vec<String>], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let header = Format::new().set_bold();
    for (col, column) in columns.iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| ExportError::TooManyColumns(columns.len()))?;
        worksheet.write_string_with_format(0, col, column.label, &header)?;
    }

    for (idx, row) in cells.iter().enumerate() {
        let row_num = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        for (col, value) in row.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| ExportError::TooManyColumns(columns.len()))?;
            worksheet.write_string(row_num, col, value)?;
        }
    }

    for (col, width) in column_widths(columns, cells).into_iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| ExportError::TooManyColumns(columns.len()))?;
        worksheet.set_column_width(col, width as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_csv<T>(columns: &[Column<T>], cells: &[Vec<String>], path: &Path) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(columns.iter().map(|column| column.label))?;
    for row in cells {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Widest of the label and every rendered cell, in characters.
pub fn column_widths<T>(columns: &[Column<T>], cells: &[Vec<String>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(col, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(col))
                .map(|value| value.chars().count())
                .fold(column.label.chars().count(), usize::max)
        })
        .collect()
}

/// `1234567.5` becomes `1,234,567.5`; at most three decimals are kept.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
