//! Local .xlsx sink.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::warn;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tempfile::NamedTempFile;

use crate::error::SinkError;
use crate::report::Report;
use crate::sink::Sink;

/// Writes the report as `<dir>/<report name>.xlsx`.
///
/// The workbook is rendered in memory, written to a temp file in `dir`,
/// then renamed into place, so a failed call leaves no partial file behind.
#[derive(Debug, Clone)]
pub struct LocalXlsxSink {
  dir: PathBuf,
}

fn from_xlsx(err: XlsxError) -> SinkError {
  SinkError::write(err.to_string())
}

/// Most characters a single xlsx cell can hold.
pub const MAX_CELL_CHARS: usize = 32_767;

/// The cell text cut to [`MAX_CELL_CHARS`] characters, on a char boundary.
fn fit_cell(cell: &str) -> &str {
  match cell.char_indices().nth(MAX_CELL_CHARS) {
    Some((end, _)) => &cell[..end],
    None => cell,
  }
}

fn write_column(worksheet: &mut Worksheet, name: &str, rows: &[String]) -> Result<(), SinkError> {
  worksheet.set_name(name).map_err(from_xlsx)?;
  for (i, cell) in rows.iter().enumerate() {
    let row = u32::try_from(i).map_err(|_| SinkError::write(format!("{}: too many rows", name)))?;
    let text = fit_cell(cell);
    if text.len() < cell.len() {
      warn!(
        "{} row {}: line of {} chars truncated to {}",
        name,
        row + 1,
        cell.chars().count(),
        MAX_CELL_CHARS
      );
    }
    worksheet.write_string(row, 0, text).map_err(from_xlsx)?;
  }
  Ok(())
}

impl LocalXlsxSink {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Serialized workbook: the summary sheet first, then each signature sheet.
  pub fn workbook_bytes(report: &Report) -> Result<Vec<u8>, SinkError> {
    let mut workbook = Workbook::new();
    write_column(
      workbook.add_worksheet(),
      &report.summary.name,
      &report.summary.rows(),
    )?;
    for sheet in &report.sheets {
      write_column(workbook.add_worksheet(), &sheet.name, &sheet.rows())?;
    }
    workbook.save_to_buffer().map_err(from_xlsx)
  }
}

impl Sink for LocalXlsxSink {
  fn name(&self) -> &str {
    "local-xlsx"
  }

  fn deliver(&mut self, report: &Report) -> Result<String, SinkError> {
    let bytes = Self::workbook_bytes(report)?;

    fs::create_dir_all(&self.dir)?;
    let mut tmp = NamedTempFile::new_in(&self.dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;

    let path = self.dir.join(report.name.file_name());
    tmp.persist(&path).map_err(|e| SinkError::Io(e.error))?;
    Ok(path.display().to_string())
  }
}
