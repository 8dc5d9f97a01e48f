//! Report and sheet naming.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::ReportError;
use crate::types::CrashRecord;

fn semver_pattern() -> &'static Regex {
  static SEMVER: OnceLock<Regex> = OnceLock::new();
  SEMVER.get_or_init(|| Regex::new(r"v(\d+\.\d+\.\d+)").expect("version pattern is valid"))
}

/// Pull `<major>.<minor>.<patch>` out of a free-form version string.
///
/// The version must be introduced by a `v`; the first match wins.
pub fn extract_semantic_version(input: &str) -> Result<String, ReportError> {
  semver_pattern()
    .captures(input)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string())
    .ok_or_else(|| ReportError::VersionExtraction {
      input: input.to_string(),
    })
}

/// Name shared by the remote spreadsheet and the local workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportName {
  pub model: String,
  pub version: String,
  pub date: NaiveDate,
}

impl ReportName {
  /// Derive the name from the first record of a batch, dated in the record's own offset.
  pub fn from_record(record: &CrashRecord) -> Result<Self, ReportError> {
    Ok(Self {
      model: record.model.clone(),
      version: extract_semantic_version(&record.version)?,
      date: record.captured_at.date_naive(),
    })
  }

  pub fn file_name(&self) -> String {
    format!("{}.xlsx", self)
  }
}

impl fmt::Display for ReportName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "CrashLogs-{}-{}-{}",
      self.model,
      self.version,
      self.date.format("%Y-%m-%d")
    )
  }
}

/// Longest sheet name either sink accepts.
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Digits kept free after the sheet prefix for the ordinal.
pub const ORDINAL_DIGITS: usize = 4;

/// Characters a sheet name must not contain.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Check a sheet prefix leaves room for the ordinal and holds no forbidden characters.
pub fn validate_sheet_prefix(prefix: &str) -> Result<(), String> {
  let limit = MAX_SHEET_NAME_CHARS - ORDINAL_DIGITS;
  if prefix.chars().count() > limit {
    return Err(format!("at most {} characters", limit));
  }
  if prefix.contains(FORBIDDEN_SHEET_CHARS) || prefix.starts_with('\'') {
    return Err("must not contain []:*?/\\ or start with a quote".into());
  }
  Ok(())
}

/// Name of the signature sheet at a 1-based ordinal.
pub fn sheet_name(prefix: &str, ordinal: usize) -> String {
  format!("{}{}", prefix, ordinal)
}
