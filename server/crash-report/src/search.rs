//! Keyword counts across the signature sheets of a report.

use crate::report::{Report, SignatureSheet};
use crate::types::KeywordCounts;

fn sheet_contains(sheet: &SignatureSheet, keyword: &str) -> bool {
  sheet.rows().iter().any(|cell| cell.trim().contains(keyword))
}

/// Count signature sheets containing `first`, `second`, and both.
///
/// The summary sheet is never searched. Without a second keyword only
/// `first` is populated.
pub fn keyword_counts(report: &Report, first: &str, second: Option<&str>) -> KeywordCounts {
  let second = second.filter(|k| !k.is_empty());
  let mut counts = KeywordCounts::default();

  for sheet in &report.sheets {
    let has_first = !first.is_empty() && sheet_contains(sheet, first);
    let has_second = second.map(|k| sheet_contains(sheet, k)).unwrap_or(false);
    if has_first {
      counts.first += 1;
    }
    if has_second {
      counts.second += 1;
    }
    if has_first && has_second {
      counts.both += 1;
    }
  }

  counts
}
