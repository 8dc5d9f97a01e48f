//! The rendered report: one sheet per retained signature group plus a summary sheet.

use crate::naming::ReportName;

pub const REASON_LABEL: &str = "Reason: ";
pub const DEVICE_LABEL: &str = "AnonymousDeviceID: ";
pub const TOTAL_LABEL: &str = "TotalDevices: ";

/// One device block inside a signature sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
  pub device_id: String,
  /// Normalized log lines, already reversed for display.
  pub lines: Vec<String>,
}

/// Sheet for one retained signature group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSheet {
  pub name: String,
  pub fingerprint: String,
  pub classification: String,
  pub entries: Vec<DeviceEntry>,
}

impl SignatureSheet {
  /// Rows top to bottom, one cell each.
  pub fn rows(&self) -> Vec<String> {
    let mut rows = vec![format!("{}{}", REASON_LABEL, self.classification)];
    for entry in &self.entries {
      rows.push(format!("{}{}", DEVICE_LABEL, entry.device_id));
      rows.extend(entry.lines.iter().cloned());
    }
    rows
  }
}

/// Running list of every emitted device entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySheet {
  pub name: String,
  pub device_ids: Vec<String>,
}

impl SummarySheet {
  pub fn rows(&self) -> Vec<String> {
    let mut rows = Vec::with_capacity(self.device_ids.len() + 1);
    rows.push(format!("{}{}", TOTAL_LABEL, self.device_ids.len()));
    rows.extend(self.device_ids.iter().cloned());
    rows
  }
}

/// Everything a sink needs. Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub name: ReportName,
  pub summary: SummarySheet,
  pub sheets: Vec<SignatureSheet>,
  /// Groups dropped because every record's device was already seen.
  pub discarded_groups: usize,
}

impl Report {
  pub fn device_count(&self) -> usize {
    self.summary.device_ids.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_rows_follow_label_device_lines_layout() {
    let sheet = SignatureSheet {
      name: "CrashLog1".into(),
      fingerprint: "00".into(),
      classification: "Oops".into(),
      entries: vec![
        DeviceEntry {
          device_id: "d1".into(),
          lines: vec!["lineX".into(), "panicA".into()],
        },
        DeviceEntry {
          device_id: "d2".into(),
          lines: vec!["z".into()],
        },
      ],
    };
    assert_eq!(
      sheet.rows(),
      vec![
        "Reason: Oops",
        "AnonymousDeviceID: d1",
        "lineX",
        "panicA",
        "AnonymousDeviceID: d2",
        "z",
      ]
    );
  }

  #[test]
  fn summary_rows_start_with_total() {
    let summary = SummarySheet {
      name: "Sheet1".into(),
      device_ids: vec!["d1".into(), "d2".into()],
    };
    assert_eq!(summary.rows(), vec!["TotalDevices: 2", "d1", "d2"]);
  }
}
