//! Remote spreadsheet sink.

use std::time::Duration;

use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::json;

use crate::error::SinkError;
use crate::report::Report;
use crate::sink::Sink;

/// Minimal spreadsheet-service surface the remote sink needs.
///
/// Calls go through `&mut self` so one run's writes to a spreadsheet are
/// strictly sequential.
pub trait SheetService {
  /// Create a spreadsheet whose first tab is `first_sheet`; returns its id.
  fn create_spreadsheet(&mut self, title: &str, first_sheet: &str) -> Result<String, SinkError>;

  fn create_sheet(&mut self, spreadsheet_id: &str, name: &str) -> Result<(), SinkError>;

  /// Append `cells` down column A of `sheet`, one cell per row.
  fn append_cells(
    &mut self,
    spreadsheet_id: &str,
    sheet: &str,
    cells: &[String],
  ) -> Result<(), SinkError>;
}

/// Writes a report through any [`SheetService`].
pub struct RemoteSheetSink<S> {
  service: S,
}

impl<S: SheetService> RemoteSheetSink<S> {
  pub fn new(service: S) -> Self {
    Self { service }
  }

  pub fn into_inner(self) -> S {
    self.service
  }
}

impl<S: SheetService> Sink for RemoteSheetSink<S> {
  fn name(&self) -> &str {
    "google-sheets"
  }

  fn deliver(&mut self, report: &Report) -> Result<String, SinkError> {
    let title = report.name.to_string();
    let id = self
      .service
      .create_spreadsheet(&title, &report.summary.name)?;
    debug!("created spreadsheet {} ({})", title, id);

    self
      .service
      .append_cells(&id, &report.summary.name, &report.summary.rows())?;

    for sheet in &report.sheets {
      self.service.create_sheet(&id, &sheet.name)?;
      self.service.append_cells(&id, &sheet.name, &sheet.rows())?;
    }

    Ok(id)
  }
}

// ---------------------------------------------------------------------------
// Sheets v4 REST client
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CreatedSpreadsheet {
  #[serde(rename = "spreadsheetId")]
  spreadsheet_id: String,
}

/// Google Sheets v4 over HTTPS with a pre-issued bearer token.
pub struct GoogleSheetsClient {
  agent: ureq::Agent,
  base_url: String,
  token: Option<String>,
}

impl GoogleSheetsClient {
  pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
    Self {
      agent: ureq::AgentBuilder::new().timeout(timeout).build(),
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    }
  }

  fn request(&self, url: &str) -> Result<ureq::Request, SinkError> {
    let token = self
      .token
      .as_deref()
      .ok_or_else(|| SinkError::Unauthorized("no access token configured".into()))?;
    Ok(
      self
        .agent
        .post(url)
        .set("Authorization", &format!("Bearer {}", token)),
    )
  }
}

fn from_ureq(err: ureq::Error) -> SinkError {
  match err {
    ureq::Error::Status(code, resp) => {
      let body = resp.into_string().unwrap_or_default();
      if code == 401 || code == 403 {
        SinkError::Unauthorized(format!("status {}: {}", code, body))
      } else {
        SinkError::Status { code, body }
      }
    }
    ureq::Error::Transport(t) => SinkError::Transport(t.to_string()),
  }
}

/// Bytes escaped inside one URL path segment: everything but unreserved characters and `!`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~')
  .remove(b'!');

/// Percent-encode one URL path segment.
fn encode_segment(s: &str) -> String {
  utf8_percent_encode(s, SEGMENT).to_string()
}

impl SheetService for GoogleSheetsClient {
  fn create_spreadsheet(&mut self, title: &str, first_sheet: &str) -> Result<String, SinkError> {
    let url = format!("{}/spreadsheets", self.base_url);
    let body = json!({
      "properties": { "title": title },
      "sheets": [ { "properties": { "title": first_sheet } } ],
    });
    let created: CreatedSpreadsheet = self
      .request(&url)?
      .send_json(body)
      .map_err(from_ureq)?
      .into_json()
      .map_err(|e| SinkError::write(format!("unexpected create response: {}", e)))?;
    Ok(created.spreadsheet_id)
  }

  fn create_sheet(&mut self, spreadsheet_id: &str, name: &str) -> Result<(), SinkError> {
    let url = format!(
      "{}/spreadsheets/{}:batchUpdate",
      self.base_url,
      encode_segment(spreadsheet_id)
    );
    let body = json!({
      "requests": [ { "addSheet": { "properties": { "title": name } } } ],
    });
    self.request(&url)?.send_json(body).map_err(from_ureq)?;
    Ok(())
  }

  fn append_cells(
    &mut self,
    spreadsheet_id: &str,
    sheet: &str,
    cells: &[String],
  ) -> Result<(), SinkError> {
    if cells.is_empty() {
      return Ok(());
    }
    let url = format!(
      "{}/spreadsheets/{}/values/{}:append",
      self.base_url,
      encode_segment(spreadsheet_id),
      encode_segment(&format!("{}!A1", sheet))
    );
    let values: Vec<[&str; 1]> = cells.iter().map(|c| [c.as_str()]).collect();
    self
      .request(&url)?
      .query("valueInputOption", "RAW")
      .query("insertDataOption", "INSERT_ROWS")
      .send_json(json!({ "values": values }))
      .map_err(from_ureq)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::report::{DeviceEntry, SignatureSheet};
  use crate::sink::tests::empty_report;

  #[derive(Default)]
  struct RecordingService {
    calls: Vec<String>,
    fail_on_sheet: Option<String>,
  }

  impl SheetService for RecordingService {
    fn create_spreadsheet(&mut self, title: &str, first_sheet: &str) -> Result<String, SinkError> {
      self.calls.push(format!("spreadsheet {} {}", title, first_sheet));
      Ok("sheet-id".into())
    }

    fn create_sheet(&mut self, _id: &str, name: &str) -> Result<(), SinkError> {
      if self.fail_on_sheet.as_deref() == Some(name) {
        return Err(SinkError::Status {
          code: 429,
          body: "quota".into(),
        });
      }
      self.calls.push(format!("sheet {}", name));
      Ok(())
    }

    fn append_cells(&mut self, _id: &str, sheet: &str, cells: &[String]) -> Result<(), SinkError> {
      self.calls.push(format!("append {} {}", sheet, cells.join("|")));
      Ok(())
    }
  }

  fn report_with_sheet() -> Report {
    let mut report = empty_report();
    report.sheets.push(SignatureSheet {
      name: "CrashLog1".into(),
      fingerprint: "ab".into(),
      classification: "Oops".into(),
      entries: vec![DeviceEntry {
        device_id: "d1".into(),
        lines: vec!["b".into(), "a".into()],
      }],
    });
    report
  }

  #[test]
  fn writes_summary_then_each_sheet_in_order() {
    let mut sink = RemoteSheetSink::new(RecordingService::default());
    let id = sink.deliver(&report_with_sheet()).unwrap();
    assert_eq!(id, "sheet-id");
    assert_eq!(
      sink.into_inner().calls,
      vec![
        "spreadsheet CrashLogs-UNVR-3.1.9-2023-06-15 Sheet1",
        "append Sheet1 TotalDevices: 1|d1",
        "sheet CrashLog1",
        "append CrashLog1 Reason: Oops|AnonymousDeviceID: d1|b|a",
      ]
    );
  }

  #[test]
  fn service_error_stops_delivery() {
    let mut sink = RemoteSheetSink::new(RecordingService {
      fail_on_sheet: Some("CrashLog1".into()),
      ..Default::default()
    });
    let err = sink.deliver(&report_with_sheet()).unwrap_err();
    assert!(matches!(err, SinkError::Status { code: 429, .. }));
  }

  #[test]
  fn missing_token_is_unauthorized_without_network() {
    let mut client = GoogleSheetsClient::new("http://127.0.0.1:9", None, Duration::from_secs(1));
    let err = client.create_spreadsheet("t", "Sheet1").unwrap_err();
    assert!(matches!(err, SinkError::Unauthorized(_)));
  }

  #[test]
  fn segments_are_percent_encoded() {
    assert_eq!(encode_segment("CrashLog1!A1"), "CrashLog1!A1");
    assert_eq!(encode_segment("Crash Log/1"), "Crash%20Log%2F1");
    assert_eq!(encode_segment("Logé"), "Log%C3%A9");
  }
}
