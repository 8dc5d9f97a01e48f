//! Record sources and the wire-to-model adapter.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use log::debug;

use crate::error::FetchError;
use crate::types::*;

/// Record type the reports are built from.
pub const KERNEL_CRASH: &str = "kernel_crash";

/// Anything that can answer a crash query with an ordered record list.
///
/// An empty list is a valid answer and is not an error.
pub trait CrashSource {
  fn fetch(&self, query: &CrashQuery) -> Result<Vec<CrashRecord>, FetchError>;
}

/// Convert a decoded `_search` response into core records, in hit order.
pub fn records_from_response(resp: &SearchResponse) -> Result<Vec<CrashRecord>, FetchError> {
  resp
    .hits
    .hits
    .iter()
    .enumerate()
    .map(|(i, hit)| record_from_wire(&hit.source.body).map_err(|e| at_hit(i, e)))
    .collect()
}

fn at_hit(index: usize, err: FetchError) -> FetchError {
  match err {
    FetchError::Malformed(msg) => FetchError::malformed(format!("hit {}: {}", index, msg)),
    other => other,
  }
}

fn parse_time(field: &str, raw: &str) -> Result<DateTime<FixedOffset>, FetchError> {
  DateTime::parse_from_rfc3339(raw).map_err(|e| FetchError::malformed(format!("{}: invalid RFC3339 {:?}: {}", field, raw, e)))
}

fn loose_bool(raw: &str) -> bool {
  matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn record_from_wire(body: &WireCrashLog) -> Result<CrashRecord, FetchError> {
  let captured_at = match body.system_time.as_deref() {
    Some(raw) => parse_time("system_time", raw)?,
    None => return Err(FetchError::malformed("system_time: missing")),
  };
  let boot_time = body
    .boot_time
    .as_deref()
    .map(|raw| parse_time("boot_time", raw))
    .transpose()?;

  let text = |v: &Option<String>| v.clone().unwrap_or_default();

  Ok(CrashRecord {
    record_type: text(&body.record_type),
    captured_at,
    device_id: text(&body.anonymous_device_id),
    model: text(&body.model),
    product_line: text(&body.product_line),
    version: text(&body.version),
    boot_time,
    uptime_secs: body.uptime.unwrap_or(0),
    kernel_version: text(&body.kernel_version),
    architecture: text(&body.architecture),
    load_average: text(&body.load_average),
    raw_log: text(&body.crash_log),
    signal: body.signal.unwrap_or(0),
    internal: body.is_internal.as_deref().map(loose_bool).unwrap_or(false),
    api_version: text(&body.api_version),
  })
}

/// Reads saved `_search` responses, one file per backend index.
///
/// The file for a query is `<dir>/<product_line>_logs_<date>.json`. Query
/// terms are applied to the decoded records: kernel crashes only, version
/// prefix, exact model, then the page size.
#[derive(Debug, Clone)]
pub struct SearchDumpSource {
  dir: PathBuf,
}

impl SearchDumpSource {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn path_for(&self, query: &CrashQuery) -> PathBuf {
    self
      .dir
      .join(format!("{}_logs_{}.json", query.product_line, query.date))
  }

  fn read(&self, path: &Path) -> Result<SearchResponse, FetchError> {
    let data = fs::read(path).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => FetchError::Unavailable(format!("{} not found", path.display())),
      _ => FetchError::Unavailable(format!("{}: {}", path.display(), e)),
    })?;
    serde_json::from_slice(&data)
      .map_err(|e| FetchError::malformed(format!("{}: {}", path.display(), e)))
  }
}

impl CrashSource for SearchDumpSource {
  fn fetch(&self, query: &CrashQuery) -> Result<Vec<CrashRecord>, FetchError> {
    let query = query.normalized();
    if query.product_line.trim().is_empty() {
      return Err(FetchError::invalid_query("product_line", "must not be empty"));
    }
    if query.date.trim().is_empty() {
      return Err(FetchError::invalid_query("date", "must not be empty"));
    }

    let path = self.path_for(&query);
    debug!(
      "loading {} (version {:?}, model {:?}, size {})",
      path.display(),
      query.version,
      query.model,
      query.size
    );
    let records = records_from_response(&self.read(&path)?)?;
    let total = records.len();

    let matched: Vec<CrashRecord> = records
      .into_iter()
      .filter(|r| r.record_type == KERNEL_CRASH)
      .filter(|r| query.version.is_empty() || r.version.starts_with(&query.version))
      .filter(|r| query.model.is_empty() || r.model == query.model)
      .take(query.page_size())
      .collect();

    debug!("{} of {} records match", matched.len(), total);
    Ok(matched)
  }
}
