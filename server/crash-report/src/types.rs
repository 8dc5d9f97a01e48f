//! Core types for the crash report engine (JSON contracts + internal models).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Wire types (JSON contract: what the search backend returns)
// ---------------------------------------------------------------------------

/// A `_search` response. Only the hit bodies are read; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
  #[serde(default)]
  pub hits: SearchHits,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHits {
  #[serde(default)]
  pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
  #[serde(rename = "_source")]
  pub source: HitSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HitSource {
  pub body: WireCrashLog,
}

/// One crash document as indexed. Every field is optional on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireCrashLog {
  #[serde(default, rename = "type")]
  pub record_type: Option<String>,
  #[serde(default)]
  pub system_time: Option<String>,
  #[serde(default)]
  pub anonymous_device_id: Option<String>,
  #[serde(default)]
  pub model: Option<String>,
  #[serde(default)]
  pub version: Option<String>,
  #[serde(default)]
  pub bomrev: Option<String>,
  #[serde(default)]
  pub is_default: Option<bool>,
  #[serde(default)]
  pub product_line: Option<String>,
  #[serde(default)]
  pub boot_time: Option<String>,
  #[serde(default)]
  pub uptime: Option<u64>,
  #[serde(default)]
  pub human_readable_uptime: Option<String>,
  #[serde(default)]
  pub kernel_version: Option<String>,
  #[serde(default)]
  pub architecture: Option<String>,
  #[serde(default)]
  pub load_average: Option<String>,
  #[serde(default)]
  pub crash_log: Option<String>,
  #[serde(default)]
  pub is_internal: Option<String>,
  #[serde(default)]
  pub signal: Option<i32>,
  #[serde(default, rename = "apiVersion")]
  pub api_version: Option<String>,
  #[serde(default)]
  pub clean_version: Option<String>,
  #[serde(default)]
  pub sortable_version: Option<i64>,
}

// ---------------------------------------------------------------------------
// Query (JSON contract: one stdin line)
// ---------------------------------------------------------------------------

/// Default page size when the caller passes zero or a negative size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which crash records to load. Unknown fields are silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashQuery {
  pub product_line: String,
  /// Index date as the backend names it, e.g. `2023_06_15`.
  pub date: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub model: String,
  #[serde(default)]
  pub size: i64,
}

impl CrashQuery {
  /// Version gets a leading `v`, non-positive sizes fall back to the default page size.
  pub fn normalized(&self) -> Self {
    let version = if self.version.is_empty() || self.version.starts_with('v') {
      self.version.clone()
    } else {
      format!("v{}", self.version)
    };
    let size = if self.size <= 0 {
      DEFAULT_PAGE_SIZE as i64
    } else {
      self.size
    };
    Self {
      product_line: self.product_line.clone(),
      date: self.date.clone(),
      version,
      model: self.model.clone(),
      size,
    }
  }

  /// Page size as a count. Call on a normalized query.
  pub fn page_size(&self) -> usize {
    usize::try_from(self.size).unwrap_or(DEFAULT_PAGE_SIZE)
  }
}

// ---------------------------------------------------------------------------
// Internal record model
// ---------------------------------------------------------------------------

/// One reported crash event after decoding. `raw_log` is the grouping key; the rest is payload.
///
/// Timestamps keep the offset they were reported with; report names use the local date.
#[derive(Debug, Clone, PartialEq)]
pub struct CrashRecord {
  pub record_type: String,
  pub captured_at: DateTime<FixedOffset>,
  pub device_id: String,
  pub model: String,
  pub product_line: String,
  pub version: String,
  pub boot_time: Option<DateTime<FixedOffset>>,
  pub uptime_secs: u64,
  pub kernel_version: String,
  pub architecture: String,
  pub load_average: String,
  pub raw_log: String,
  pub signal: i32,
  pub internal: bool,
  pub api_version: String,
}

// ---------------------------------------------------------------------------
// Output types (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
  pub sheet: String,
  pub fingerprint: String,
  pub classification: String,
  pub devices: usize,
}

/// Sheets containing each keyword, and both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KeywordCounts {
  pub first: usize,
  pub second: usize,
  pub both: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SinkFailure {
  pub sink: String,
  pub message: String,
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
  pub report_name: String,
  pub sink: String,
  pub location: String,
  pub sheet_count: usize,
  pub device_count: usize,
  pub discarded_groups: usize,
  pub sheets: Vec<SheetSummary>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub recovered_failures: Vec<SinkFailure>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub keyword_counts: Option<KeywordCounts>,
}

// ---------------------------------------------------------------------------
// CLI stream wrappers
// ---------------------------------------------------------------------------

/// Structured error output for a failed run.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
  pub error: bool,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kind: Option<String>,
}

impl ErrorOutput {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      error: true,
      message: message.into(),
      kind: None,
    }
  }

  pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
    self.kind = Some(kind.into());
    self
  }
}
