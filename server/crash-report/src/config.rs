//! Engine configuration with sane defaults, overridable from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ReportError;
use crate::naming;

/// Which sinks a run hands its report to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
  /// Remote spreadsheet service only.
  Google,
  /// Local .xlsx file only.
  Excel,
  /// Remote first, local file when the remote fails.
  Fallback,
}

impl SinkMode {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "google" | "sheets" | "remote" => Some(Self::Google),
      "excel" | "xlsx" | "local" => Some(Self::Excel),
      "fallback" | "both" => Some(Self::Fallback),
      _ => None,
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Keep only the first record per device across the whole run.
  pub dedup: bool,
  pub sink_mode: SinkMode,
  /// Directory holding saved `_search` responses (`<product>_logs_<date>.json`).
  pub dump_dir: PathBuf,
  /// Where the local sink writes workbooks.
  pub output_dir: PathBuf,
  /// Signature sheets are named `<prefix><ordinal>`.
  pub sheet_prefix: String,
  pub summary_sheet: String,
  pub sheets_base_url: String,
  /// Pre-issued bearer token for the spreadsheet service.
  pub sheets_token: Option<String>,
  pub request_timeout: Duration,
  /// Up to two keywords counted across signature sheets.
  pub keywords: Vec<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      dedup: true,
      sink_mode: SinkMode::Fallback,
      dump_dir: PathBuf::from("."),
      output_dir: PathBuf::from("."),
      sheet_prefix: "CrashLog".into(),
      summary_sheet: "Sheet1".into(),
      sheets_base_url: "https://sheets.googleapis.com/v4".into(),
      sheets_token: None,
      request_timeout: Duration::from_secs(30),
      keywords: Vec::new(),
    }
  }
}

impl Config {
  /// Defaults overlaid with `CRASHLOG_*` environment variables.
  pub fn from_env() -> Result<Self, ReportError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Same as [`Config::from_env`] with an injectable variable lookup.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ReportError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();

    if let Some(v) = lookup("CRASHLOG_DEDUP") {
      config.dedup = parse_bool(&v)
        .ok_or_else(|| ReportError::config("CRASHLOG_DEDUP", "expected true|false"))?;
    }
    if let Some(v) = lookup("CRASHLOG_SINK") {
      config.sink_mode = SinkMode::from_str_loose(&v)
        .ok_or_else(|| ReportError::config("CRASHLOG_SINK", "expected google|excel|fallback"))?;
    }
    if let Some(v) = lookup("CRASHLOG_DUMP_DIR") {
      config.dump_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("CRASHLOG_OUTPUT_DIR") {
      config.output_dir = PathBuf::from(v);
    }
    if let Some(v) = lookup("CRASHLOG_SHEET_PREFIX") {
      let prefix = v.trim();
      if prefix.is_empty() {
        return Err(ReportError::config("CRASHLOG_SHEET_PREFIX", "must not be empty"));
      }
      naming::validate_sheet_prefix(prefix)
        .map_err(|reason| ReportError::config("CRASHLOG_SHEET_PREFIX", &reason))?;
      config.sheet_prefix = prefix.to_string();
    }
    if let Some(v) = lookup("CRASHLOG_SHEETS_URL") {
      config.sheets_base_url = v.trim_end_matches('/').to_string();
    }
    config.sheets_token = lookup("CRASHLOG_SHEETS_TOKEN")
      .map(|t| t.trim().to_string())
      .filter(|t| !t.is_empty());
    if let Some(v) = lookup("CRASHLOG_TIMEOUT_SECS") {
      let secs: u64 = v
        .trim()
        .parse()
        .map_err(|_| ReportError::config("CRASHLOG_TIMEOUT_SECS", "expected whole seconds"))?;
      config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(v) = lookup("CRASHLOG_KEYWORDS") {
      config.keywords = v
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .take(2)
        .map(String::from)
        .collect();
    }

    Ok(config)
  }
}

fn parse_bool(s: &str) -> Option<bool> {
  match s.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Some(true),
    "false" | "0" | "no" | "off" => Some(false),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn empty_environment_gives_defaults() {
    let config = Config::from_lookup(lookup(&[])).unwrap();
    assert!(config.dedup);
    assert_eq!(config.sink_mode, SinkMode::Fallback);
    assert_eq!(config.sheet_prefix, "CrashLog");
    assert!(config.sheets_token.is_none());
  }

  #[test]
  fn overrides_are_applied() {
    let config = Config::from_lookup(lookup(&[
      ("CRASHLOG_DEDUP", "off"),
      ("CRASHLOG_SINK", "excel"),
      ("CRASHLOG_TIMEOUT_SECS", "5"),
      ("CRASHLOG_KEYWORDS", "oom, ,watchdog,extra"),
      ("CRASHLOG_SHEETS_URL", "http://localhost:9000/v4/"),
    ]))
    .unwrap();
    assert!(!config.dedup);
    assert_eq!(config.sink_mode, SinkMode::Excel);
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.keywords, vec!["oom", "watchdog"]);
    assert_eq!(config.sheets_base_url, "http://localhost:9000/v4");
  }

  #[test]
  fn bad_values_name_the_key() {
    let err = Config::from_lookup(lookup(&[("CRASHLOG_SINK", "ftp")])).unwrap_err();
    assert!(err.to_string().contains("CRASHLOG_SINK"));
    let err = Config::from_lookup(lookup(&[("CRASHLOG_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert!(err.to_string().contains("CRASHLOG_TIMEOUT_SECS"));
  }

  #[test]
  fn sheet_prefix_too_long_for_a_sheet_name() {
    let long = "CrashLogWithAVeryLongPrefixName";
    let err = Config::from_lookup(lookup(&[("CRASHLOG_SHEET_PREFIX", long)])).unwrap_err();
    assert_eq!(err.kind(), "config");
    assert!(err.to_string().contains("CRASHLOG_SHEET_PREFIX"));

    let config = Config::from_lookup(lookup(&[("CRASHLOG_SHEET_PREFIX", " Panic ")])).unwrap();
    assert_eq!(config.sheet_prefix, "Panic");
  }

  #[test]
  fn blank_token_is_treated_as_missing() {
    let config = Config::from_lookup(lookup(&[("CRASHLOG_SHEETS_TOKEN", "  ")])).unwrap();
    assert!(config.sheets_token.is_none());
  }
}
