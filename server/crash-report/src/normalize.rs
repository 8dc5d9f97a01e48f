//! Normalize raw crash-log text into ordered, non-empty lines.

use std::sync::OnceLock;

use regex::Regex;

/// Syslog priority prefix (`<0>` .. `<999>`) that frames each transported line.
fn marker() -> &'static Regex {
  static MARKER: OnceLock<Regex> = OnceLock::new();
  MARKER.get_or_init(|| Regex::new(r"<\d{1,3}>").expect("marker pattern is valid"))
}

/// Replace every priority marker with a line break.
pub fn strip_markers(raw: &str) -> String {
  marker().replace_all(raw, "\n").into_owned()
}

/// Strip markers, split on line breaks, drop empty lines. Order is preserved.
pub fn normalize_log(raw: &str) -> Vec<String> {
  strip_markers(raw)
    .split('\n')
    .filter(|line| !line.is_empty())
    .map(String::from)
    .collect()
}
