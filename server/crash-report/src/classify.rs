//! Kernel panic classification of a normalized crash log.

/// Maps a group's normalized log lines to a short label. Must be total and pure.
pub trait Classifier {
  fn classify(&self, lines: &[String]) -> String;
}

impl<F> Classifier for F
where
  F: Fn(&[String]) -> String,
{
  fn classify(&self, lines: &[String]) -> String {
    self(lines)
  }
}

pub const UNKNOWN: &str = "Unknown";

const PANIC_PREFIX: &str = "Kernel panic - not syncing:";

/// Ordered substring rules; the first rule matching any line wins.
const RULES: &[(&str, &str)] = &[
  ("unable to handle kernel null pointer dereference", "NULL pointer dereference"),
  ("unable to handle kernel paging request", "Bad paging request"),
  ("out of memory", "Out of memory"),
  ("soft lockup", "Soft lockup"),
  ("hung_task", "Hung task"),
  ("blocked for more than", "Hung task"),
  ("rcu_sched self-detected stall", "RCU stall"),
  ("rcu stall", "RCU stall"),
  ("watchdog", "Watchdog"),
  ("bug:", "Kernel BUG"),
  ("internal error: oops", "Oops"),
];

/// Rule-based default classifier for kernel crash logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelPanicClassifier;

impl Classifier for KernelPanicClassifier {
  fn classify(&self, lines: &[String]) -> String {
    let lowered: Vec<String> = lines.iter().map(|l| l.to_ascii_lowercase()).collect();
    for (needle, label) in RULES {
      if lowered.iter().any(|l| l.contains(needle)) {
        return (*label).to_string();
      }
    }

    // Fall back to the panic message itself.
    lines
      .iter()
      .find_map(|l| l.split_once(PANIC_PREFIX).map(|(_, rest)| rest.trim()))
      .filter(|reason| !reason.is_empty())
      .map(|reason| format!("Kernel panic: {}", reason))
      .unwrap_or_else(|| UNKNOWN.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn null_dereference_is_recognized() {
    let log = lines(&[
      "Unable to handle kernel NULL pointer dereference at virtual address 00000008",
      "pc : ubnt_foo+0x14/0x40",
    ]);
    assert_eq!(KernelPanicClassifier.classify(&log), "NULL pointer dereference");
  }

  #[test]
  fn earlier_rule_wins_over_later_line() {
    let log = lines(&["watchdog: BUG: soft lockup - CPU#2 stuck for 22s!"]);
    assert_eq!(KernelPanicClassifier.classify(&log), "Soft lockup");
  }

  #[test]
  fn panic_message_is_used_when_no_rule_matches() {
    let log = lines(&["Kernel panic - not syncing: Fatal exception in interrupt"]);
    assert_eq!(
      KernelPanicClassifier.classify(&log),
      "Kernel panic: Fatal exception in interrupt"
    );
  }

  #[test]
  fn unmatched_log_is_unknown() {
    assert_eq!(KernelPanicClassifier.classify(&lines(&["all good"])), UNKNOWN);
    assert_eq!(KernelPanicClassifier.classify(&[]), UNKNOWN);
  }

  #[test]
  fn closures_are_classifiers() {
    let first_line = |l: &[String]| l.first().cloned().unwrap_or_default();
    assert_eq!(first_line.classify(&lines(&["a", "b"])), "a");
  }
}
