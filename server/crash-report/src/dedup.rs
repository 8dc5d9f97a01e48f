//! Per-run device bookkeeping: the seen-device set and the device ledger.

use std::collections::HashSet;

use crate::types::CrashRecord;

/// Mutable state owned by exactly one pipeline run.
///
/// `seen` answers "has this device already been emitted anywhere in the run";
/// `ledger` lists every emitted device entry in emission order.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
  seen: HashSet<String>,
  ledger: Vec<String>,
}

impl RunContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn has_seen(&self, device_id: &str) -> bool {
    self.seen.contains(device_id)
  }

  /// Append an emitted device entry to the ledger and mark the device seen.
  pub fn record_emitted(&mut self, device_id: &str) {
    self.seen.insert(device_id.to_string());
    self.ledger.push(device_id.to_string());
  }

  pub fn ledger(&self) -> &[String] {
    &self.ledger
  }

  pub fn into_ledger(self) -> Vec<String> {
    self.ledger
  }
}

/// Select the records of one group that survive device dedup.
///
/// With dedup enabled a record is dropped when its device was already seen
/// in this group or any earlier one. Does not touch `ctx`; the caller
/// records survivors as it emits them.
pub fn survivors<'a>(
  records: &[&'a CrashRecord],
  ctx: &RunContext,
  dedup: bool,
) -> Vec<&'a CrashRecord> {
  if !dedup {
    return records.to_vec();
  }
  let mut taken: HashSet<&str> = HashSet::new();
  records
    .iter()
    .copied()
    .filter(|r| !ctx.has_seen(&r.device_id) && taken.insert(r.device_id.as_str()))
    .collect()
}
