//! Partition crash records by their exact raw crash-log text.

use std::collections::BTreeMap;

use crate::fingerprint;
use crate::types::CrashRecord;

/// Records sharing one raw crash-log value, in input order.
#[derive(Debug, Clone)]
pub struct SignatureGroup<'a> {
  pub signature: &'a str,
  pub fingerprint: String,
  pub records: Vec<&'a CrashRecord>,
}

/// Distinct raw-log values, sorted lexicographically.
pub fn unique_signatures(records: &[CrashRecord]) -> Vec<&str> {
  let mut signatures: Vec<&str> = records.iter().map(|r| r.raw_log.as_str()).collect();
  signatures.sort_unstable();
  signatures.dedup();
  signatures
}

/// Group records by signature.
///
/// Groups come out in signature order; records inside a group keep their
/// relative input order. Every record lands in exactly one group, including
/// records with an empty log. Empty input gives no groups.
pub fn group_by_signature(records: &[CrashRecord]) -> Vec<SignatureGroup<'_>> {
  let mut by_signature: BTreeMap<&str, Vec<&CrashRecord>> = BTreeMap::new();
  for record in records {
    by_signature
      .entry(record.raw_log.as_str())
      .or_default()
      .push(record);
  }

  by_signature
    .into_iter()
    .map(|(signature, records)| SignatureGroup {
      signature,
      fingerprint: fingerprint::compute(signature),
      records,
    })
    .collect()
}
