//! Short stable fingerprints for crash signatures.

/// Compute a stable fingerprint for a raw crash-log signature.
///
/// Used to refer to a signature in logs and run output without echoing
/// the multi-line text. Uses blake3 for a fast, deterministic hash.
pub fn compute(signature: &str) -> String {
  let hash = blake3::hash(signature.as_bytes());
  // 8 bytes (16 hex chars) is plenty for one batch of signatures.
  hash.to_hex()[..16].to_string()
}
