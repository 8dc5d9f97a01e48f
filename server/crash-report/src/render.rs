//! Compose signature sheets from grouped records.

use log::debug;

use crate::classify::Classifier;
use crate::config::Config;
use crate::dedup::{self, RunContext};
use crate::group::SignatureGroup;
use crate::naming;
use crate::normalize;
use crate::report::{DeviceEntry, SignatureSheet};

/// Sheets for the retained groups plus the number of groups dropped by dedup.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
  pub sheets: Vec<SignatureSheet>,
  pub discarded: usize,
}

/// Render every group in order, updating the run's device state as entries are emitted.
///
/// - A group whose records are all already-seen devices is discarded and takes no ordinal.
/// - Classification runs once per retained group, on its first survivor's normalized lines.
/// - Each device block lists the normalized lines last-to-first.
pub fn render_sheets(
  groups: &[SignatureGroup<'_>],
  classifier: &dyn Classifier,
  config: &Config,
  ctx: &mut RunContext,
) -> Rendered {
  let mut rendered = Rendered::default();

  for group in groups {
    let kept = dedup::survivors(&group.records, ctx, config.dedup);
    if kept.is_empty() {
      debug!(
        "discarding signature {} ({} records, all devices already seen)",
        group.fingerprint,
        group.records.len()
      );
      rendered.discarded += 1;
      continue;
    }

    let mut classification = None;
    let mut entries = Vec::with_capacity(kept.len());
    for record in kept {
      let lines = normalize::normalize_log(&record.raw_log);
      if classification.is_none() {
        classification = Some(classifier.classify(&lines));
      }
      ctx.record_emitted(&record.device_id);
      entries.push(DeviceEntry {
        device_id: record.device_id.clone(),
        lines: lines.into_iter().rev().filter(|l| !l.is_empty()).collect(),
      });
    }

    let name = naming::sheet_name(&config.sheet_prefix, rendered.sheets.len() + 1);
    debug!(
      "sheet {} <- signature {} ({} of {} records kept)",
      name,
      group.fingerprint,
      entries.len(),
      group.records.len()
    );
    rendered.sheets.push(SignatureSheet {
      name,
      fingerprint: group.fingerprint.clone(),
      classification: classification.unwrap_or_default(),
      entries,
    });
  }

  rendered
}
