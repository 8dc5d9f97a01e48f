//! Core engine: runs one fetch → group → render → sink pipeline per query.

use log::{debug, info};

use crate::classify::Classifier;
use crate::config::Config;
use crate::dedup::RunContext;
use crate::error::ReportError;
use crate::group;
use crate::naming::ReportName;
use crate::render;
use crate::report::{Report, SummarySheet};
use crate::search;
use crate::sink::SinkChain;
use crate::source::CrashSource;
use crate::types::*;

/// The crash report engine. Holds configuration only; every run gets its own state.
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Build the report for an already-fetched batch. No I/O.
  ///
  /// Returns `NoData` for an empty batch and `VersionExtraction` when the
  /// first record's version carries no `v<major>.<minor>.<patch>`.
  pub fn build_report(
    &self,
    records: &[CrashRecord],
    classifier: &dyn Classifier,
  ) -> Result<Report, ReportError> {
    let first = records.first().ok_or(ReportError::NoData)?;
    let name = ReportName::from_record(first)?;

    let groups = group::group_by_signature(records);
    debug!("{} records in {} signature groups", records.len(), groups.len());

    let mut ctx = RunContext::new();
    let rendered = render::render_sheets(&groups, classifier, &self.config, &mut ctx);

    Ok(Report {
      name,
      summary: SummarySheet {
        name: self.config.summary_sheet.clone(),
        device_ids: ctx.into_ledger(),
      },
      sheets: rendered.sheets,
      discarded_groups: rendered.discarded,
    })
  }

  /// Run the whole pipeline for one query.
  ///
  /// The fetched batch is rendered once; the same report goes to every sink
  /// the chain tries.
  pub fn run(
    &self,
    source: &dyn CrashSource,
    query: &CrashQuery,
    classifier: &dyn Classifier,
    sinks: &mut SinkChain,
  ) -> Result<RunOutcome, ReportError> {
    info!(
      "run: product_line={} date={} version={} model={} size={}",
      query.product_line, query.date, query.version, query.model, query.size
    );

    let records = source.fetch(query)?;
    if records.is_empty() {
      info!("run: no crash records found");
      return Err(ReportError::NoData);
    }

    let report = self.build_report(&records, classifier)?;
    let keyword_counts = self.keyword_counts(&report);
    let delivery = sinks.deliver(&report)?;

    info!(
      "run: {} sheets, {} devices, {} groups discarded, delivered via {}",
      report.sheets.len(),
      report.device_count(),
      report.discarded_groups,
      delivery.sink
    );

    Ok(RunOutcome {
      report_name: report.name.to_string(),
      sink: delivery.sink,
      location: delivery.location,
      sheet_count: report.sheets.len(),
      device_count: report.device_count(),
      discarded_groups: report.discarded_groups,
      sheets: report
        .sheets
        .iter()
        .map(|s| SheetSummary {
          sheet: s.name.clone(),
          fingerprint: s.fingerprint.clone(),
          classification: s.classification.clone(),
          devices: s.entries.len(),
        })
        .collect(),
      recovered_failures: delivery.recovered,
      keyword_counts,
    })
  }

  fn keyword_counts(&self, report: &Report) -> Option<KeywordCounts> {
    let mut keywords = self.config.keywords.iter();
    let first = keywords.next()?;
    let second = keywords.next().map(String::as_str);
    Some(search::keyword_counts(report, first, second))
  }
}
