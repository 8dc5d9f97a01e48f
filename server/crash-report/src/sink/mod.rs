//! Report sinks and the ordered fallback chain.
//!
//! A chain tries its sinks in order. The first success ends delivery; later
//! sinks are never touched. Failures before that are logged and kept on the
//! `Delivery`. If every sink fails, the last failure is the one returned.

pub mod sheets;
pub mod xlsx;

use log::{info, warn};

use crate::config::{Config, SinkMode};
use crate::error::{ReportError, SinkError};
use crate::report::Report;
use crate::types::SinkFailure;

pub use sheets::{GoogleSheetsClient, RemoteSheetSink, SheetService};
pub use xlsx::LocalXlsxSink;

/// A destination that persists a whole report.
pub trait Sink {
  fn name(&self) -> &str;

  /// Persist the report and return where it went (spreadsheet id, file path, ...).
  fn deliver(&mut self, report: &Report) -> Result<String, SinkError>;
}

/// Which sink accepted the report, and what failed before it.
#[derive(Debug, Clone)]
pub struct Delivery {
  pub sink: String,
  pub location: String,
  pub recovered: Vec<SinkFailure>,
}

#[derive(Default)]
pub struct SinkChain {
  sinks: Vec<Box<dyn Sink>>,
}

impl SinkChain {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, sink: impl Sink + 'static) -> Self {
    self.push(sink);
    self
  }

  pub fn push(&mut self, sink: impl Sink + 'static) {
    self.sinks.push(Box::new(sink));
  }

  pub fn len(&self) -> usize {
    self.sinks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sinks.is_empty()
  }

  /// Chain for the configured sink mode.
  pub fn from_config(config: &Config) -> Self {
    let remote = || {
      RemoteSheetSink::new(GoogleSheetsClient::new(
        &config.sheets_base_url,
        config.sheets_token.clone(),
        config.request_timeout,
      ))
    };
    let local = || LocalXlsxSink::new(&config.output_dir);

    match config.sink_mode {
      SinkMode::Google => Self::new().with(remote()),
      SinkMode::Excel => Self::new().with(local()),
      SinkMode::Fallback => Self::new().with(remote()).with(local()),
    }
  }

  /// Hand the report to each sink in turn until one accepts it.
  pub fn deliver(&mut self, report: &Report) -> Result<Delivery, ReportError> {
    let attempts = self.sinks.len();
    let mut recovered = Vec::new();
    let mut last: Option<(String, SinkError)> = None;

    for sink in self.sinks.iter_mut() {
      let name = sink.name().to_string();
      match sink.deliver(report) {
        Ok(location) => {
          info!("report {} accepted by {} at {}", report.name, name, location);
          return Ok(Delivery {
            sink: name,
            location,
            recovered,
          });
        }
        Err(err) => {
          warn!("sink {} failed for report {}: {}", name, report.name, err);
          recovered.push(SinkFailure {
            sink: name.clone(),
            message: err.to_string(),
          });
          last = Some((name, err));
        }
      }
    }

    match last {
      None => Err(ReportError::NoSinks),
      Some((sink, source)) if attempts == 1 => Err(ReportError::Sink { sink, source }),
      Some((sink, source)) => Err(ReportError::SinksExhausted {
        sink,
        attempts,
        source,
      }),
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::naming::ReportName;
  use crate::report::SummarySheet;
  use chrono::NaiveDate;
  use std::cell::RefCell;
  use std::rc::Rc;

  /// Sink that records every report it sees and either accepts or fails.
  pub(crate) struct FakeSink {
    pub name: String,
    pub fail: bool,
    pub seen: Rc<RefCell<Vec<Report>>>,
  }

  impl FakeSink {
    pub(crate) fn new(name: &str, fail: bool) -> (Self, Rc<RefCell<Vec<Report>>>) {
      let seen = Rc::new(RefCell::new(Vec::new()));
      (
        Self {
          name: name.into(),
          fail,
          seen: Rc::clone(&seen),
        },
        seen,
      )
    }
  }

  impl Sink for FakeSink {
    fn name(&self) -> &str {
      &self.name
    }

    fn deliver(&mut self, report: &Report) -> Result<String, SinkError> {
      self.seen.borrow_mut().push(report.clone());
      if self.fail {
        Err(SinkError::Transport(format!("{} is down", self.name)))
      } else {
        Ok(format!("{}://ok", self.name))
      }
    }
  }

  pub(crate) fn empty_report() -> Report {
    Report {
      name: ReportName {
        model: "UNVR".into(),
        version: "3.1.9".into(),
        date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
      },
      summary: SummarySheet {
        name: "Sheet1".into(),
        device_ids: vec!["d1".into()],
      },
      sheets: Vec::new(),
      discarded_groups: 0,
    }
  }

  #[test]
  fn primary_success_skips_secondary() {
    let (primary, primary_seen) = FakeSink::new("primary", false);
    let (secondary, secondary_seen) = FakeSink::new("secondary", false);
    let mut chain = SinkChain::new().with(primary).with(secondary);

    let delivery = chain.deliver(&empty_report()).unwrap();
    assert_eq!(delivery.sink, "primary");
    assert!(delivery.recovered.is_empty());
    assert_eq!(primary_seen.borrow().len(), 1);
    assert!(secondary_seen.borrow().is_empty());
  }

  #[test]
  fn primary_failure_falls_back_with_same_report() {
    let (primary, _) = FakeSink::new("primary", true);
    let (secondary, secondary_seen) = FakeSink::new("secondary", false);
    let mut chain = SinkChain::new().with(primary).with(secondary);
    let report = empty_report();

    let delivery = chain.deliver(&report).unwrap();
    assert_eq!(delivery.sink, "secondary");
    assert_eq!(delivery.location, "secondary://ok");
    assert_eq!(delivery.recovered.len(), 1);
    assert_eq!(delivery.recovered[0].sink, "primary");
    assert_eq!(secondary_seen.borrow()[0], report);
  }

  #[test]
  fn both_failing_surfaces_the_last_error() {
    let (primary, _) = FakeSink::new("primary", true);
    let (secondary, _) = FakeSink::new("secondary", true);
    let mut chain = SinkChain::new().with(primary).with(secondary);

    let err = chain.deliver(&empty_report()).unwrap_err();
    match err {
      ReportError::SinksExhausted { sink, attempts, .. } => {
        assert_eq!(sink, "secondary");
        assert_eq!(attempts, 2);
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn single_sink_failure_is_surfaced_directly() {
    let (only, _) = FakeSink::new("only", true);
    let mut chain = SinkChain::new().with(only);
    let err = chain.deliver(&empty_report()).unwrap_err();
    assert!(matches!(err, ReportError::Sink { ref sink, .. } if sink == "only"));
  }

  #[test]
  fn empty_chain_is_an_error() {
    let err = SinkChain::new().deliver(&empty_report()).unwrap_err();
    assert!(matches!(err, ReportError::NoSinks));
  }

  #[test]
  fn chain_follows_sink_mode() {
    let mut config = Config::default();
    assert_eq!(SinkChain::from_config(&config).len(), 2);
    config.sink_mode = SinkMode::Excel;
    assert_eq!(SinkChain::from_config(&config).len(), 1);
    config.sink_mode = SinkMode::Google;
    assert_eq!(SinkChain::from_config(&config).len(), 1);
  }
}
