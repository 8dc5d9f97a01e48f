//! Structured error types for the crash report engine.

use thiserror::Error;

/// Failure loading records from the data source. Always fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("invalid query: {field}: {reason}")]
  InvalidQuery { field: String, reason: String },

  #[error("source unavailable: {0}")]
  Unavailable(String),

  #[error("malformed source data: {0}")]
  Malformed(String),
}

impl FetchError {
  pub fn invalid_query(field: &str, reason: &str) -> Self {
    Self::InvalidQuery {
      field: field.to_string(),
      reason: reason.to_string(),
    }
  }

  pub fn malformed(msg: impl Into<String>) -> Self {
    Self::Malformed(msg.into())
  }
}

/// Failure reported by a single sink.
#[derive(Debug, Error)]
pub enum SinkError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("transport: {0}")]
  Transport(String),

  #[error("status {code}: {body}")]
  Status { code: u16, body: String },

  #[error("write: {0}")]
  Write(String),

  #[error("io: {0}")]
  Io(#[from] std::io::Error),
}

impl SinkError {
  pub fn write(msg: impl Into<String>) -> Self {
    Self::Write(msg.into())
  }
}

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("no crash records found")]
  NoData,

  #[error("fetch: {0}")]
  Fetch(#[from] FetchError),

  #[error("no semantic version in {input:?}")]
  VersionExtraction { input: String },

  #[error("sink {sink}: {source}")]
  Sink { sink: String, source: SinkError },

  #[error("all {attempts} sinks failed; last was {sink}: {source}")]
  SinksExhausted {
    sink: String,
    attempts: usize,
    source: SinkError,
  },

  #[error("no sinks configured")]
  NoSinks,

  #[error("config: {key}: {reason}")]
  Config { key: String, reason: String },
}

impl ReportError {
  pub fn config(key: &str, reason: &str) -> Self {
    Self::Config {
      key: key.to_string(),
      reason: reason.to_string(),
    }
  }

  /// Short machine-readable tag for the stdout error line.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::NoData => "no_data",
      Self::Fetch(_) => "fetch",
      Self::VersionExtraction { .. } => "version",
      Self::Sink { .. } | Self::SinksExhausted { .. } | Self::NoSinks => "sink",
      Self::Config { .. } => "config",
    }
  }
}
