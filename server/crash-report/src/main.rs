//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is a CrashQuery. Each produces exactly one output line:
//! - A RunOutcome (the report was accepted by some sink)
//! - An ErrorOutput (no data, fetch failure, version failure, or every sink failed)
//!
//! Configuration comes from `CRASHLOG_*` environment variables; logs go to
//! stderr and honour `RUST_LOG`.

use crash_report::types::ErrorOutput;
use crash_report::{Config, CrashQuery, Engine, KernelPanicClassifier, SearchDumpSource, SinkChain};
use log::error;
use std::io::{self, BufRead, Write};

fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let config = match Config::from_env() {
    Ok(c) => c,
    Err(e) => {
      error!("{}", e);
      std::process::exit(2);
    }
  };

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let source = SearchDumpSource::new(&config.dump_dir);
  let engine = Engine::new(config);

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        error!("read error: {}", e);
        std::process::exit(1);
      }
    };

    // Skip blank lines.
    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let query: CrashQuery = match serde_json::from_str(trimmed) {
      Ok(q) => q,
      Err(e) => {
        let err = ErrorOutput::new(format!("json parse: {}", e)).with_kind("json");
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
        continue;
      }
    };

    // Fresh sinks per query: no connection state carries over between runs.
    let mut sinks = SinkChain::from_config(engine.config());
    match engine.run(&source, &query, &KernelPanicClassifier, &mut sinks) {
      Ok(outcome) => {
        let _ = serde_json::to_writer(&mut out, &outcome);
        let _ = writeln!(out);
      }
      Err(e) => {
        error!("run failed: {}", e);
        let err = ErrorOutput::new(e.to_string()).with_kind(e.kind());
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
    let _ = out.flush();
  }

  let _ = out.flush();
}
