//! Logging configuration. Installs a global subscriber, so this binary holds
//! the only test that calls `init_logging_with_writer`.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

use rpt_cli::logging::{LogConfig, LogFormat, build_env_filter, init_logging_with_writer};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn explicit_filter_covers_workspace_crates() {
    let filter = build_env_filter(LevelFilter::DEBUG, false).to_string().to_lowercase();
    for target in ["rpt_ingest", "rpt_transform", "rpt_validate", "rpt_parallel"] {
        assert!(filter.contains(&format!("{target}=debug")), "{filter}");
    }

    let quiet = build_env_filter(LevelFilter::ERROR, false).to_string().to_lowercase();
    assert!(quiet.contains("rpt_model=error"), "{quiet}");
}

#[test]
fn default_config_is_warn_and_honors_env() {
    let config = LogConfig::default();
    assert_eq!(config.level_filter, LevelFilter::WARN);
    assert!(config.use_env_filter);
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(config.log_file.is_none());
}

#[test]
fn builder_chain_sets_every_field() {
    let config = LogConfig::default()
        .with_level(LevelFilter::TRACE)
        .with_env_filter(false)
        .with_format(LogFormat::Compact)
        .with_ansi(false)
        .with_timestamps(true)
        .with_target(true)
        .with_log_file(Some(PathBuf::from("rpt.log")));
    assert_eq!(config.level_filter, LevelFilter::TRACE);
    assert!(!config.use_env_filter);
    assert_eq!(config.format, LogFormat::Compact);
    assert!(!config.with_ansi);
    assert!(config.with_timestamps);
    assert!(config.with_target);
    assert_eq!(config.log_file.as_deref(), Some(Path::new("rpt.log")));
    assert!(config.with_log_file(None).log_file.is_none());
}

#[test]
fn json_events_reach_the_writer() {
    let captured = Captured::default();
    let config = LogConfig::default()
        .with_level(LevelFilter::INFO)
        .with_env_filter(false)
        .with_format(LogFormat::Json)
        .with_target(true);
    init_logging_with_writer(&config, captured.clone());

    tracing::info!(target: "rpt_ingest", rows = 3, "loaded records");
    tracing::debug!(target: "rpt_ingest", "too detailed");

    let text = captured.text();
    let line = text.lines().next().expect("one event");
    assert!(line.contains("\"rows\":3"), "{line}");
    assert!(line.contains("loaded records"), "{line}");
    assert!(line.contains("rpt_ingest"), "{line}");
    assert!(!text.contains("too detailed"));
}
