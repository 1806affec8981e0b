//! # User-facing Logger
//!
//! Questo modulo gestisce i messaggi destinati all'utente (conversioni riuscite,
//! errori, titoli), separati dalla diagnostica `tracing` interna.
//!
//! ## Responsabilità:
//! - Un `Logger` clonabile, costruito una volta in `main` e passato esplicitamente
//! - Sink multipli registrati per nome (`console`, `file`, ...)
//! - Routing per tipo di messaggio configurato da `AppConfig`
//!
//! ## Routing di default:
//! - `success` -> console
//! - `error` -> console, file
//! - `info` / `text` / `title` / `animate` -> console
//!
//! ## Formato file di log:
//! ```text
//! [2024-05-01 10:22:13.042] ERROR: Error during '.avif' conversion: ...
//! ```

use crate::config::AppConfig;
use crate::progress;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info};

/// Pause after an animated message
pub const ANIMATION_DELAY: Duration = Duration::from_millis(500);

/// Kind of user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Info,
    Success,
    Error,
    Animate,
    Text,
    Title,
}

impl LogKind {
    /// Label written by line-oriented sinks
    pub fn label(&self) -> &'static str {
        match self {
            LogKind::Success => "SUCCESS",
            LogKind::Error => "ERROR",
            _ => "INFO",
        }
    }
}

/// Destination for user-facing messages
pub trait LogSink: Send + Sync {
    fn log(&self, kind: LogKind, message: &str);
}

/// Renders messages through `tracing`, animations through an `indicatif` spinner
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn log(&self, kind: LogKind, message: &str) {
        match kind {
            LogKind::Error => error!("{}", message),
            LogKind::Success => info!("✅ {}", message),
            LogKind::Title => info!("=== {} ===", message),
            LogKind::Animate => {
                let spinner = progress::spinner(message);
                spinner.finish_with_message(message.to_string());
            }
            LogKind::Info | LogKind::Text => info!("{}", message),
        }
    }
}

/// Appends timestamped lines to a log file
///
/// The file is opened on the first message and the handle is kept for the
/// following ones. A failed write drops the handle so the next message reopens it.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<LineWriter<File>>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_line(kind: LogKind, message: &str) -> String {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!("[{}] {}: {}\n", now, kind.label(), message)
    }
}

impl LogSink for FileSink {
    fn log(&self, kind: LogKind, message: &str) {
        let line = Self::format_line(kind, message);
        let mut file = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if file.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.path) {
                Ok(handle) => *file = Some(LineWriter::new(handle)),
                Err(e) => {
                    error!("Failed to open log file {}: {}", self.path.display(), e);
                    return;
                }
            }
        }

        let written = match file.as_mut() {
            Some(writer) => writer.write_all(line.as_bytes()),
            None => return,
        };

        if let Err(e) = written {
            *file = None;
            // the log file is the thing that failed, fall back to diagnostics
            error!("Failed to write log file {}: {}", self.path.display(), e);
        }
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(LogKind, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(LogKind, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Messages of one kind, in logging order
    pub fn messages(&self, kind: LogKind) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, message)| message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, kind: LogKind, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((kind, message.to_string()));
        }
    }
}

/// Which sinks receive which kind of message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRoutes {
    pub success: Vec<String>,
    pub error: Vec<String>,
    pub info: Vec<String>,
}

impl LogRoutes {
    /// Every kind goes to every listed sink
    pub fn everything_to(sinks: &[&str]) -> Self {
        let sinks: Vec<String> = sinks.iter().map(|s| s.to_string()).collect();
        Self {
            success: sinks.clone(),
            error: sinks.clone(),
            info: sinks,
        }
    }

    fn for_kind(&self, kind: LogKind) -> &[String] {
        match kind {
            LogKind::Success => &self.success,
            LogKind::Error => &self.error,
            LogKind::Info | LogKind::Animate | LogKind::Text | LogKind::Title => &self.info,
        }
    }
}

/// User-facing logger passed to every component
#[derive(Clone)]
pub struct Logger {
    sinks: BTreeMap<String, Arc<dyn LogSink>>,
    routes: LogRoutes,
    animation_delay: Duration,
}

impl Logger {
    pub fn new(routes: LogRoutes) -> Self {
        Self {
            sinks: BTreeMap::new(),
            routes,
            animation_delay: ANIMATION_DELAY,
        }
    }

    /// Console and file sinks routed as the configuration says
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(LogRoutes {
            success: config.success_log_methods.clone(),
            error: config.error_log_methods.clone(),
            info: config.info_log_methods.clone(),
        })
        .with_sink("console", Arc::new(ConsoleSink))
        .with_sink("file", Arc::new(FileSink::new(&config.log_file_path)))
    }

    /// Logger writing everything to one in-memory sink, without animation delay
    pub fn memory() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let logger = Self::new(LogRoutes::everything_to(&["memory"]))
            .with_sink("memory", sink.clone())
            .with_animation_delay(Duration::ZERO);
        (logger, sink)
    }

    pub fn with_sink(mut self, name: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.insert(name.into(), sink);
        self
    }

    pub fn with_animation_delay(mut self, delay: Duration) -> Self {
        self.animation_delay = delay;
        self
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogKind::Info, message.as_ref());
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.log(LogKind::Success, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogKind::Error, message.as_ref());
    }

    pub fn text(&self, message: impl AsRef<str>) {
        self.log(LogKind::Text, message.as_ref());
    }

    pub fn title(&self, message: impl AsRef<str>) {
        self.log(LogKind::Title, message.as_ref());
    }

    pub async fn animate(&self, message: impl AsRef<str>) {
        self.log(LogKind::Animate, message.as_ref());
        if !self.animation_delay.is_zero() {
            tokio::time::sleep(self.animation_delay).await;
        }
    }

    fn log(&self, kind: LogKind, message: &str) {
        for name in self.routes.for_kind(kind) {
            if let Some(sink) = self.sinks.get(name) {
                sink.log(kind, message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_routing_by_kind() {
        let console = Arc::new(MemorySink::new());
        let file = Arc::new(MemorySink::new());
        let logger = Logger::new(LogRoutes {
            success: vec!["console".into()],
            error: vec!["console".into(), "file".into()],
            info: vec!["console".into()],
        })
        .with_sink("console", console.clone())
        .with_sink("file", file.clone());

        logger.info("scanning");
        logger.success("done a.webp");
        logger.error("broken b.png");
        logger.title("Images");

        assert_eq!(console.lines().len(), 4);
        assert_eq!(file.lines(), vec![(LogKind::Error, "broken b.png".to_string())]);
    }

    #[test]
    fn test_unknown_sink_names_are_ignored() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(LogRoutes::everything_to(&["memory", "syslog"]))
            .with_sink("memory", sink.clone());

        logger.text("hello");
        assert_eq!(sink.messages(LogKind::Text), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_animate_goes_to_info_route() {
        let (logger, sink) = Logger::memory();
        logger.animate("FINISH!").await;
        assert_eq!(sink.messages(LogKind::Animate), vec!["FINISH!".to_string()]);
    }

    #[test]
    fn test_file_sink_appends_formatted_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.txt");
        let sink = FileSink::new(&path);

        sink.log(LogKind::Error, "first");
        sink.log(LogKind::Title, "second");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] ERROR: first"));
        assert!(lines[1].ends_with("] INFO: second"));
    }

    #[test]
    fn test_file_sink_opens_lazily_and_keeps_existing_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("log.txt");
        let sink = FileSink::new(&path);
        assert!(!path.exists());

        std::fs::write(&path, "previous run\n").unwrap();
        for i in 0..3 {
            sink.log(LogKind::Success, &format!("file {}", i));
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "previous run");
        assert!(lines[3].ends_with("] SUCCESS: file 2"));
    }
}
