//! Error-sink and result-log collaborators.
//!
//! Both sit behind traits so tests can substitute in-memory fakes. The
//! file implementations are append-safe: the error sink opens in append
//! mode, and the result log writes one fresh file per validation instead
//! of rewriting a shared array (which would lose entries under
//! concurrent calls).

use chrono::Utc;
use paceproof_core::LogEntry;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Inference stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RuleCheck,
    DataExtraction,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RuleCheck => write!(f, "Rule check"),
            Self::DataExtraction => write!(f, "Data extraction"),
        }
    }
}

/// Errors writing a result-log entry.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("failed to write log file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize log entry: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only sink for caught inference failures.
///
/// Reporting is best-effort: implementations must not propagate their
/// own I/O failures into the validation outcome.
pub trait ErrorSink: Send + Sync {
    /// Record one failure line for the given stage.
    fn report(&self, stage: Stage, message: &str);
}

/// Error sink appending `"<Stage> error: <message>"` lines to a file.
///
/// The parent directory is created on first use.
#[derive(Debug, Clone)]
pub struct FileErrorSink {
    path: PathBuf,
}

impl FileErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl ErrorSink for FileErrorSink {
    fn report(&self, stage: Stage, message: &str) {
        let line = format!("{stage} error: {message}");
        if let Err(e) = self.append(&line) {
            tracing::warn!(path = %self.path.display(), error = %e, "error sink write failed");
        }
    }
}

/// Append-only store for validation results.
pub trait ResultLog: Send + Sync {
    /// Persist one entry. Prior entries must remain untouched.
    fn append(&self, entry: &LogEntry) -> Result<(), LogError>;
}

/// Result log writing one pretty-printed JSON file per validation into a
/// directory, named `out_<timestamp>_<seq>.json`.
///
/// Per-call files sidestep the read-modify-write race a single shared
/// array file would have. A process-wide sequence number keeps calls in
/// the same millisecond from colliding.
#[derive(Debug, Clone)]
pub struct JsonDirLog {
    dir: PathBuf,
}

static LOG_SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

impl JsonDirLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultLog for JsonDirLog {
    fn append(&self, entry: &LogEntry) -> Result<(), LogError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| LogError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let seq = LOG_SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let name = format!(
            "out_{}_{seq}.json",
            Utc::now().format("%y_%m_%d-%H_%M_%S_%3f")
        );
        let path = self.dir.join(name);
        let body = serde_json::to_vec_pretty(entry)?;
        std::fs::write(&path, body).map_err(|source| LogError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paceproof_core::InferenceRecord;

    #[test]
    fn error_sink_appends_prefixed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors/errors.txt");
        let sink = FileErrorSink::new(&path);

        sink.report(Stage::RuleCheck, "connection refused");
        sink.report(Stage::DataExtraction, "content is not valid JSON");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Rule check error: connection refused");
        assert_eq!(lines[1], "Data extraction error: content is not valid JSON");
    }

    #[test]
    fn result_log_writes_one_file_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonDirLog::new(dir.path().join("logs"));

        let entry = LogEntry {
            time: Utc::now(),
            content: InferenceRecord {
                valid_rules: true,
                distance: Some(7900.0),
                ..InferenceRecord::default()
            },
            image: Some("run.jpg".into()),
        };

        log.append(&entry).unwrap();
        log.append(&entry).unwrap();

        let files: Vec<_> = std::fs::read_dir(log.dir()).unwrap().collect();
        assert_eq!(files.len(), 2);

        let first = files[0].as_ref().unwrap().path();
        let parsed: LogEntry =
            serde_json::from_str(&std::fs::read_to_string(first).unwrap()).unwrap();
        assert_eq!(parsed.content.distance, Some(7900.0));
        assert_eq!(parsed.image.as_deref(), Some("run.jpg"));
    }
}
