//! Migration log
//!
//! An optional process-wide log file recording rule decisions that do not
//! show up as edits: skipped custom SDK namespaces, payloads that were never
//! re-attached, rules that hit the pass limit. Every function is a no-op
//! until [`init_logger`] has been called.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Global logger instance
static LOGGER: Mutex<Option<MigrationLogger>> = Mutex::new(None);

/// Logger writing timestamped lines to a file
pub struct MigrationLogger {
    file: File,
    path: PathBuf,
}

impl MigrationLogger {
    /// Create a new logger writing to the specified path
    pub fn new(log_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)?;

        Ok(Self {
            file,
            path: log_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a log message
    pub fn log(&mut self, message: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let _ = writeln!(self.file, "[{}] {}", timestamp, message);
        let _ = self.file.flush();
    }

    /// Log a section header
    pub fn section(&mut self, title: &str) {
        let separator = "=".repeat(60);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }

    /// Log a subsection
    pub fn subsection(&mut self, title: &str) {
        let separator = "-".repeat(40);
        self.log(&separator);
        self.log(title);
        self.log(&separator);
    }
}

/// Initialize the global logger
///
/// Without a path, logs go to a timestamped file in the system temp dir.
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = log_path.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        std::env::temp_dir().join(format!("sdkmig-{}.log", timestamp))
    });

    let logger = MigrationLogger::new(&path)?;

    if let Ok(mut guard) = LOGGER.lock() {
        *guard = Some(logger);
    }

    Ok(path)
}

/// Log a message to the global logger
pub fn log(message: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.log(message);
        }
    }
}

/// Log a section header
pub fn section(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.section(title);
        }
    }
}

/// Log a subsection
pub fn subsection(title: &str) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(ref mut logger) = *guard {
            logger.subsection(title);
        }
    }
}

/// Check if logging is enabled
pub fn is_enabled() -> bool {
    if let Ok(guard) = LOGGER.lock() {
        guard.is_some()
    } else {
        false
    }
}

/// Log the start of a migration run
pub fn log_run_start(files_count: usize, rules: &[String]) {
    section("MIGRATION START");
    log(&format!("Files to process: {}", files_count));
    log(&format!("Enabled rules: {}", rules.join(", ")));
}

/// Log the rules that changed a file
pub fn log_file_result(path: &Path, applied: &[(String, usize)]) {
    subsection(&path.display().to_string());
    if applied.is_empty() {
        log("No changes");
    }
    for (rule, count) in applied {
        log(&format!("{}: {} edit(s)", rule, count));
    }
}

/// Log a file that could not be migrated
pub fn log_file_error(path: &Path, error: &str) {
    subsection(&path.display().to_string());
    log(&format!("FAILED: {}", error));
}

/// Log the end of a migration run
pub fn log_run_complete(changed: usize, errors: usize) {
    section("MIGRATION COMPLETE");
    log(&format!("Files changed: {}", changed));
    log(&format!("Files with errors: {}", errors));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logger_writes_timestamped_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("migration.log");

        let mut logger = MigrationLogger::new(&path).unwrap();
        logger.section("MIGRATION START");
        logger.log("Skipping custom SDK type com.amazonaws.services.dynamodbv2.datamodeling.DynamoDBMapper");

        let contents = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with('['));
        assert!(lines[1].ends_with("MIGRATION START"));
        assert!(lines[3].contains("DynamoDBMapper"));
    }
}
