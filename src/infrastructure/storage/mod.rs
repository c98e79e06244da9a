//! Filesystem bindings: output directories, append-mode session files, and
//! the process-wide error log.

use crate::domain::error::RigResult;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Seconds since the Unix epoch, used for file names and error-log stamps
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn ensure_dir(path: &Path) -> RigResult<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn create_append_file(path: &Path) -> RigResult<File> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

/// Session file naming convention: `output_<unix_secs>.txt`
pub fn session_file_name(started_at: u64) -> String {
    format!("output_{}.txt", started_at)
}

/// Append-only, timestamped error log (`errors.txt`), opened once per
/// process and shared across sessions.
pub struct ErrorLog {
    path: PathBuf,
    file: File,
}

impl ErrorLog {
    pub fn open(dir: &Path) -> RigResult<Self> {
        ensure_dir(dir)?;
        let path = dir.join("errors.txt");
        let file = create_append_file(&path)?;
        Ok(Self { path, file })
    }

    /// Record one timestamped entry. Best-effort: a failing error log must
    /// not take down a multi-hour run, so write failures are only warned
    /// about.
    pub fn record(&mut self, message: &str) {
        let entry = format!("[{}] {}\n", unix_now(), message);
        if let Err(e) = self.file.write_all(entry.as_bytes()).and_then(|_| self.file.flush()) {
            warn!(path = %self.path.display(), "error log write failed: {}", e);
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_file_name_convention() {
        assert_eq!(session_file_name(1700000000), "output_1700000000.txt");
    }

    #[test]
    fn test_append_file_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("output_1.txt");

        let mut file = create_append_file(&path).unwrap();
        file.write_all(b"one\n").unwrap();
        drop(file);

        let mut file = create_append_file(&path).unwrap();
        file.write_all(b"two\n").unwrap();
        drop(file);

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_error_log_entries_are_timestamped() {
        let dir = TempDir::new().unwrap();
        let mut log = ErrorLog::open(dir.path()).unwrap();

        log.record("TX2 not responding");

        let content = fs::read_to_string(log.path()).unwrap();
        assert!(content.starts_with('['));
        assert!(content.contains("] TX2 not responding\n"));
    }
}
