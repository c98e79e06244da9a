use crate::domain::error::RigResult;
use crate::infrastructure::storage;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// One run between a successful connect and the next disconnect/failure.
///
/// Owns the session's output files: the data log for the monitored
/// device's protocol output, and an optional kernel log for the power
/// controller's diagnostic channel. Both use the session start time for
/// their names and are closed when the session is dropped.
pub struct Session {
    started_at: u64,
    data_path: PathBuf,
    data_log: File,
    kernel_log: Option<File>,
}

impl Session {
    pub fn open(output_dir: &Path, capture_diagnostics: bool) -> RigResult<Self> {
        storage::ensure_dir(output_dir)?;

        let started_at = storage::unix_now();
        let data_path = output_dir.join(storage::session_file_name(started_at));
        let data_log = storage::create_append_file(&data_path)?;

        let kernel_log = if capture_diagnostics {
            let kernel_dir = output_dir.join("kernel_log");
            storage::ensure_dir(&kernel_dir)?;
            let path = kernel_dir.join(storage::session_file_name(started_at));
            Some(storage::create_append_file(&path)?)
        } else {
            None
        };

        info!(path = %data_path.display(), "session opened");
        Ok(Self {
            started_at,
            data_path,
            data_log,
            kernel_log,
        })
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Append one observed protocol line, verbatim plus newline. Flushed
    /// per line; a session may end at any instant.
    pub fn record(&mut self, line: &str) -> RigResult<()> {
        self.data_log.write_all(line.as_bytes())?;
        self.data_log.write_all(b"\n")?;
        self.data_log.flush()?;
        Ok(())
    }

    pub fn captures_diagnostics(&self) -> bool {
        self.kernel_log.is_some()
    }

    /// Append one diagnostic-channel line to the kernel log, if configured
    pub fn record_kernel(&mut self, line: &str) -> RigResult<()> {
        if let Some(file) = self.kernel_log.as_mut() {
            file.write_all(line.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_session_records_lines_verbatim() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(dir.path(), false).unwrap();

        session.record("hello").unwrap();
        session.record("boot: ok").unwrap();

        let content = fs::read_to_string(session.data_path()).unwrap();
        assert_eq!(content, "hello\nboot: ok\n");
        assert!(!session.captures_diagnostics());
    }

    #[test]
    fn test_kernel_log_is_separate() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(dir.path(), true).unwrap();
        assert!(session.captures_diagnostics());

        session.record("payload").unwrap();
        session.record_kernel("kernel: oops").unwrap();

        let kernel_path = dir
            .path()
            .join("kernel_log")
            .join(storage::session_file_name(session.started_at()));
        assert_eq!(fs::read_to_string(kernel_path).unwrap(), "kernel: oops\n");
        assert_eq!(
            fs::read_to_string(session.data_path()).unwrap(),
            "payload\n"
        );
    }

    #[test]
    fn test_record_kernel_without_log_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::open(dir.path(), false).unwrap();
        session.record_kernel("dropped").unwrap();
        assert!(!dir.path().join("kernel_log").exists());
    }
}
