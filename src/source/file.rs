//! Saved `/debug/vars` documents on disk.
//!
//! Something like `curl -o vars.json http://host:8081/debug/vars` on a
//! schedule keeps the file current; [`FileSource`] picks up each rewrite and
//! decodes it exactly like a fetched body.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::warn;

use super::{DataSource, Snapshot};
use crate::error::DashError;

/// Reads a captured metrics document, re-reading it when its mtime moves.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<DashError>,
    loaded_at: Option<SystemTime>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            loaded_at: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and decode the document.
    ///
    /// An unreadable file is [`DashError::Transport`]; a body that is not a
    /// JSON object is [`DashError::Decode`], as for an HTTP response.
    pub fn load(&self) -> Result<Snapshot, DashError> {
        let body = fs::read(&self.path).map_err(|err| {
            DashError::Transport(format!("cannot read {}: {}", self.path.display(), err))
        })?;
        Snapshot::from_slice(&body)
    }

    fn record_error(&mut self, err: DashError) {
        // polled every frame; only log when the failure changes
        if self.last_error.as_ref() != Some(&err) {
            warn!(path = %self.path.display(), error = %err, "cannot load snapshot file");
        }
        self.last_error = Some(err);
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Snapshot> {
        let modified = self.modified();
        // Unchanged or vanished since the last good read
        if self.loaded_at.is_some() && modified <= self.loaded_at {
            return None;
        }

        match self.load() {
            Ok(snapshot) => {
                self.last_error = None;
                self.loaded_at = modified;
                Some(snapshot)
            }
            Err(err) => {
                self.record_error(err);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.as_ref().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn vars_file(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", body).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn describes_its_path() {
        let source = FileSource::new("/tmp/vars.json");
        assert_eq!(source.path(), Path::new("/tmp/vars.json"));
        assert_eq!(source.description(), "file: /tmp/vars.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn reads_once_until_the_file_changes() {
        let file = vars_file(r#"{"gateway.create.total": 12, "device.create.total": 1}"#);
        let mut source = FileSource::new(file.path());

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.total("gateway.create"), Some(12));
        assert!(source.poll().is_none());

        fs::write(file.path(), r#"{"gateway.create.total": 13}"#).unwrap();
        let later = SystemTime::now() + Duration::from_secs(10);
        file.as_file().set_modified(later).unwrap();

        let snapshot = source.poll().unwrap();
        assert_eq!(snapshot.total("gateway.create"), Some(13));
        assert_eq!(snapshot.len(), 1);
        assert!(source.poll().is_none());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let mut source = FileSource::new("/nonexistent/path/vars.json");

        assert!(source.poll().is_none());
        let err = source.error().unwrap();
        assert!(err.contains("cannot read /nonexistent/path/vars.json"), "{err}");
    }

    #[test]
    fn non_object_file_fails_like_a_fetched_body() {
        let file = vars_file("[1,2]");
        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(matches!(source.load(), Err(DashError::Decode(_))));
        let expected = Snapshot::from_slice(b"[1,2]").unwrap_err().to_string();
        assert_eq!(source.error(), Some(expected));
    }

    #[test]
    fn garbage_is_a_decode_error_and_recovers() {
        let file = vars_file("not valid json");
        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        assert!(source.error().unwrap().starts_with("failed to decode response"));

        // a failed read is retried on the next poll
        fs::write(file.path(), "{}").unwrap();
        assert!(source.poll().unwrap().is_empty());
        assert!(source.error().is_none());
    }
}
