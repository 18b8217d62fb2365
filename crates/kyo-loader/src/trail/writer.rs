//! JSONL trail writer.
//!
//! Appends each event with `serde_jsonlines::append_json_lines`, so a crash
//! mid-load leaves every line written so far intact.

use std::path::{Path, PathBuf};

use kyo_core::entities::LoadEvent;

use crate::error::LoadError;
use crate::sink::EventSink;

/// Event sink that appends to a JSONL file.
#[derive(Debug)]
pub struct TrailWriter {
    path: PathBuf,
    failed: bool,
}

impl TrailWriter {
    /// Create (or truncate) the trail at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Trail`] if the file cannot be created.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let trail_error = |e: std::io::Error| LoadError::Trail {
            path: path.clone(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(trail_error)?;
        }
        std::fs::File::create(&path).map_err(trail_error)?;
        Ok(Self {
            path,
            failed: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an append failed and the writer stopped.
    #[must_use]
    pub const fn has_failed(&self) -> bool {
        self.failed
    }
}

impl EventSink for TrailWriter {
    fn accept(&mut self, event: &LoadEvent) {
        if self.failed {
            return;
        }
        if let Err(error) = serde_jsonlines::append_json_lines(&self.path, [event]) {
            tracing::warn!(
                trail = %self.path.display(),
                seq = event.sequence_number,
                %error,
                "trail append failed; further events are not written"
            );
            self.failed = true;
        }
    }

    fn finish(&mut self) {
        tracing::debug!(trail = %self.path.display(), failed = self.failed, "trail closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyo_core::entities::PendingEvent;
    use kyo_core::enums::LoadEventType;

    #[test]
    fn create_truncates_and_appends_lines() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/trail.jsonl");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale\n").unwrap();

        let mut writer = TrailWriter::create(&path).unwrap();
        writer.accept(&PendingEvent::new(LoadEventType::StartedWalk, "/p").stamp(0));
        writer.accept(&PendingEvent::new(LoadEventType::FinishedWalk, "/p").stamp(1));

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("{\"event_type\":\"started_walk\""));
        assert!(!writer.has_failed());
    }
}
