//! Scoped staging files for converter input and output

use crate::error::{Error, Result};
use crate::types::TargetFormat;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::debug;

/// Directory in which per-request staging files are created
///
/// Every file gets a unique random name, so concurrent requests never
/// collide. Files are handed out as [`StagedFile`] guards.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Use `dir` as the scratch location, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| Error::Config {
            message: format!("failed to create scratch dir '{}': {}", dir.display(), e),
            key: Some("scratch_dir".to_string()),
        })?;
        Ok(Self { dir })
    }

    /// Scratch directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the payload to a fresh `payload-*.plist` file
    pub async fn stage_payload(&self, payload: &[u8]) -> Result<StagedFile> {
        let file = self.reserve("payload-", ".plist")?;
        tokio::fs::write(file.path(), payload).await?;
        debug!(path = %file.path().display(), size = payload.len(), "payload staged");
        Ok(file)
    }

    /// Reserve an empty `converted-*.{ext}` file for converter output
    pub fn reserve_output(&self, format: TargetFormat) -> Result<StagedFile> {
        self.reserve("converted-", &format!(".{}", format.extension()))
    }

    fn reserve(&self, prefix: &str, suffix: &str) -> Result<StagedFile> {
        let path = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(&self.dir)?
            .into_temp_path();
        Ok(StagedFile { path })
    }
}

/// A staging file that is removed when dropped
///
/// The handle is closed as soon as the file is reserved, so an external tool
/// can open and replace it. Removal happens on every exit path, including
/// early returns and panics.
#[derive(Debug)]
pub struct StagedFile {
    path: TempPath,
}

impl StagedFile {
    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
