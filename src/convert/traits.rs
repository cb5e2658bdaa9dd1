//! Converter trait

use crate::types::TargetFormat;
use async_trait::async_trait;
use std::path::Path;

/// A strategy that turns a staged binary property list into a textual rendering
///
/// Implementations read `input` and write the rendering to `output`; both
/// paths are staging files owned by the caller. Two implementations exist:
///
/// - [`ExternalToolConverter`](super::ExternalToolConverter): runs `plutil` or
///   `plistutil`, depending on the host
/// - [`InProcessConverter`](super::InProcessConverter): decodes with the
///   `plist` crate, always available
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert the property list at `input` into `format`, writing to `output`
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion could not be performed. For CLI
    /// implementations a nonzero exit status is an error.
    async fn convert(
        &self,
        input: &Path,
        output: &Path,
        format: TargetFormat,
    ) -> crate::Result<()>;

    /// Whether a successful run may still have produced a different rendering
    /// than `format`, so the output must be sniffed before it is trusted
    fn needs_output_check(&self, _format: TargetFormat) -> bool {
        false
    }

    /// Binary backing this converter, if any
    fn binary_path(&self) -> Option<&Path> {
        None
    }

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
