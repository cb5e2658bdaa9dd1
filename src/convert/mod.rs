//! Property list conversion
//!
//! This module turns a downloaded binary property list into pretty JSON or an
//! XML property list. Conversion is layered behind the [`Converter`] trait:
//!
//! - [`ExternalToolConverter`]: runs `plutil` (macOS) or `plistutil`
//!   (elsewhere) against staged files
//! - [`InProcessConverter`]: decodes with the `plist` crate; always available
//!
//! [`FormatConverter`] chains them: tool first, output correction when the
//! tool may have ignored a JSON request, in-process fallback when the tool
//! fails.
//!
//! ## Usage
//!
//! ```no_run
//! use shortcut_extract::convert::FormatConverter;
//! use shortcut_extract::{Config, RawPayload, TargetFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = FormatConverter::from_config(&Config::default())?;
//!
//!     let payload = RawPayload::new(std::fs::read("shortcut.plist")?);
//!     let json = converter.convert(&payload, TargetFormat::Json).await?;
//!     println!("{json}");
//!
//!     Ok(())
//! }
//! ```

mod decoder;
mod format;
mod staging;
mod tool;
mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use decoder::{InProcessConverter, decode, render_json, render_xml, to_json};
pub use format::{FormatConverter, looks_like_property_list};
pub use staging::{StagedFile, StagingArea};
pub use tool::{
    ExternalToolConverter, FormatFlags, HostPlatform, ToolKind, build_args, parse_format_flags,
};
pub use traits::Converter;
