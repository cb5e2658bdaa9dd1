//! In-process property list decoder

use super::traits::Converter;
use crate::error::{Error, Result};
use crate::types::TargetFormat;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as Json;
use std::io::Cursor;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;

/// Converter backed by the `plist` crate
///
/// Always available. Used when no external tool exists on the host, when the
/// tool fails, and to correct a tool that emitted the wrong rendering.
///
/// # Examples
///
/// ```
/// use shortcut_extract::convert::InProcessConverter;
/// use shortcut_extract::TargetFormat;
///
/// let mut dict = plist::Dictionary::new();
/// dict.insert("WFWorkflowName".to_string(), plist::Value::from("Demo"));
/// let mut payload = Vec::new();
/// plist::Value::Dictionary(dict).to_writer_binary(&mut payload).unwrap();
///
/// let json = InProcessConverter::render(&payload, TargetFormat::Json).unwrap();
/// assert!(json.contains("\"WFWorkflowName\": \"Demo\""));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessConverter;

impl InProcessConverter {
    /// Decode `payload` (binary or XML property list) and render it as `format`
    pub fn render(payload: &[u8], format: TargetFormat) -> Result<String> {
        let value = decode(payload)?;
        match format {
            TargetFormat::Json => render_json(&value),
            TargetFormat::Xml => render_xml(&value),
        }
    }
}

#[async_trait]
impl Converter for InProcessConverter {
    async fn convert(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<()> {
        let payload = tokio::fs::read(input).await?;

        // Decoding is CPU-bound; keep it off the async workers
        let rendered = tokio::task::spawn_blocking(move || Self::render(&payload, format))
            .await
            .map_err(|e| Error::Other(format!("decoder task failed: {}", e)))??;

        tokio::fs::write(output, rendered.as_bytes()).await?;
        debug!(
            output = %output.display(),
            %format,
            size = rendered.len(),
            "rendered with in-process decoder"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in-process"
    }
}

/// Decode a property list in any encoding the `plist` crate understands
pub fn decode(payload: &[u8]) -> Result<plist::Value> {
    plist::Value::from_reader(Cursor::new(payload))
        .map_err(|e| Error::Conversion(format!("failed to decode property list: {}", e)))
}

/// Pretty-printed JSON (2-space indent, non-ASCII kept literal)
pub fn render_json(value: &plist::Value) -> Result<String> {
    serde_json::to_string_pretty(&to_json(value))
        .map_err(|e| Error::Conversion(format!("failed to encode JSON: {}", e)))
}

/// XML property list document
pub fn render_xml(value: &plist::Value) -> Result<String> {
    let mut buf = Vec::new();
    value
        .to_writer_xml(&mut buf)
        .map_err(|e| Error::Conversion(format!("failed to encode XML property list: {}", e)))?;
    String::from_utf8(buf)
        .map_err(|e| Error::Conversion(format!("XML property list is not UTF-8: {}", e)))
}

/// Map a property list tree onto JSON
///
/// Dictionaries keep their key order. Dates become RFC 3339 strings, data
/// becomes base64, UIDs become integers, and non-finite reals become null.
pub fn to_json(value: &plist::Value) -> Json {
    match value {
        plist::Value::Dictionary(dict) => Json::Object(
            dict.iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
        plist::Value::Array(items) => Json::Array(items.iter().map(to_json).collect()),
        plist::Value::String(s) => Json::String(s.clone()),
        plist::Value::Boolean(b) => Json::Bool(*b),
        plist::Value::Integer(i) => match (i.as_signed(), i.as_unsigned()) {
            (Some(signed), _) => Json::from(signed),
            (None, Some(unsigned)) => Json::from(unsigned),
            (None, None) => Json::Null,
        },
        plist::Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        plist::Value::Date(date) => Json::String(rfc3339(*date)),
        plist::Value::Data(bytes) => Json::String(BASE64.encode(bytes)),
        plist::Value::Uid(uid) => Json::from(uid.get()),
        #[allow(unreachable_patterns)]
        _ => Json::Null,
    }
}

fn rfc3339(date: plist::Date) -> String {
    DateTime::<Utc>::from(SystemTime::from(date)).to_rfc3339_opts(SecondsFormat::Secs, true)
}
