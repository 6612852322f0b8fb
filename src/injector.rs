//! Structured-metadata injector
//!
//! Turns an arbitrary caller record into a tagged `<script>` block that sits
//! next to the rendered page content and is read by crawlers, not people.
//!
//! The injector is pure: the same record and content type always produce the
//! same bytes, nothing is logged or cached, and the only failure is a
//! [`SerializeError`] for records JSON cannot represent. Placing the block in
//! a document is left to the host (see [`crate::document`]).
//!
//! # Example
//!
//! ```rust
//! use jsonld_inject::injector::render_script;
//! use serde_json::json;
//!
//! let html = render_script(&json!({"name": "Verizon", "yield": 6.7}), None).unwrap();
//! assert_eq!(
//!     html,
//!     r#"<script type="application/ld+json">{"name":"Verizon","yield":6.7}</script>"#
//! );
//! ```

use crate::config::{EscapeMode, InjectorConfig};
use crate::error::{Result, SerializeError};
use crate::value::{to_metadata_value_with_depth, MetadataValue};
use serde::Serialize;
use std::fmt;
use std::io;

pub use crate::config::DEFAULT_CONTENT_TYPE;

/// One serialized structured-data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBlock {
    content_type: String,
    body: String,
}

impl ScriptBlock {
    /// Content type, exactly as supplied
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Serialized JSON body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The full `<script>` element as a string
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Emit the element at the writer's current position
    pub fn write_to<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{}", self)?;
        Ok(())
    }

    /// Parse the body back into a value
    pub fn parse_body(&self) -> Result<MetadataValue> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl fmt::Display for ScriptBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<script type=\"{}\">{}</script>",
            htmlescape::encode_minimal(&self.content_type),
            self.body
        )
    }
}

/// Structured-data injector
#[derive(Debug, Clone, Default)]
pub struct StructuredData {
    config: InjectorConfig,
}

impl StructuredData {
    /// Create an injector with the given configuration
    pub fn new(config: InjectorConfig) -> Self {
        Self { config }
    }

    /// Create an injector configured from `JSONLD_INJECT_*` environment
    /// variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(InjectorConfig::from_env()?))
    }

    /// Active configuration
    pub fn config(&self) -> &InjectorConfig {
        &self.config
    }

    /// Serialize `record` into a block tagged with `content_type`, or the
    /// configured default when `None`.
    ///
    /// # Errors
    ///
    /// Fails with [`SerializeError`] when the record holds a non-finite
    /// number, a non-string map key, or nests deeper than the configured
    /// limit (which is how self-referencing records show up). No block is
    /// produced in that case.
    pub fn block<T>(&self, record: &T, content_type: Option<&str>) -> Result<ScriptBlock>
    where
        T: Serialize + ?Sized,
    {
        let value = to_metadata_value_with_depth(record, self.config.max_depth)?;
        let body = encode_body(&value, self.config.escape, self.config.pretty)?;
        let content_type = content_type
            .unwrap_or(&self.config.default_content_type)
            .to_string();

        Ok(ScriptBlock { content_type, body })
    }

    /// Like [`block`](Self::block), returning the rendered element
    pub fn render<T>(&self, record: &T, content_type: Option<&str>) -> Result<String>
    where
        T: Serialize + ?Sized,
    {
        self.block(record, content_type).map(|block| block.render())
    }
}

/// Build a block with the default configuration
pub fn script_block<T>(record: &T, content_type: Option<&str>) -> Result<ScriptBlock>
where
    T: Serialize + ?Sized,
{
    StructuredData::default().block(record, content_type)
}

/// Render a block with the default configuration
pub fn render_script<T>(record: &T, content_type: Option<&str>) -> Result<String>
where
    T: Serialize + ?Sized,
{
    StructuredData::default().render(record, content_type)
}

/// Encode a value as JSON text for a script body
pub fn encode_body(
    value: &MetadataValue,
    escape: EscapeMode,
    pretty: bool,
) -> std::result::Result<String, SerializeError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| SerializeError::Custom(e.to_string()))?;

    Ok(match escape {
        EscapeMode::Raw => json,
        EscapeMode::ScriptSafe => script_safe(&json),
    })
}

// These characters only ever occur inside JSON strings, where a \u escape
// decodes to the same character.
fn script_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
