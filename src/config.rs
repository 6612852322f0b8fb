//! Injector configuration
//!
//! Settings can be built in code or loaded from environment variables:
//!
//! - `JSONLD_INJECT_CONTENT_TYPE`: default block content type
//!   (default: `application/ld+json`)
//! - `JSONLD_INJECT_ESCAPE`: `script-safe` (default) or `raw`
//! - `JSONLD_INJECT_MAX_DEPTH`: nesting limit for records (default: 128)
//! - `JSONLD_INJECT_PRETTY`: `true` to indent the JSON body (default: false)

use crate::error::ConfigError;
use crate::value::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Conventional structured-data MIME type
pub const DEFAULT_CONTENT_TYPE: &str = "application/ld+json";

const ENV_CONTENT_TYPE: &str = "JSONLD_INJECT_CONTENT_TYPE";
const ENV_ESCAPE: &str = "JSONLD_INJECT_ESCAPE";
const ENV_MAX_DEPTH: &str = "JSONLD_INJECT_MAX_DEPTH";
const ENV_PRETTY: &str = "JSONLD_INJECT_PRETTY";

/// How the JSON body is encoded inside the script element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EscapeMode {
    /// `<`, `>`, `&`, U+2028 and U+2029 are written as `\u` escapes, so the
    /// body can never close the surrounding element
    #[default]
    ScriptSafe,
    /// Plain JSON; the host is trusted with placement
    Raw,
}

impl fmt::Display for EscapeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeMode::ScriptSafe => f.write_str("script-safe"),
            EscapeMode::Raw => f.write_str("raw"),
        }
    }
}

impl FromStr for EscapeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "script-safe" | "script_safe" | "safe" => Ok(EscapeMode::ScriptSafe),
            "raw" => Ok(EscapeMode::Raw),
            other => Err(ConfigError::invalid(
                ENV_ESCAPE,
                other,
                "expected `script-safe` or `raw`",
            )),
        }
    }
}

/// Configuration for [`StructuredData`](crate::injector::StructuredData)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectorConfig {
    /// Content type used when the caller gives none
    pub default_content_type: String,
    /// Body encoding
    pub escape: EscapeMode,
    /// Maximum record nesting before serialization fails
    pub max_depth: usize,
    /// Indent the body with two spaces
    pub pretty: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
            escape: EscapeMode::ScriptSafe,
            max_depth: DEFAULT_MAX_DEPTH,
            pretty: false,
        }
    }
}

impl InjectorConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty content type, an
    /// unknown escape mode, a zero or non-numeric depth, or a non-boolean
    /// pretty flag.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(content_type) = lookup(ENV_CONTENT_TYPE) {
            config = config.with_default_content_type(content_type)?;
        }

        if let Some(escape) = lookup(ENV_ESCAPE) {
            config.escape = escape.parse()?;
        }

        if let Some(depth) = lookup(ENV_MAX_DEPTH) {
            let parsed = depth
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::invalid(ENV_MAX_DEPTH, depth.as_str(), e.to_string()))?;
            config = config.with_max_depth(parsed)?;
        }

        if let Some(pretty) = lookup(ENV_PRETTY) {
            config.pretty = parse_bool(ENV_PRETTY, &pretty)?;
        }

        Ok(config)
    }

    /// Set the default content type
    pub fn with_default_content_type<S: Into<String>>(
        mut self,
        content_type: S,
    ) -> Result<Self, ConfigError> {
        let content_type = content_type.into();
        if content_type.trim().is_empty() {
            return Err(ConfigError::invalid(
                ENV_CONTENT_TYPE,
                content_type,
                "content type cannot be empty",
            ));
        }
        self.default_content_type = content_type;
        Ok(self)
    }

    /// Set the escape mode
    pub fn with_escape(mut self, escape: EscapeMode) -> Self {
        self.escape = escape;
        self
    }

    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Result<Self, ConfigError> {
        if max_depth == 0 {
            return Err(ConfigError::invalid(
                ENV_MAX_DEPTH,
                "0",
                "depth limit must be positive",
            ));
        }
        self.max_depth = max_depth;
        Ok(self)
    }

    /// Enable or disable indentation
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true or false")),
    }
}
