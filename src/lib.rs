//! jsonld-inject - Structured Data Injection for Server-Rendered Pages
//!
//! This crate turns caller-supplied metadata records into
//! `<script type="application/ld+json">` blocks that sit next to the
//! human-visible page content and are read by search-engine crawlers.
//!
//! # Features
//!
//! - **Checked Serialization**: any `serde::Serialize` record becomes a
//!   JSON value, failing on `NaN`, non-string keys and runaway nesting
//! - **Injector**: pure, idempotent rendering of tagged script blocks
//! - **Host Integration**: place blocks into an HTML document without
//!   touching anything else
//! - **Extraction**: read JSON-LD blocks back out of rendered pages
//!
//! # Architecture
//!
//! ```text
//! record (T: Serialize) ──▶ value ──▶ injector ──▶ ScriptBlock
//!                                                      │
//!                                                      ▼
//!                      extraction ◀── HTML ◀──── document
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use jsonld_inject::{document, StructuredData};
//! use serde_json::json;
//!
//! # fn main() -> jsonld_inject::Result<()> {
//! let injector = StructuredData::default();
//! let block = injector.block(&json!({"@type": "Article", "headline": "Dividend Ladders"}), None)?;
//!
//! let page = "<html><head><title>Ladders</title></head><body></body></html>";
//! let html = document::insert_into_head(page, &[block])?;
//! assert!(html.contains(r#"<script type="application/ld+json">"#));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod extraction;
pub mod injector;
pub mod value;

// Re-exports for convenience
pub use config::{EscapeMode, InjectorConfig, DEFAULT_CONTENT_TYPE};
pub use document::Placement;
pub use error::{ConfigError, DocumentError, Error, Result, SerializeError};
pub use extraction::{ExtractedBlock, JsonLdExtractor};
pub use injector::{render_script, script_block, ScriptBlock, StructuredData};
pub use value::{to_metadata_value, MetadataValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
