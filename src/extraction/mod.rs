//! Structured data extraction module
//!
//! This module reads JSON script blocks back out of rendered HTML.

pub mod json_ld;

pub use json_ld::{is_json_type, ExtractedBlock, JsonLdExtractor, JSON_LD_TYPE};
