//! JSON-LD block extraction
//!
//! Reads structured-data blocks back out of an HTML document. The CLI uses
//! this to check rendered pages, and tests use it to confirm that an
//! injected document yields the records that went in.

use crate::value::MetadataValue;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script[type]").expect("static selector"));

/// Content type of JSON-LD blocks
pub const JSON_LD_TYPE: &str = "application/ld+json";

/// A JSON script block found in a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedBlock {
    /// Position among the JSON blocks of the document, in document order
    pub index: usize,
    /// Value of the `type` attribute, entity-decoded
    pub content_type: String,
    /// Raw text of the element
    pub body: String,
    /// Parsed body, if it is valid JSON
    pub value: Option<MetadataValue>,
    /// Parse error message, if it is not
    pub error: Option<String>,
}

impl ExtractedBlock {
    /// Whether the block is tagged `application/ld+json`
    pub fn is_json_ld(&self) -> bool {
        media_type(&self.content_type) == JSON_LD_TYPE
    }
}

/// JSON-LD extraction functionality
pub struct JsonLdExtractor;

impl JsonLdExtractor {
    /// Every script block with a JSON content type, in document order
    #[instrument(skip(html), fields(len = html.len()))]
    pub fn extract_blocks(html: &str) -> Vec<ExtractedBlock> {
        let document = Html::parse_document(html);

        let blocks: Vec<ExtractedBlock> = document
            .select(&SCRIPT_SELECTOR)
            .filter_map(|element| {
                let content_type = element.value().attr("type")?;
                is_json_type(content_type).then(|| (content_type.to_string(), element))
            })
            .enumerate()
            .map(|(index, (content_type, element))| {
                let body: String = element.text().collect();
                let (value, error) = match serde_json::from_str::<MetadataValue>(body.trim()) {
                    Ok(value) => (Some(value), None),
                    Err(e) => (None, Some(e.to_string())),
                };
                ExtractedBlock {
                    index,
                    content_type,
                    body,
                    value,
                    error,
                }
            })
            .collect();

        debug!("Found {} JSON script blocks", blocks.len());
        blocks
    }

    /// Parsed values of all `application/ld+json` blocks.
    ///
    /// A block holding a top-level array contributes its elements. Blocks
    /// that fail to parse are skipped.
    #[instrument(skip(html), fields(len = html.len()))]
    pub fn extract_json_ld(html: &str) -> Vec<MetadataValue> {
        let mut values = Vec::new();

        for block in Self::extract_blocks(html) {
            if !block.is_json_ld() {
                continue;
            }
            match block.value {
                Some(MetadataValue::Array(items)) => values.extend(items),
                Some(value) => values.push(value),
                None => warn!(
                    "Skipping unparseable JSON-LD block {}: {}",
                    block.index,
                    block.error.as_deref().unwrap_or("unknown error")
                ),
            }
        }

        info!("Extracted {} JSON-LD values", values.len());
        values
    }

    /// Schema.org `@type` names declared by top-level objects, including
    /// members of an `@graph`
    pub fn schema_types(values: &[MetadataValue]) -> Vec<String> {
        let mut types = Vec::new();
        for value in values {
            collect_types(value, &mut types);
            if let Some(graph) = value.get("@graph").and_then(|g| g.as_array()) {
                for node in graph {
                    collect_types(node, &mut types);
                }
            }
        }
        types
    }
}

fn collect_types(value: &MetadataValue, types: &mut Vec<String>) {
    match value.get("@type") {
        Some(MetadataValue::String(name)) => types.push(name.clone()),
        Some(MetadataValue::Array(names)) => {
            types.extend(names.iter().filter_map(|n| n.as_str().map(String::from)))
        }
        _ => {}
    }
}

/// Media type without parameters, lowercased
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase()
}

/// `application/json`, `application/ld+json`, or any `+json` type
pub fn is_json_type(content_type: &str) -> bool {
    let media = media_type(content_type);
    media == "application/json" || media.ends_with("+json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PAGE: &str = r#"<html><head>
<script type="application/ld+json">{"@context":"https://schema.org","@type":"Article","headline":"Is Pepsi a Good Dividend Stock?"}</script>
<script type="text/javascript">var x = 1;</script>
<script type="application/ld+json">[{"@type":"BreadcrumbList"},{"@type":["FAQPage","WebPage"]}]</script>
<script type="application/custom+json">{"a":{"b":"c"}}</script>
<script type="application/ld+json">{not json</script>
</head><body></body></html>"#;

    #[test]
    fn test_is_json_type() {
        assert!(is_json_type("application/ld+json"));
        assert!(is_json_type("Application/JSON; charset=utf-8"));
        assert!(is_json_type("application/custom+json"));
        assert!(!is_json_type("text/javascript"));
    }

    #[test]
    fn test_extract_blocks() {
        let blocks = JsonLdExtractor::extract_blocks(PAGE);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[2].content_type, "application/custom+json");
        assert_eq!(blocks[2].value, Some(json!({"a": {"b": "c"}})));
        assert!(!blocks[2].is_json_ld());
        assert!(blocks[3].value.is_none());
        assert!(blocks[3].error.is_some());
    }

    #[test]
    fn test_extract_json_ld_flattens_arrays() {
        let values = JsonLdExtractor::extract_json_ld(PAGE);
        assert_eq!(values.len(), 3);
        assert_eq!(values[0]["headline"], "Is Pepsi a Good Dividend Stock?");
    }

    #[test]
    fn test_schema_types() {
        let values = JsonLdExtractor::extract_json_ld(PAGE);
        assert_eq!(
            JsonLdExtractor::schema_types(&values),
            vec!["Article", "BreadcrumbList", "FAQPage", "WebPage"]
        );
    }

    #[test]
    fn test_schema_types_in_graph() {
        let values = vec![json!({"@graph": [{"@type": "Organization"}, {"@type": "WebSite"}]})];
        assert_eq!(
            JsonLdExtractor::schema_types(&values),
            vec!["Organization", "WebSite"]
        );
    }

    #[test]
    fn test_no_blocks() {
        assert!(JsonLdExtractor::extract_blocks("<p>plain</p>").is_empty());
    }
}
