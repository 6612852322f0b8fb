//! Host document integration
//!
//! The injector only produces strings. This module is the thin host layer
//! that places rendered blocks into an existing HTML document, either just
//! before `</head>` or in place of a placeholder marker. Every byte outside
//! the inserted blocks is left as it was.

use crate::error::{DocumentError, Result};
use crate::injector::ScriptBlock;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, instrument};

/// Placeholder commonly left in templates for structured data
pub const DEFAULT_MARKER: &str = "<!-- structured-data -->";

// Comments and raw-text elements are matched whole so a closing tag inside
// them is skipped. Only group 1 is a real insertion point.
const SKIPPED: &str = r"<!--.*?-->|<script\b.*?</script\s*>|<style\b.*?</style\s*>|<textarea\b.*?</textarea\s*>|<title\b.*?</title\s*>";

static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is){}|(</head\s*>)", SKIPPED)).expect("static regex")
});
static BODY_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is){}|(</body\s*>)", SKIPPED)).expect("static regex")
});

/// Where blocks go in the host document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
    /// Before `</head>`, or `</body>` for documents without a head
    #[default]
    Head,
    /// In place of the first occurrence of a marker string
    Marker(String),
}

/// Place `blocks` into `html` according to `placement`
pub fn inject(html: &str, blocks: &[ScriptBlock], placement: &Placement) -> Result<String> {
    match placement {
        Placement::Head => insert_into_head(html, blocks),
        Placement::Marker(marker) => insert_at_marker(html, marker, blocks),
    }
}

/// Insert the rendered blocks immediately before the first `</head>`
/// (case-insensitive), falling back to `</body>`.
///
/// # Errors
///
/// [`DocumentError::NoInsertionPoint`] when the document has neither tag.
#[instrument(skip_all, fields(blocks = blocks.len()))]
pub fn insert_into_head(html: &str, blocks: &[ScriptBlock]) -> Result<String> {
    let position = closing_tag(&HEAD_CLOSE, html)
        .or_else(|| closing_tag(&BODY_CLOSE, html))
        .ok_or(DocumentError::NoInsertionPoint)?;

    debug!("Inserting structured data at byte {}", position);
    Ok(splice(html, position, position, blocks))
}

/// Replace the first occurrence of `marker` with the rendered blocks.
///
/// # Errors
///
/// [`DocumentError::EmptyMarker`] for an empty marker,
/// [`DocumentError::MarkerNotFound`] when the marker does not occur.
#[instrument(skip(html, blocks), fields(blocks = blocks.len()))]
pub fn insert_at_marker(html: &str, marker: &str, blocks: &[ScriptBlock]) -> Result<String> {
    if marker.is_empty() {
        return Err(DocumentError::EmptyMarker.into());
    }
    let start = html
        .find(marker)
        .ok_or_else(|| DocumentError::MarkerNotFound(marker.to_string()))?;

    debug!("Replacing marker at byte {}", start);
    Ok(splice(html, start, start + marker.len(), blocks))
}

/// Render blocks one per line, in order
pub fn render_blocks(blocks: &[ScriptBlock]) -> String {
    blocks
        .iter()
        .map(ScriptBlock::render)
        .collect::<Vec<_>>()
        .join("\n")
}

fn closing_tag(re: &Regex, html: &str) -> Option<usize> {
    re.captures_iter(html)
        .find_map(|caps| caps.get(1))
        .map(|m| m.start())
}

fn splice(html: &str, start: usize, end: usize, blocks: &[ScriptBlock]) -> String {
    let rendered = render_blocks(blocks);
    let mut out = String::with_capacity(html.len() - (end - start) + rendered.len());
    out.push_str(&html[..start]);
    out.push_str(&rendered);
    out.push_str(&html[end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extraction::JsonLdExtractor;
    use crate::injector::script_block;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const PAGE: &str = "<html><head><title>Dividend Aristocrats</title></head><body><h1>Aristocrats</h1></body></html>";

    fn block() -> ScriptBlock {
        script_block(&json!({"@type": "WebPage"}), None).unwrap()
    }

    #[test]
    fn test_insert_into_head() {
        let out = insert_into_head(PAGE, &[block()]).unwrap();
        assert_eq!(
            out,
            "<html><head><title>Dividend Aristocrats</title>\
             <script type=\"application/ld+json\">{\"@type\":\"WebPage\"}</script>\
             </head><body><h1>Aristocrats</h1></body></html>"
        );
    }

    #[test]
    fn test_rest_of_document_unchanged() {
        let rendered = block().render();
        let out = insert_into_head(PAGE, &[block()]).unwrap();
        assert_eq!(out.replacen(&rendered, "", 1), PAGE);
    }

    #[test]
    fn test_case_insensitive_head() {
        let out = insert_into_head("<HEAD></HEAD >", &[block()]).unwrap();
        assert!(out.starts_with("<HEAD><script"));
        assert!(out.ends_with("</script></HEAD >"));
    }

    #[test]
    fn test_falls_back_to_body() {
        let out = insert_into_head("<body><p>Yield</p></body>", &[block()]).unwrap();
        assert!(out.starts_with("<body><p>Yield</p><script"));
    }

    #[test]
    fn test_no_insertion_point() {
        let err = insert_into_head("<p>fragment</p>", &[block()]).unwrap_err();
        assert!(matches!(
            err,
            Error::Document(DocumentError::NoInsertionPoint)
        ));
    }

    #[test]
    fn test_marker_replaced() {
        let html = format!("<main>{}<p>Body</p></main>", DEFAULT_MARKER);
        let out = insert_at_marker(&html, DEFAULT_MARKER, &[block()]).unwrap();
        assert_eq!(
            out,
            format!("<main>{}<p>Body</p></main>", block().render())
        );
    }

    #[test]
    fn test_marker_missing() {
        let err = inject(
            "<p>none</p>",
            &[block()],
            &Placement::Marker("<!-- ld -->".to_string()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("<!-- ld -->"));
    }

    #[test]
    fn test_blocks_keep_order() {
        let first = script_block(&json!({"n": 1}), None).unwrap();
        let second = script_block(&json!({"n": 2}), None).unwrap();
        let rendered = render_blocks(&[first.clone(), second.clone()]);
        assert_eq!(rendered, format!("{}\n{}", first, second));
    }

    #[test]
    fn test_skips_head_close_in_inline_script() {
        let page = r#"<head><script>var tpl = "</head>";</script><title>T</title></head><body></body>"#;
        let out = insert_into_head(page, &[block()]).unwrap();
        assert_eq!(
            out,
            format!(
                r#"<head><script>var tpl = "</head>";</script><title>T</title>{}</head><body></body>"#,
                block()
            )
        );
        assert_eq!(
            JsonLdExtractor::extract_json_ld(&out),
            vec![json!({"@type": "WebPage"})]
        );
    }

    #[test]
    fn test_skips_head_close_in_comment() {
        let page = "<head><!-- legacy </head> --><title>T</title></head><body></body>";
        let out = insert_into_head(page, &[block()]).unwrap();
        assert!(out.starts_with("<head><!-- legacy </head> --><title>T</title><script"));
        assert_eq!(JsonLdExtractor::extract_json_ld(&out).len(), 1);
    }

    #[test]
    fn test_skips_body_close_in_style_and_comment() {
        let page = "<body><style>/* </body> */</style><!-- </BODY> --><p>x</p></body>";
        let out = insert_into_head(page, &[block()]).unwrap();
        assert_eq!(out.replacen(&block().render(), "", 1), page);
        assert!(out.ends_with("<p>x</p><script type=\"application/ld+json\">{\"@type\":\"WebPage\"}</script></body>"));
    }

    #[test]
    fn test_only_hidden_head_close_is_no_insertion_point() {
        let err = insert_into_head("<!-- </head> --><p>fragment</p>", &[block()]).unwrap_err();
        assert!(matches!(
            err,
            Error::Document(DocumentError::NoInsertionPoint)
        ));
    }

    #[test]
    fn test_empty_marker_rejected() {
        let page = "<!DOCTYPE html><html><head></head></html>";
        let err = insert_at_marker(page, "", &[block()]).unwrap_err();
        assert!(matches!(err, Error::Document(DocumentError::EmptyMarker)));
    }

    #[test]
    fn test_no_blocks_is_identity() {
        assert_eq!(insert_into_head(PAGE, &[]).unwrap(), PAGE);
    }
}
