//! Injector tests
//!
//! These tests cover block rendering from the caller's side: typed records,
//! content types, determinism, and the failure cases.

use jsonld_inject::{
    render_script, script_block, EscapeMode, Error, InjectorConfig, SerializeError,
    StructuredData,
};
use pretty_assertions::assert_eq;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StockProfile {
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "@type")]
    schema_type: &'static str,
    name: String,
    ticker_symbol: String,
    dividend_yield: f64,
    same_as: Vec<String>,
}

fn profile(dividend_yield: f64) -> StockProfile {
    StockProfile {
        context: "https://schema.org",
        schema_type: "Corporation",
        name: "Realty Income".to_string(),
        ticker_symbol: "O".to_string(),
        dividend_yield,
        same_as: vec!["https://finance.yahoo.com/quote/O".to_string()],
    }
}

/// Linked node that can point back at itself
struct Node {
    name: String,
    next: RefCell<Option<Rc<Node>>>,
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("next", &self.next.borrow().as_deref())?;
        state.end()
    }
}

#[test]
fn test_verizon_scenario() {
    let html = render_script(&json!({"name": "Verizon", "yield": 6.7}), None).unwrap();
    assert_eq!(
        html,
        r#"<script type="application/ld+json">{"name":"Verizon","yield":6.7}</script>"#
    );
}

#[test]
fn test_empty_record() {
    let block = script_block(&json!({}), None).unwrap();
    assert_eq!(block.body(), "{}");
    assert_eq!(block.content_type(), "application/ld+json");
}

#[test]
fn test_custom_content_type_verbatim() {
    let block = script_block(&json!({"a": {"b": "c"}}), Some("application/custom+json")).unwrap();
    assert_eq!(block.content_type(), "application/custom+json");
    assert_eq!(block.body(), r#"{"a":{"b":"c"}}"#);
}

#[test]
fn test_typed_record_keeps_field_order() {
    let block = script_block(&profile(5.6), None).unwrap();
    assert_eq!(
        block.body(),
        r#"{"@context":"https://schema.org","@type":"Corporation","name":"Realty Income","tickerSymbol":"O","dividendYield":5.6,"sameAs":["https://finance.yahoo.com/quote/O"]}"#
    );
}

#[test]
fn test_typed_record_round_trip() {
    let record = profile(5.6);
    let block = script_block(&record, None).unwrap();
    assert_eq!(
        block.parse_body().unwrap(),
        serde_json::to_value(&record).unwrap()
    );
}

#[test]
fn test_identical_inputs_identical_bytes() {
    let injector = StructuredData::default();
    let first = injector.render(&profile(4.2), Some("application/ld+json")).unwrap();
    let second = injector.render(&profile(4.2), Some("application/ld+json")).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn test_self_referencing_record_fails() {
    let node = Rc::new(Node {
        name: "loop".to_string(),
        next: RefCell::new(None),
    });
    *node.next.borrow_mut() = Some(Rc::clone(&node));

    let err = script_block(node.as_ref(), None).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialize(SerializeError::DepthLimitExceeded { limit: 128 })
    ));

    // Break the cycle so the test does not leak
    node.next.borrow_mut().take();
}

#[test]
fn test_finite_chain_succeeds() {
    let tail = Rc::new(Node {
        name: "tail".to_string(),
        next: RefCell::new(None),
    });
    let head = Node {
        name: "head".to_string(),
        next: RefCell::new(Some(tail)),
    };

    let block = script_block(&head, None).unwrap();
    assert_eq!(
        block.body(),
        r#"{"name":"head","next":{"name":"tail","next":null}}"#
    );
}

#[test]
fn test_non_finite_yield_fails() {
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = script_block(&profile(bad), None).unwrap_err();
        assert!(matches!(
            err,
            Error::Serialize(SerializeError::NonFiniteNumber)
        ));
    }
}

#[test]
fn test_non_string_keys_fail() {
    let mut map = HashMap::new();
    map.insert(vec![1u8], "bytes key");
    let err = script_block(&map, None).unwrap_err();
    assert!(matches!(
        err,
        Error::Serialize(SerializeError::KeyMustBeString)
    ));
}

#[test]
fn test_configured_depth_limit() {
    let config = InjectorConfig::default().with_max_depth(2).unwrap();
    let injector = StructuredData::new(config);
    assert!(injector.block(&json!({"a": {"b": 1}}), None).is_ok());
    assert!(injector.block(&json!({"a": {"b": {"c": 1}}}), None).is_err());
}

#[test]
fn test_configured_default_content_type() {
    let config = InjectorConfig::default()
        .with_default_content_type("application/json")
        .unwrap();
    let block = StructuredData::new(config).block(&json!(1), None).unwrap();
    assert_eq!(block.content_type(), "application/json");
}

#[test]
fn test_escape_modes_agree_on_plain_payloads() {
    let record = json!({"headline": "Best Dividend Stocks Under $20"});
    let raw = StructuredData::new(InjectorConfig::default().with_escape(EscapeMode::Raw))
        .render(&record, None)
        .unwrap();
    let safe = render_script(&record, None).unwrap();
    assert_eq!(raw, safe);
}
