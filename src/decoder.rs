//! Decoding of YAML documents into [`GenericValue`] trees.
//!
//! The tree is built straight from parser events. Scalars are typed from
//! their raw text, map keys are sanitized and the first definition of a key
//! within a map is kept. A decoded tree can be projected onto a typed record
//! with [`retarget`].

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::error::Result;
use crate::model::{Diagnostic, Reporter};
use crate::value::{coerce_scalar, sanitize_identifier, GenericValue, Scalar};

/// Turns YAML text into generic value trees.
pub struct Decoder<'a> {
    /// Names the document in duplicate-key diagnostics.
    source: String,
    reporter: &'a dyn Reporter,
}

impl<'a> Decoder<'a> {
    pub fn new<S: Into<String>>(source: S, reporter: &'a dyn Reporter) -> Self {
        Self { source: source.into(), reporter }
    }

    /// Parses the first YAML document in `text` and decodes it.
    ///
    /// Scalars are typed from their text as written, so YAML's own number
    /// and boolean rules never apply. Empty input, or a document that is a
    /// lone null, decodes to an empty map.
    ///
    /// # Errors
    /// * `Error::YamlError` if the text is not valid YAML
    pub fn decode_str(&self, text: &str) -> Result<GenericValue> {
        debug!("Decoding document '{}'", self.source);
        let mut builder = TreeBuilder::new(self);
        Parser::new_from_str(text).load(&mut builder, false)?;

        Ok(match builder.root {
            None => GenericValue::default(),
            Some(GenericValue::Scalar(Scalar::String(s))) if s.is_empty() => GenericValue::default(),
            Some(root) => root,
        })
    }

    fn report_duplicate(&self, key: String) {
        self.reporter
            .report(Diagnostic::DuplicateKey { source: format!("file '{}'", self.source), key });
    }
}

// Key half of a mapping entry, waiting for its value.
enum PendingKey {
    Text(String),
    NonScalar,
}

enum Frame {
    Sequence { anchor: usize, items: Vec<GenericValue> },
    Mapping { anchor: usize, map: IndexMap<String, GenericValue>, pending: Option<PendingKey> },
}

/// Builds a [`GenericValue`] tree from parser events.
struct TreeBuilder<'d, 'a> {
    decoder: &'d Decoder<'a>,
    stack: Vec<Frame>,
    /// Completed anchored nodes, with the raw text of anchored scalars.
    anchors: HashMap<usize, (GenericValue, Option<String>)>,
    root: Option<GenericValue>,
}

impl<'d, 'a> TreeBuilder<'d, 'a> {
    fn new(decoder: &'d Decoder<'a>) -> Self {
        Self { decoder, stack: Vec::new(), anchors: HashMap::new(), root: None }
    }

    fn complete(&mut self, anchor: usize, value: GenericValue, raw: Option<String>) {
        if anchor > 0 {
            self.anchors.insert(anchor, (value.clone(), raw.clone()));
        }
        self.push(value, raw);
    }

    // `raw` is the text of a scalar node; collections have none.
    fn push(&mut self, value: GenericValue, raw: Option<String>) {
        match self.stack.last_mut() {
            None => {
                if self.root.is_none() {
                    self.root = Some(value);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(value),
            Some(Frame::Mapping { map, pending, .. }) => match pending.take() {
                None => *pending = Some(raw.map_or(PendingKey::NonScalar, PendingKey::Text)),
                Some(PendingKey::NonScalar) => {
                    warn!("Skipping non-scalar key in '{}'", self.decoder.source);
                }
                Some(PendingKey::Text(raw_key)) => {
                    let key = sanitize_identifier(&raw_key);
                    if map.contains_key(&key) {
                        self.decoder.report_duplicate(key);
                    } else {
                        map.insert(key, value);
                    }
                }
            },
        }
    }
}

impl MarkedEventReceiver for TreeBuilder<'_, '_> {
    fn on_event(&mut self, ev: Event, _mark: Marker) {
        match ev {
            Event::Scalar(text, style, anchor, _tag) => {
                let text = if matches!(style, TScalarStyle::Plain) && is_null(&text) {
                    String::new()
                } else {
                    text
                };
                let value = GenericValue::Scalar(coerce_scalar(&text));
                self.complete(anchor, value, Some(text));
            }
            Event::SequenceStart(anchor, _tag) => {
                self.stack.push(Frame::Sequence { anchor, items: Vec::new() });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { anchor, items }) = self.stack.pop() {
                    self.complete(anchor, GenericValue::Sequence(items), None);
                }
            }
            Event::MappingStart(anchor, _tag) => {
                self.stack.push(Frame::Mapping { anchor, map: IndexMap::new(), pending: None });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping { anchor, map, .. }) = self.stack.pop() {
                    self.complete(anchor, GenericValue::Map(map), None);
                }
            }
            Event::Alias(anchor) => {
                let (value, raw) = self
                    .anchors
                    .get(&anchor)
                    .cloned()
                    .unwrap_or_else(|| (GenericValue::from(""), None));
                self.push(value, raw);
            }
            _ => {}
        }
    }
}

// Plain scalars YAML reads as null.
fn is_null(text: &str) -> bool {
    matches!(text, "" | "~" | "null" | "Null" | "NULL")
}

/// Projects a generic value tree onto a typed record.
///
/// The tree goes through `serde_json::Value` first. Fields the tree lacks keep
/// the target's serde defaults and fields the target lacks are ignored.
///
/// # Errors
/// * `Error::DecodeError` on a type mismatch
pub fn retarget<T: DeserializeOwned>(value: &GenericValue) -> Result<T> {
    let neutral = serde_json::to_value(value)?;
    Ok(serde_json::from_value(neutral)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    use crate::error::Error;
    use crate::model::tests::RecordingReporter;

    const INVOICE: &str = r#"---
receipt:    Oz-Ware Purchase Invoice
date:        2007-08-06
customer:
    given:   Dorothy
    family:  Gale
list:
  - item1
  - item2
items:
    - part_no:   A4786
      descrip:   Water Bucket (Filled)
      price:     1.47
      quantity:  4
    - part_no:   E1628
      descrip:   High Heeled "Ruby" Slippers
      price:     100.27
      quantity:  1
bill-to:  &id001
    street: |
            123 Tornado Alley
            Suite 16
    city:   East Westville
    state:  KS
ship-to:  *id001
specialDelivery:  >
    Follow the Yellow Brick
    Road to the Emerald City.
...
"#;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Customer {
        given: String,
        family: String,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Item {
        part_no: String,
        descrip: String,
        price: f64,
        quantity: i32,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Invoice {
        receipt: String,
        customer: Customer,
        items: Vec<Item>,
        send_to: Option<String>,
    }

    fn decode(text: &str) -> (GenericValue, RecordingReporter) {
        let reporter = RecordingReporter::default();
        let value = Decoder::new("test.yaml", &reporter).decode_str(text).unwrap();
        (value, reporter)
    }

    #[test]
    fn test_decode_invoice() {
        let (value, reporter) = decode(INVOICE);
        let map = value.as_map().unwrap();

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "receipt",
                "date",
                "customer",
                "list",
                "items",
                "bill_to",
                "ship_to",
                "specialDelivery"
            ]
        );
        assert_eq!(map["date"], GenericValue::from("2007-08-06"));
        assert_eq!(map["bill_to"], map["ship_to"]);

        let GenericValue::Sequence(items) = &map["items"] else {
            panic!("Expected a sequence of items");
        };
        let first = items[0].as_map().unwrap();
        assert_eq!(first["price"], GenericValue::Scalar(Scalar::Decimal(1.47)));
        assert_eq!(first["quantity"], GenericValue::Scalar(Scalar::Integer(4)));
        assert!(reporter.diagnostics.borrow().is_empty());
    }

    #[test]
    fn test_decode_is_deterministic() {
        let (first, _) = decode(INVOICE);
        let (second, _) = decode(INVOICE);
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_sanitized_key_keeps_first() {
        let (value, reporter) = decode("bill-to: 1\nbill_to: 2\n");
        let map = value.as_map().unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["bill_to"], GenericValue::Scalar(Scalar::Integer(1)));
        assert_eq!(
            *reporter.diagnostics.borrow(),
            vec![Diagnostic::DuplicateKey {
                source: "file 'test.yaml'".to_string(),
                key: "bill_to".to_string()
            }]
        );
    }

    #[test]
    fn test_repeated_key_keeps_first() {
        let (value, reporter) = decode("x: 1\nx: 2\ny: 3\n");
        let map = value.as_map().unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["x"], GenericValue::Scalar(Scalar::Integer(1)));
        assert_eq!(
            *reporter.diagnostics.borrow(),
            vec![Diagnostic::DuplicateKey {
                source: "file 'test.yaml'".to_string(),
                key: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_yaml_number_forms_stay_strings() {
        let (value, _) = decode("a: 1e5\nb: 0x1F\nc: 9.90\nd: \"1e5\"\ne: .inf\nf: yes\n");
        let map = value.as_map().unwrap();

        assert_eq!(map["a"], GenericValue::from("1e5"));
        assert_eq!(map["b"], GenericValue::from("0x1F"));
        assert_eq!(map["c"], GenericValue::Scalar(Scalar::Decimal(9.9)));
        assert_eq!(map["d"], GenericValue::from("1e5"));
        assert_eq!(map["e"], GenericValue::from(".inf"));
        assert_eq!(map["f"], GenericValue::from("yes"));
    }

    #[test]
    fn test_null_forms_read_as_empty() {
        let (value, _) = decode("a:\nb: ~\nc: null\nd: 'null'\n");
        let map = value.as_map().unwrap();

        assert_eq!(map["a"], GenericValue::from(""));
        assert_eq!(map["b"], GenericValue::from(""));
        assert_eq!(map["c"], GenericValue::from(""));
        assert_eq!(map["d"], GenericValue::from("null"));
    }

    #[test]
    fn test_later_documents_are_ignored() {
        let (value, _) = decode("a: 1\n---\nb: 2\n");
        assert_eq!(value.as_map().unwrap().keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_non_scalar_key_is_skipped() {
        let (value, reporter) = decode("? [a, b]\n: 1\nc: 2\n");
        let map = value.as_map().unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map["c"], GenericValue::Scalar(Scalar::Integer(2)));
        assert!(reporter.diagnostics.borrow().is_empty());
    }

    #[test]
    fn test_quoted_scalars_are_coerced_from_text() {
        let (value, _) = decode("a: \"42\"\nb: 'True'\nc:\n");
        let map = value.as_map().unwrap();
        assert_eq!(map["a"], GenericValue::Scalar(Scalar::Integer(42)));
        assert_eq!(map["b"], GenericValue::Scalar(Scalar::Bool(true)));
        assert_eq!(map["c"], GenericValue::from(""));
    }

    #[test]
    fn test_empty_document_is_empty_map() {
        let (value, _) = decode("");
        assert_eq!(value, GenericValue::default());
    }

    #[test]
    fn test_sequence_root() {
        let (value, _) = decode("- 1\n- two\n");
        assert_eq!(
            value,
            GenericValue::Sequence(vec![
                GenericValue::Scalar(Scalar::Integer(1)),
                GenericValue::from("two")
            ])
        );
    }

    #[test]
    fn test_malformed_yaml_fails() {
        let reporter = RecordingReporter::default();
        let result = Decoder::new("bad.yaml", &reporter).decode_str("a: [1, 2\n");
        assert!(matches!(result, Err(Error::YamlError(_))));
    }

    #[test]
    fn test_retarget_invoice() {
        let (value, _) = decode(INVOICE);
        let invoice: Invoice = retarget(&value).unwrap();

        assert_eq!(invoice.receipt, "Oz-Ware Purchase Invoice");
        assert_eq!(invoice.customer.family, "Gale");
        assert_eq!(invoice.customer.given, "Dorothy");
        assert_eq!(invoice.items.len(), 2);
        assert_eq!(invoice.items[1].part_no, "E1628");
        assert_eq!(invoice.items[1].descrip, "High Heeled \"Ruby\" Slippers");
        assert_eq!(invoice.items[1].quantity, 1);
        assert!((invoice.items[1].price - 100.27).abs() < f64::EPSILON);
        assert_eq!(invoice.send_to, None);
    }

    #[test]
    fn test_retarget_type_mismatch_fails() {
        let (value, _) = decode("customer: not-a-map\n");
        let result: Result<Invoice> = retarget(&value);
        assert!(matches!(result, Err(Error::DecodeError(_))));
    }
}
