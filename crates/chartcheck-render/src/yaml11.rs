//! YAML 1.1 document loading.
//!
//! helm output is read the way Kubernetes tooling reads it. Plain scalars
//! resolve under YAML 1.1 rules, so `0440` is an octal integer and
//! `yes`/`off` are booleans. `<<` merge keys are applied. Quoted and block
//! scalars always stay strings.
//!
//! Timestamps are left as strings, and so are `.inf`/`.nan` and integers
//! outside the 64-bit range, which JSON cannot hold.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use yaml_rust2::parser::{Event, EventReceiver, Parser};
use yaml_rust2::scanner::TScalarStyle;

/// A document in the stream could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    /// Zero-based index of the failing document.
    pub index: usize,
    /// What went wrong.
    pub reason: String,
}

/// Load every document of a multi-document stream as JSON.
///
/// A document with no content (a bare `---`, or only comments) loads as
/// `null`.
pub fn load_documents(stream: &str) -> Result<Vec<Value>, LoadError> {
    let mut loader = Loader::default();
    let mut parser = Parser::new_from_str(stream);
    if let Err(e) = parser.load(&mut loader, true) {
        return Err(LoadError {
            index: loader.documents.len(),
            reason: e.to_string(),
        });
    }
    match loader.error {
        Some(error) => Err(error),
        None => Ok(loader.documents),
    }
}

enum Key {
    Text(String),
    Merge,
}

enum Frame {
    Seq {
        anchor: usize,
        items: Vec<Value>,
    },
    Map {
        anchor: usize,
        entries: Map<String, Value>,
        merges: Vec<Value>,
        key: Option<Key>,
    },
}

#[derive(Default)]
struct Loader {
    documents: Vec<Value>,
    stack: Vec<Frame>,
    root: Option<Value>,
    anchors: HashMap<usize, Value>,
    error: Option<LoadError>,
}

impl EventReceiver for Loader {
    fn on_event(&mut self, event: Event) {
        if self.error.is_some() {
            return;
        }
        if let Err(reason) = self.handle(event) {
            self.error = Some(LoadError {
                index: self.documents.len(),
                reason,
            });
        }
    }
}

impl Loader {
    fn handle(&mut self, event: Event) -> Result<(), String> {
        match event {
            Event::DocumentStart { .. } => {
                self.stack.clear();
                self.root = None;
                self.anchors.clear();
            }
            Event::DocumentEnd { .. } => {
                let root = self.root.take().unwrap_or(Value::Null);
                self.documents.push(root);
            }
            Event::Scalar(text, style, anchor, tag) => {
                let plain = matches!(style, TScalarStyle::Plain);
                let tag = tag.as_ref().map(|t| t.suffix.as_str());
                let value = resolve_scalar(&text, plain, tag);
                self.record_anchor(anchor, &value);
                let merge = plain && text == "<<";
                self.complete(value, Some(text), merge)?;
            }
            Event::Alias(id) => {
                let value = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| format!("alias to unknown anchor {id}"))?;
                self.complete(value, None, false)?;
            }
            Event::SequenceStart(anchor, ..) => self.stack.push(Frame::Seq {
                anchor,
                items: Vec::new(),
            }),
            Event::SequenceEnd { .. } => match self.stack.pop() {
                Some(Frame::Seq { anchor, items }) => {
                    let value = Value::Array(items);
                    self.record_anchor(anchor, &value);
                    self.complete(value, None, false)?;
                }
                _ => return Err("unbalanced sequence end".to_string()),
            },
            Event::MappingStart(anchor, ..) => self.stack.push(Frame::Map {
                anchor,
                entries: Map::new(),
                merges: Vec::new(),
                key: None,
            }),
            Event::MappingEnd { .. } => match self.stack.pop() {
                Some(Frame::Map {
                    anchor,
                    entries,
                    merges,
                    key: None,
                }) => {
                    let value = Value::Object(apply_merges(entries, merges)?);
                    self.record_anchor(anchor, &value);
                    self.complete(value, None, false)?;
                }
                _ => return Err("unbalanced mapping end".to_string()),
            },
            _ => {}
        }
        Ok(())
    }

    fn record_anchor(&mut self, anchor: usize, value: &Value) {
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
    }

    /// Attach a finished node to its parent.
    fn complete(&mut self, value: Value, raw: Option<String>, merge: bool) -> Result<(), String> {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Seq { items, .. }) => items.push(value),
            Some(Frame::Map {
                entries,
                merges,
                key,
                ..
            }) => match key.take() {
                None if merge => *key = Some(Key::Merge),
                None => *key = Some(Key::Text(key_text(raw, &value)?)),
                Some(Key::Merge) => merges.push(value),
                Some(Key::Text(k)) => {
                    entries.insert(k, value);
                }
            },
        }
        Ok(())
    }
}

/// Mapping keys keep their source text; JSON keys are strings.
fn key_text(raw: Option<String>, value: &Value) -> Result<String, String> {
    if let Some(raw) = raw {
        return Ok(raw);
    }
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Array(_) | Value::Object(_) => Err("mapping keys must be scalars".to_string()),
    }
}

/// Explicit keys win over merged ones; earlier merge sources win over later.
fn apply_merges(
    mut entries: Map<String, Value>,
    merges: Vec<Value>,
) -> Result<Map<String, Value>, String> {
    for source in merges {
        let maps = match source {
            Value::Object(map) => vec![map],
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err("merge sequence must hold only mappings".to_string()),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err("merge value must be a mapping or a sequence of mappings".to_string()),
        };
        for map in maps {
            for (k, v) in map {
                entries.entry(k).or_insert(v);
            }
        }
    }
    Ok(entries)
}

fn resolve_scalar(text: &str, plain: bool, tag: Option<&str>) -> Value {
    match tag {
        Some("str") => Value::String(text.to_string()),
        Some("null" | "bool" | "int" | "float") => resolve_plain(text),
        _ if plain => resolve_plain(text),
        _ => Value::String(text.to_string()),
    }
}

fn pattern(cell: &'static OnceLock<Option<Regex>>, source: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(source).ok()).as_ref()
}

fn int_pattern() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &CELL,
        r"^(?:[-+]?0b[0-1_]+|[-+]?0[0-7_]+|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x[0-9a-fA-F_]+|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
    )
}

fn float_pattern() -> Option<&'static Regex> {
    static CELL: OnceLock<Option<Regex>> = OnceLock::new();
    pattern(
        &CELL,
        r"^(?:[-+]?[0-9][0-9_]*\.[0-9_]*(?:[eE][-+][0-9]+)?|\.[0-9_]+(?:[eE][-+][0-9]+)?|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
}

/// Resolve a plain scalar under the YAML 1.1 core types.
fn resolve_plain(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "yes" | "Yes" | "YES" | "true" | "True" | "TRUE" | "on" | "On" | "ON" => {
            return Value::Bool(true)
        }
        "no" | "No" | "NO" | "false" | "False" | "FALSE" | "off" | "Off" | "OFF" => {
            return Value::Bool(false)
        }
        _ => {}
    }
    if int_pattern().is_some_and(|re| re.is_match(text)) {
        if let Some(value) = parse_int(text) {
            return value;
        }
    } else if float_pattern().is_some_and(|re| re.is_match(text)) {
        if let Some(value) = parse_float(text) {
            return value;
        }
    }
    Value::String(text.to_string())
}

fn split_sign(cleaned: &str) -> (bool, &str) {
    match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(cleaned)),
    }
}

fn parse_int(text: &str) -> Option<Value> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, digits) = split_sign(&cleaned);
    let magnitude: i128 = if let Some(bin) = digits.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()?
    } else if let Some(hex) = digits.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()?
    } else if digits.contains(':') {
        digits.split(':').try_fold(0i128, |acc, part| {
            acc.checked_mul(60)?.checked_add(part.parse::<i128>().ok()?)
        })?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i128::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<i128>().ok()?
    };
    let signed = if negative { -magnitude } else { magnitude };
    if let Ok(n) = i64::try_from(signed) {
        Some(Value::from(n))
    } else {
        u64::try_from(signed).ok().map(Value::from)
    }
}

fn parse_float(text: &str) -> Option<Value> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, body) = split_sign(&cleaned);
    let magnitude = if body.contains(':') {
        let mut parts: Vec<&str> = body.split(':').collect();
        let last: f64 = parts.pop()?.parse().ok()?;
        parts
            .iter()
            .try_fold(0f64, |acc, part| Some(acc * 60.0 + part.parse::<f64>().ok()?))?
            * 60.0
            + last
    } else {
        body.parse::<f64>().ok()?
    };
    let value = if negative { -magnitude } else { magnitude };
    Number::from_f64(value).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn one(doc: &str) -> Value {
        let mut docs = load_documents(doc).unwrap();
        assert_eq!(docs.len(), 1, "{docs:?}");
        docs.remove(0)
    }

    #[test]
    fn octal_and_other_integer_forms() {
        let doc = one("a: 0440\nb: 0x1F\nc: 0b101\nd: 1_000\ne: -017\nf: 1:30\ng: 0\n");
        assert_eq!(doc, json!({"a": 288, "b": 31, "c": 5, "d": 1000, "e": -15, "f": 90, "g": 0}));
    }

    #[test]
    fn yaml11_booleans_and_nulls() {
        let doc = one("a: yes\nb: off\nc: On\nd: NO\ne: ~\nf:\ng: y\n");
        assert_eq!(
            doc,
            json!({"a": true, "b": false, "c": true, "d": false, "e": null, "f": null, "g": "y"})
        );
    }

    #[test]
    fn quoted_scalars_stay_strings() {
        let doc = one("a: \"0440\"\nb: 'yes'\nc: \"~\"\nd: !!str 12\ne: |\n  on\n");
        assert_eq!(doc, json!({"a": "0440", "b": "yes", "c": "~", "d": "12", "e": "on\n"}));
    }

    #[test]
    fn floats_and_unrepresentable_values() {
        let doc = one("a: 1.5\nb: -2.5e+3\nc: .5\nd: .inf\ne: .NaN\nf: 1e3\ng: 2024-01-01\n");
        assert_eq!(doc["a"], json!(1.5));
        assert_eq!(doc["b"], json!(-2500.0));
        assert_eq!(doc["c"], json!(0.5));
        assert_eq!(doc["d"], json!(".inf"));
        assert_eq!(doc["e"], json!(".NaN"));
        assert_eq!(doc["f"], json!("1e3"));
        assert_eq!(doc["g"], json!("2024-01-01"));
    }

    #[test]
    fn merge_keys_apply_with_explicit_precedence() {
        let doc = one(
            "base: &base\n  x: 1\n  y: 1\nother: &other\n  y: 2\n  z: 2\n\
             single:\n  <<: *base\n  y: 9\n\
             many:\n  <<: [*base, *other]\n",
        );
        assert_eq!(doc["single"], json!({"x": 1, "y": 9}));
        assert_eq!(doc["many"], json!({"x": 1, "y": 1, "z": 2}));
    }

    #[test]
    fn quoted_merge_key_is_literal() {
        let doc = one("m:\n  \"<<\": {x: 1}\n");
        assert_eq!(doc["m"], json!({"<<": {"x": 1}}));
    }

    #[test]
    fn aliases_copy_anchored_nodes() {
        let doc = one("a: &ports [80, 443]\nb: *ports\n");
        assert_eq!(doc["b"], json!([80, 443]));
    }

    #[test]
    fn keys_keep_source_text() {
        let doc = one("on: 1\n0440: 2\n");
        assert_eq!(doc, json!({"on": 1, "0440": 2}));
    }

    #[test]
    fn empty_documents_load_as_null() {
        let docs = load_documents("---\n# only a comment\n---\na: 1\n").unwrap();
        assert_eq!(docs, vec![Value::Null, json!({"a": 1})]);
        assert!(load_documents("").unwrap().is_empty());
    }

    #[test]
    fn bad_merge_value_reports_document() {
        let err = load_documents("a: 1\n---\nb:\n  <<: 3\n").unwrap_err();
        assert_eq!(err.index, 1);
        assert!(err.reason.contains("merge"), "{}", err.reason);
    }

    #[test]
    fn scan_error_reports_document() {
        let err = load_documents("a: 1\n---\nkind: [unterminated\n").unwrap_err();
        assert_eq!(err.index, 1);
    }
}
