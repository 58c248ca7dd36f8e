//! Host-side values.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use tlcodec_core::Colors;

/// Reserved record field naming the constructor (weak typing).
pub const CONSTRUCTOR_FIELD: &str = "_";

/// A value to encode, or the result of a decode.
///
/// Records and objects keep their fields in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Nat(u32),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    /// Weakly typed record; polymorphic payloads and calls carry [`CONSTRUCTOR_FIELD`].
    Record(Vec<(String, Value)>),
    /// Strongly typed constructor instance.
    Object {
        constructor: String,
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    /// Weak record tagged with its constructor.
    pub fn tagged<K: Into<String>>(
        constructor: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        let mut out = vec![(
            CONSTRUCTOR_FIELD.to_string(),
            Value::String(constructor.to_string()),
        )];
        out.extend(fields.into_iter().map(|(k, v)| (k.into(), v)));
        Value::Record(out)
    }

    /// Weak record without a constructor tag.
    pub fn record<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn object<K: Into<String>>(
        constructor: &str,
        fields: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        Value::Object {
            constructor: constructor.to_string(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Wire-level kind name, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nat(_) => "#",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
            Value::Object { .. } => "object",
        }
    }

    /// Named fields of a record or object, without the constructor tag.
    pub fn fields(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record(fields) | Value::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Field by name; the constructor tag is not a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == CONSTRUCTOR_FIELD {
            return None;
        }
        self.fields()?
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Constructor named by an object or by a record's tag.
    pub fn constructor(&self) -> Option<&str> {
        match self {
            Value::Object { constructor, .. } => Some(constructor),
            Value::Record(fields) => fields.iter().find_map(|(k, v)| match v {
                Value::String(s) if k == CONSTRUCTOR_FIELD => Some(s.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }

    /// Build a weakly typed value from JSON.
    ///
    /// Integers become `Long` (or `Double` beyond `i64`); `null` fields are
    /// dropped, so an absent optional field can be written either way.
    pub fn from_json(json: &serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Record(Vec::new()),
            Json::Bool(b) => Value::Nat(u32::from(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Long(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s.clone()),
            Json::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            Json::Object(map) => Value::Record(
                map.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Format value as colored JSON.
    ///
    /// Keys blue, strings green, structure dim; numbers uncolored.
    /// Objects print their constructor under [`CONSTRUCTOR_FIELD`].
    pub fn format(&self, pretty: bool, colors: Colors) -> String {
        let mut out = String::new();
        format_value(&mut out, self, &colors, pretty, 0);
        out
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Nat(n) => serializer.serialize_u32(*n),
            Value::Int(i) => serializer.serialize_i32(*i),
            Value::Long(l) => serializer.serialize_i64(*l),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => {
                let mut seq = serializer.serialize_seq(Some(bytes.len()))?;
                for b in bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Value::Object {
                constructor,
                fields,
            } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry(CONSTRUCTOR_FIELD, constructor)?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

fn punct(out: &mut String, c: &Colors, ch: char) {
    out.push_str(c.dim);
    out.push(ch);
    out.push_str(c.reset);
}

fn newline(out: &mut String, pretty: bool, indent: usize) {
    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
}

fn format_value(out: &mut String, value: &Value, c: &Colors, pretty: bool, indent: usize) {
    match value {
        Value::Nat(n) => out.push_str(&n.to_string()),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Long(l) => out.push_str(&l.to_string()),
        Value::Double(d) => match serde_json::Number::from_f64(*d) {
            Some(n) => out.push_str(&n.to_string()),
            None => {
                out.push_str(c.dim);
                out.push_str("null");
                out.push_str(c.reset);
            }
        },
        Value::String(s) => format_string(out, s, c),
        Value::Bytes(bytes) => {
            let items: Vec<_> = bytes.iter().map(|&b| Value::Nat(u32::from(b))).collect();
            format_array(out, &items, c, false, indent);
        }
        Value::Array(items) => format_array(out, items, c, pretty, indent),
        Value::Record(fields) => {
            let entries = fields.iter().map(|(k, v)| (k.as_str(), Entry::Value(v)));
            format_object(out, entries, c, pretty, indent);
        }
        Value::Object {
            constructor,
            fields,
        } => {
            let tag = std::iter::once((CONSTRUCTOR_FIELD, Entry::Tag(constructor.as_str())));
            let entries = tag.chain(fields.iter().map(|(k, v)| (k.as_str(), Entry::Value(v))));
            format_object(out, entries, c, pretty, indent);
        }
    }
}

fn format_string(out: &mut String, s: &str, c: &Colors) {
    out.push_str(c.green);
    out.push('"');
    out.push_str(&escape_json_string(s));
    out.push('"');
    out.push_str(c.reset);
}

fn format_array(out: &mut String, items: &[Value], c: &Colors, pretty: bool, indent: usize) {
    punct(out, c, '[');
    if items.is_empty() {
        punct(out, c, ']');
        return;
    }

    let elem_indent = if pretty { indent + 2 } else { 0 };
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            punct(out, c, ',');
        }
        newline(out, pretty, elem_indent);
        format_value(out, item, c, pretty, elem_indent);
    }
    newline(out, pretty, indent);
    punct(out, c, ']');
}

enum Entry<'v> {
    Tag(&'v str),
    Value(&'v Value),
}

fn format_object<'v>(
    out: &mut String,
    entries: impl Iterator<Item = (&'v str, Entry<'v>)>,
    c: &Colors,
    pretty: bool,
    indent: usize,
) {
    punct(out, c, '{');

    let field_indent = if pretty { indent + 2 } else { 0 };
    let mut empty = true;
    for (i, (key, entry)) in entries.enumerate() {
        empty = false;
        if i > 0 {
            punct(out, c, ',');
        }
        newline(out, pretty, field_indent);

        out.push_str(c.blue);
        out.push('"');
        out.push_str(&escape_json_string(key));
        out.push('"');
        out.push_str(c.reset);
        punct(out, c, ':');
        if pretty {
            out.push(' ');
        }

        match entry {
            Entry::Tag(tag) => format_string(out, tag, c),
            Entry::Value(v) => format_value(out, v, c, pretty, field_indent),
        }
    }

    if !empty {
        newline(out, pretty, indent);
    }
    punct(out, c, '}');
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
