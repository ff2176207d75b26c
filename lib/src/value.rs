//! Extracted values and their rendering.

use crate::memo::{Memo, Slot};
use crate::types::{Path, SlotID};
use oxigraph::model::{Quad, Term};
use oxsdatatypes::DateTime;
use serde_json::{json, Map, Number};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

/// Named fields of an extracted shape instance.
pub type Record = BTreeMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(DateTime),
    /// A term handed through unconverted.
    Term(Term),
    /// Shared with the context it came from where possible.
    Quads(Rc<Vec<Quad>>),
    Path(Path),
    List(Vec<Value>),
    Record(Record),
    /// A memoized result, shared by every extraction of the same node.
    Ref(SlotID),
    /// What a reader sees when it dereferences a slot still being computed.
    Pending,
}

pub(crate) const PENDING: &Value = &Value::Pending;

impl Value {
    pub fn empty_record() -> Self {
        Value::Record(Record::new())
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_record().and_then(|r| r.get(field))
    }
}

/// The result of one top-level extraction call: the value plus the arena its
/// slot references point into.
#[derive(Debug)]
pub struct Extraction {
    value: Value,
    memo: Memo,
}

impl Extraction {
    pub(crate) fn new(value: Value, memo: Memo) -> Self {
        Extraction { value, memo }
    }

    /// The raw value; may be a `Value::Ref`.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// The top-level value with slot references followed.
    pub fn value(&self) -> &Value {
        self.memo.resolve(&self.value)
    }

    /// Follows slot references inside a value taken from this extraction.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> &'a Value {
        self.memo.resolve(value)
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    /// Renders the result as JSON. A slot reached again while it is being
    /// rendered becomes `{"$ref": "<slot>"}`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut visiting = HashSet::new();
        to_json(&self.value, &self.memo, &mut visiting)
    }
}

fn term_to_json(term: &Term) -> serde_json::Value {
    match term {
        Term::NamedNode(nn) => json!({ "@id": nn.as_str() }),
        Term::BlankNode(bn) => json!({ "@id": format!("_:{}", bn.as_str()) }),
        other => json!(other.to_string()),
    }
}

fn to_json(value: &Value, memo: &Memo, visiting: &mut HashSet<SlotID>) -> serde_json::Value {
    match value {
        Value::Null | Value::Pending => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Integer(i) => json!(i),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => json!(s),
        Value::DateTime(dt) => json!(dt.to_string()),
        Value::Term(term) => term_to_json(term),
        Value::Quads(quads) => quads.iter().map(|q| json!(q.to_string())).collect(),
        Value::Path(path) => json!(path.to_sparql_path()),
        Value::List(items) => items.iter().map(|v| to_json(v, memo, visiting)).collect(),
        Value::Record(record) => {
            let mut map = Map::new();
            for (name, v) in record {
                map.insert(name.clone(), to_json(v, memo, visiting));
            }
            serde_json::Value::Object(map)
        }
        Value::Ref(slot) => {
            if !visiting.insert(*slot) {
                return json!({ "$ref": slot.to_string() });
            }
            let out = match memo.slot(*slot) {
                Some(Slot::Ready(inner)) => to_json(inner, memo, visiting),
                _ => serde_json::Value::Null,
            };
            visiting.remove(slot);
            out
        }
    }
}
