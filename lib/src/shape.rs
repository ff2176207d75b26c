use crate::context::Context;
use crate::error::ExtractError;
use crate::lens::{and, Lens};
use crate::types::Path;
use crate::value::{Record, Value};
use log::trace;
use oxigraph::model::NamedNode;
use std::fmt;

/// How the value nodes of a field are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// `sh:class`: extracted through the compiled lens registered for the class.
    Class(String),
    /// `sh:datatype`: a literal (or environment value) converted by datatype.
    Datatype(NamedNode),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Class(c) => write!(f, "class <{c}>"),
            FieldType::Datatype(d) => write!(f, "datatype {d}"),
        }
    }
}

/// One `sh:property` of a node shape, compiled.
#[derive(Debug, Clone)]
pub struct ShapeField {
    pub name: String,
    pub path: Path,
    pub min_count: usize,
    /// `None` is unbounded.
    pub max_count: Option<usize>,
    pub field_type: FieldType,
    pub(crate) traversal: Lens<Context, Vec<Context>>,
    pub(crate) extract: Lens<Context, Value>,
}

impl ShapeField {
    /// A field whose `maxCount` allows two or more values yields a list.
    pub fn is_list(&self) -> bool {
        self.max_count.map_or(true, |max| max >= 2)
    }

    pub fn is_optional(&self) -> bool {
        self.min_count == 0
    }

    /// Compiles the field into a lens producing a one-entry record.
    ///
    /// Optional fields degrade any failure into an absent entry.
    pub fn lens(&self, shape_id: &str, shape_type: &str) -> Lens<Context, Record> {
        let values: Lens<Context, Value> = if self.is_list() {
            let (min, max) = (self.min_count, self.max_count);
            let (field, ty) = (self.name.clone(), shape_type.to_string());
            self.traversal
                .clone()
                .then_all(self.extract.clone())
                .try_map(move |items| {
                    let found = items.len();
                    if found < min || max.map_or(false, |max| found > max) {
                        return Err(ExtractError::CardinalityViolation {
                            shape_type: ty.clone(),
                            field: field.clone(),
                            min,
                            max,
                            found,
                        });
                    }
                    Ok(Value::List(items))
                })
        } else {
            self.traversal.clone().one().then(self.extract.clone())
        };

        let (id, ty, field) = (shape_id.to_string(), shape_type.to_string(), self.name.clone());
        let located = values.map_err(move |source, ctx: &Context| ExtractError::Field {
            shape_id: id.clone(),
            shape_type: ty.clone(),
            field: field.clone(),
            focus: ctx.focus().to_string(),
            source: Box::new(source),
        });

        let name = self.name.clone();
        let record = located.map(move |value| Record::from([(name.clone(), value)]));
        if self.is_optional() {
            record.or(Lens::constant(Record::new()))
        } else {
            record
        }
    }
}

/// A node shape bound to one target class.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: String,
    pub target_type: String,
    pub description: Option<String>,
    pub fields: Vec<ShapeField>,
}

impl Shape {
    pub fn field(&self, name: &str) -> Option<&ShapeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The extraction program for this shape: every field run on the same
    /// focus, the one-entry records merged. No fields gives an empty record.
    pub fn lens(&self) -> Lens<Context, Value> {
        let fields = self
            .fields
            .iter()
            .map(|f| f.lens(&self.id, &self.target_type))
            .collect();
        let ty = self.target_type.clone();
        and(fields)
            .map(|records| Value::Record(records.into_iter().flatten().collect()))
            .map_err(move |e, ctx: &Context| {
                trace!("{} does not match <{}>: {}", ctx.focus(), ty, e);
                e
            })
    }
}
