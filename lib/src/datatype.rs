//! Leaf values: literal conversion by datatype and environment indirection.

use crate::context::Context;
use crate::error::{ExtractError, Result};
use crate::lens::Lens;
use crate::memo::Memo;
use crate::named_nodes::{RDFL, XSD};
use crate::types::lexical;
use crate::value::Value;
use oxigraph::model::{NamedNode, Term};
use oxsdatatypes::DateTime;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

/// Source of environment variables for `rdfl:EnvVariable` nodes.
pub trait Environment {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the environment of the running process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, for embedding and tests.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Where the lexical form of a leaf comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafSource {
    Lexical(String),
    Environment { key: String, default: Option<String> },
}

impl LeafSource {
    /// Classifies the value node at the focus of `ctx`.
    pub fn of(ctx: &Context) -> Result<Self> {
        let rdfl = RDFL::new();
        if !matches!(ctx.focus(), Term::Literal(_)) && ctx.has_type(rdfl.env_variable) {
            let key = ctx
                .object(rdfl.env_key)
                .map(|t| lexical(&t))
                .ok_or_else(|| ExtractError::MalformedShape {
                    shape: ctx.focus().to_string(),
                    reason: "rdfl:EnvVariable without rdfl:envKey".to_string(),
                })?;
            let default = ctx.object(rdfl.env_default).map(|t| lexical(&t));
            return Ok(LeafSource::Environment { key, default });
        }
        Ok(LeafSource::Lexical(lexical(ctx.focus())))
    }

    pub fn resolve(self, env: &dyn Environment) -> Result<String> {
        match self {
            LeafSource::Lexical(s) => Ok(s),
            LeafSource::Environment { key, default } => env
                .var(&key)
                .or(default)
                .ok_or(ExtractError::EnvironmentVariableMissing { key }),
        }
    }
}

fn parse<T: FromStr>(lexical: &str, datatype: &NamedNode) -> Result<T> {
    lexical
        .trim()
        .parse::<T>()
        .map_err(|_| ExtractError::InvalidLiteral {
            value: lexical.to_string(),
            datatype: datatype.as_str().to_string(),
        })
}

/// Converts a lexical form according to `datatype`. Datatypes outside the
/// table yield the original term.
pub fn convert(lexical: &str, datatype: &NamedNode, original: &Term) -> Result<Value> {
    let xsd = XSD::new();
    let dt = datatype.as_ref();
    if dt == xsd.integer
        || dt == xsd.int
        || dt == xsd.long
        || dt == xsd.short
        || dt == xsd.non_negative_integer
        || dt == xsd.positive_integer
    {
        parse::<i64>(lexical, datatype).map(Value::Integer)
    } else if dt == xsd.float || dt == xsd.double || dt == xsd.decimal {
        parse::<f64>(lexical, datatype).map(Value::Float)
    } else if dt == xsd.string {
        Ok(Value::String(lexical.to_string()))
    } else if dt == xsd.date_time {
        parse::<DateTime>(lexical, datatype).map(Value::DateTime)
    } else if dt == xsd.boolean {
        Ok(Value::Bool(lexical == "true"))
    } else {
        Ok(Value::Term(original.clone()))
    }
}

/// Element extractor for a `sh:datatype` field.
#[derive(Clone)]
pub struct DatatypeLens {
    datatype: NamedNode,
    env: Rc<dyn Environment>,
}

impl fmt::Debug for DatatypeLens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatatypeLens")
            .field("datatype", &self.datatype)
            .finish()
    }
}

impl DatatypeLens {
    pub fn new(datatype: NamedNode, env: Rc<dyn Environment>) -> Self {
        DatatypeLens { datatype, env }
    }

    pub fn extract(&self, ctx: &Context) -> Result<Value> {
        let source = LeafSource::of(ctx)?;
        let from_env = matches!(source, LeafSource::Environment { .. });
        let lexical = source.resolve(self.env.as_ref())?;
        if from_env {
            let term = Term::from(oxigraph::model::Literal::new_simple_literal(lexical.as_str()));
            convert(&lexical, &self.datatype, &term)
        } else {
            convert(&lexical, &self.datatype, ctx.focus())
        }
    }

    pub fn into_lens(self) -> Lens<Context, Value> {
        Lens::new(move |ctx: &Context, _memo: &mut Memo| self.extract(ctx))
    }
}
