//! Failure taxonomy for shape compilation and extraction.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Every way a lens can fail.
///
/// Failures are ordinary values: `or`, `or_all`, `then_some` and optional
/// fields absorb them, anything else propagates to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A list-valued field produced a number of values outside its bounds.
    #[error("{shape_type}.{field}: expected {}, found {found}", bounds(.min, .max, .found))]
    CardinalityViolation {
        shape_type: String,
        field: String,
        min: usize,
        max: Option<usize>,
        found: usize,
    },

    /// A single-valued traversal produced zero or several hops.
    #[error("expected exactly one value, found {found}")]
    RequiredValueMissing { found: usize },

    /// `sh:class` names a class with no registered extractor.
    #[error("no shape registered for class <{class}>")]
    UnknownShapeReference { class: String },

    /// A subject used as a shape is not typed `sh:NodeShape`.
    #[error("{subject} is not a sh:NodeShape")]
    TypeMismatch { subject: String },

    /// Typed dispatch found no registered extractor in the subclass chain.
    #[error("no shape applies to type <{ty}> or any of its superclasses")]
    NoApplicableShape { ty: String },

    /// Neither the environment nor the shape graph supplied a value.
    #[error("environment variable {key} is not set and has no default")]
    EnvironmentVariableMissing { key: String },

    /// An RDF list without a terminating `rdf:nil`.
    #[error("malformed RDF list at {node}: {reason}")]
    MalformedList { node: String, reason: String },

    /// A path description that is no recognised path form.
    #[error("invalid property path {node}")]
    InvalidPath { node: String },

    /// A lexical value that does not parse as its datatype.
    #[error("cannot read {value:?} as <{datatype}>")]
    InvalidLiteral { value: String, datatype: String },

    /// A structurally broken shape definition.
    #[error("malformed shape {shape}: {reason}")]
    MalformedShape { shape: String, reason: String },

    /// An alternation over zero branches.
    #[error("no alternatives to try")]
    NoAlternative,

    /// A failure inside one field of a shape, with the location attached.
    #[error("shape {shape_id} ({shape_type}), field {field:?}, focus {focus}: {source}")]
    Field {
        shape_id: String,
        shape_type: String,
        field: String,
        focus: String,
        #[source]
        source: Box<ExtractError>,
    },

    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },
}

fn bounds(min: &usize, max: &Option<usize>, found: &usize) -> String {
    match max {
        Some(max) if found > max => format!("at most {max}"),
        _ => format!("at least {min}"),
    }
}

impl ExtractError {
    /// Strips the `Field` location wrappers and returns the underlying failure.
    pub fn root_cause(&self) -> &ExtractError {
        match self {
            ExtractError::Field { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
