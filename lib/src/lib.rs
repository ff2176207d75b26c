//! Compiles SHACL node shapes into extraction lenses over RDF quads.
//!
//! A shapes graph is read into [`Shape`]s; each shape becomes a lens that
//! walks its property paths from a focus node, checks cardinalities and
//! converts the value nodes into a [`Value`] record. Extraction is memoized
//! per focus node, so cyclic data terminates and shared nodes are built once.

pub mod cbd;
pub mod compiler;
pub mod context;
pub mod datatype;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod lens;
pub mod memo;
mod named_nodes;
mod parser;
pub mod path;
pub mod shape;
pub mod test_utils;
pub mod types;
pub mod value;

pub use cbd::{cbd, closure};
pub use compiler::{ShapeCompiler, ShapeSet};
pub use context::Context;
pub use datatype::{Environment, MapEnvironment, ProcessEnvironment};
pub use dispatch::{Cache, SubClasses, Transform};
pub use error::{ExtractError, Result};
pub use io::load_quads;
pub use lens::{and, or, or_all, Lens};
pub use memo::{cached, Memo};
pub use shape::{FieldType, Shape, ShapeField};
pub use types::Path;
pub use value::{Extraction, Record, Value};
