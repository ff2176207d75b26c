//! Reads node shapes out of a shapes graph.
//!
//! The readers are themselves lenses over the shapes graph, so a shape
//! definition is decoded with the same combinators its compiled form uses on
//! data.

use crate::context::{format_term_for_label, Context};
use crate::datatype::{DatatypeLens, Environment};
use crate::dispatch::{class_lens, Cache, Transforms};
use crate::error::{ExtractError, Result};
use crate::lens::Lens;
use crate::memo::Memo;
use crate::named_nodes::{RDF, SHACL};
use crate::path::{pred, shacl_path};
use crate::shape::{FieldType, Shape, ShapeField};
use crate::types::lexical;
use log::{debug, warn};
use oxigraph::model::{NamedNodeRef, Quad, Term};
use std::collections::HashSet;
use std::rc::Rc;

/// What the readers need beyond the shapes graph itself.
#[derive(Clone)]
pub(crate) struct ParsingContext {
    pub(crate) cache: Cache,
    pub(crate) transforms: Rc<Transforms>,
    pub(crate) env: Rc<dyn Environment>,
}

fn malformed(node: &Term, reason: impl Into<String>) -> ExtractError {
    ExtractError::MalformedShape {
        shape: node.to_string(),
        reason: reason.into(),
    }
}

fn count(ctx: &Context, predicate: NamedNodeRef<'_>) -> Result<Option<usize>> {
    match ctx.object(predicate) {
        None => Ok(None),
        Some(term) => lexical(&term)
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| malformed(ctx.focus(), format!("{} is not a count: {}", predicate, term))),
    }
}

fn iri(ctx: &Context, predicate: NamedNodeRef<'_>) -> Result<Option<oxigraph::model::NamedNode>> {
    match ctx.object(predicate) {
        None => Ok(None),
        Some(Term::NamedNode(nn)) => Ok(Some(nn)),
        Some(other) => Err(malformed(
            ctx.focus(),
            format!("{} must be an IRI, found {}", predicate, other),
        )),
    }
}

/// Reads one `sh:property` node into a compiled field.
pub(crate) fn extract_property(pc: ParsingContext) -> Lens<Context, ShapeField> {
    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        let shacl = SHACL::new();
        let path_term = ctx
            .object(shacl.path)
            .ok_or_else(|| malformed(ctx.focus(), "missing sh:path"))?;
        let (path, traversal) = shacl_path().execute(&ctx.with_focus(path_term), memo)?;

        let name = ctx
            .object(shacl.name)
            .map(|t| lexical(&t))
            .ok_or_else(|| malformed(ctx.focus(), format!("missing sh:name for path {path}")))?;
        let min_count = count(ctx, shacl.min_count)?.unwrap_or(0);
        let max_count = count(ctx, shacl.max_count)?;

        let field_type = match (iri(ctx, shacl.class)?, iri(ctx, shacl.datatype)?) {
            (Some(class), None) => FieldType::Class(class.as_str().to_string()),
            (None, Some(datatype)) => FieldType::Datatype(datatype),
            (Some(_), Some(_)) => {
                return Err(malformed(ctx.focus(), format!("{name}: both sh:class and sh:datatype")))
            }
            (None, None) => {
                return Err(malformed(ctx.focus(), format!("{name}: needs sh:class or sh:datatype")))
            }
        };
        let extract = match &field_type {
            FieldType::Class(class) => {
                class_lens(class.clone(), pc.cache.clone(), Rc::clone(&pc.transforms))
            }
            FieldType::Datatype(datatype) => {
                DatatypeLens::new(datatype.clone(), Rc::clone(&pc.env)).into_lens()
            }
        };

        Ok(ShapeField {
            name,
            path,
            min_count,
            max_count,
            field_type,
            traversal,
            extract,
        })
    })
}

/// Reads a `sh:NodeShape` subject into one shape per target class.
///
/// A shape without `sh:targetClass` targets its own IRI.
pub(crate) fn extract_shape(pc: ParsingContext) -> Lens<Context, Vec<Shape>> {
    let properties = pred(SHACL::new().property.into_owned()).then_all(extract_property(pc));
    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        let shacl = SHACL::new();
        if !ctx.has_type(shacl.node_shape) {
            return Err(ExtractError::TypeMismatch {
                subject: ctx.focus().to_string(),
            });
        }
        let id = lexical(ctx.focus());

        let mut targets: Vec<String> = ctx
            .objects(shacl.target_class)
            .iter()
            .filter_map(|t| match t {
                Term::NamedNode(nn) => Some(nn.as_str().to_string()),
                _ => None,
            })
            .collect();
        if targets.is_empty() {
            match ctx.focus() {
                Term::NamedNode(nn) => targets.push(nn.as_str().to_string()),
                other => warn!("node shape {} has no target class, skipping", other),
            }
        }

        let description = ctx.object(shacl.description).map(|t| lexical(&t));
        let fields = properties.execute(ctx, memo)?;

        let mut names = HashSet::new();
        for field in &fields {
            if !names.insert(field.name.as_str()) {
                return Err(malformed(
                    ctx.focus(),
                    format!("duplicate field name {:?}", field.name),
                ));
            }
        }

        debug!(
            "shape {} targets {:?} with {} field(s)",
            format_term_for_label(ctx.focus()),
            targets,
            fields.len()
        );
        Ok(targets
            .into_iter()
            .map(|target_type| Shape {
                id: id.clone(),
                target_type,
                description: description.clone(),
                fields: fields.clone(),
            })
            .collect())
    })
}

/// Every subject typed `sh:NodeShape`, in order of first appearance.
pub(crate) fn node_shape_subjects(quads: &[Quad]) -> Vec<Term> {
    let rdf = RDF::new();
    let shacl = SHACL::new();
    let mut seen = HashSet::new();
    quads
        .iter()
        .filter(|q| {
            q.predicate.as_ref() == rdf.type_
                && matches!(&q.object, Term::NamedNode(nn) if nn.as_ref() == shacl.node_shape)
        })
        .map(|q| Term::from(q.subject.clone()))
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Reads every node shape in `quads` and registers each shape's lens in the
/// cache under its target class.
pub(crate) fn extract_shapes(quads: Rc<Vec<Quad>>, pc: &ParsingContext) -> Result<Vec<Shape>> {
    let reader = extract_shape(pc.clone());
    let mut memo = Memo::new();
    let mut shapes = Vec::new();
    for subject in node_shape_subjects(&quads) {
        let ctx = Context::new(subject, Rc::clone(&quads));
        for shape in reader.execute(&ctx, &mut memo)? {
            pc.cache.register(shape.target_type.clone(), shape.lens());
            shapes.push(shape);
        }
    }
    Ok(shapes)
}
