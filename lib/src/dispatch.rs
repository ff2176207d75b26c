//! Class-keyed lens registry, the subclass map, and typed dispatch.

use crate::context::Context;
use crate::error::{ExtractError, Result};
use crate::lens::Lens;
use crate::memo::{run_cached, Memo};
use crate::named_nodes::RDFS;
use crate::value::{Record, Value};
use log::{debug, warn};
use oxigraph::model::{NamedOrBlankNode, Quad, Term};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// A post-processing step applied to the value extracted for a class.
pub type Transform = Rc<dyn Fn(Value) -> Result<Value>>;

pub type Transforms = HashMap<String, Transform>;

/// Compiled lenses by class IRI.
///
/// Shared by handle: `sh:class` fields look their class up here when they
/// run, so shapes may refer to each other in any order, cycles included.
#[derive(Clone, Default)]
pub struct Cache {
    lenses: Rc<RefCell<HashMap<String, Lens<Context, Value>>>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, class: &str) -> Option<Lens<Context, Value>> {
        self.lenses.borrow().get(class).cloned()
    }

    pub fn contains(&self, class: &str) -> bool {
        self.lenses.borrow().contains_key(class)
    }

    /// Replaces whatever is registered for `class`.
    pub fn insert(&self, class: impl Into<String>, lens: Lens<Context, Value>) {
        self.lenses.borrow_mut().insert(class.into(), lens);
    }

    /// Adds `lens` as a further alternative for `class`; lenses registered
    /// earlier are tried first.
    pub fn register(&self, class: impl Into<String>, lens: Lens<Context, Value>) {
        let mut lenses = self.lenses.borrow_mut();
        let class = class.into();
        let combined = match lenses.remove(&class) {
            Some(existing) => existing.or(lens),
            None => lens,
        };
        lenses.insert(class, combined);
    }

    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.lenses.borrow().keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.classes()).finish()
    }
}

/// Each class's single declared parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubClasses {
    parents: HashMap<String, String>,
}

impl SubClasses {
    /// Reads every `rdfs:subClassOf` between IRIs. When a class declares
    /// several parents the last one read wins.
    pub fn from_quads(quads: &[Quad]) -> Self {
        let rdfs = RDFS::new();
        let mut parents = HashMap::new();
        for quad in quads.iter().filter(|q| q.predicate.as_ref() == rdfs.sub_class_of) {
            if let (NamedOrBlankNode::NamedNode(child), Term::NamedNode(parent)) =
                (&quad.subject, &quad.object)
            {
                if let Some(previous) =
                    parents.insert(child.as_str().to_string(), parent.as_str().to_string())
                {
                    debug!("{} had parent {}, now {}", child, previous, parent);
                }
            }
        }
        SubClasses { parents }
    }

    pub fn insert(&mut self, class: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(class.into(), parent.into());
    }

    pub fn parent(&self, class: &str) -> Option<&str> {
        self.parents.get(class).map(String::as_str)
    }

    /// `class` followed by its ancestors, stopping if the chain loops.
    pub fn chain(&self, class: &str) -> Vec<String> {
        let mut out = vec![class.to_string()];
        let mut seen: HashSet<&str> = HashSet::from([class]);
        let mut current = class;
        while let Some(parent) = self.parent(current) {
            if !seen.insert(parent) {
                break;
            }
            out.push(parent.to_string());
            current = parent;
        }
        out
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

fn apply_transform(transforms: &Transforms, class: &str, value: Value, memo: &Memo) -> Result<Value> {
    match transforms.get(class) {
        None => Ok(value),
        Some(transform) => match memo.resolve(&value) {
            // still being built higher up the stack, hand the reference through
            Value::Pending => Ok(value),
            resolved => transform(resolved.clone()),
        },
    }
}

/// Element extractor for a `sh:class` field: the lens registered for
/// `class`, memoized per node, with the class transform applied.
pub fn class_lens(class: String, cache: Cache, transforms: Rc<Transforms>) -> Lens<Context, Value> {
    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        let lens = cache
            .get(&class)
            .ok_or_else(|| ExtractError::UnknownShapeReference {
                class: class.clone(),
            })?;
        let value = run_cached(&lens, ctx, memo)?;
        apply_transform(&transforms, &class, value, memo)
    })
}

fn merge(results: Vec<Value>, memo: &Memo) -> Value {
    let mut merged = Record::new();
    for result in &results {
        match memo.resolve(result) {
            Value::Record(record) => {
                merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())))
            }
            Value::Pending => {}
            other => warn!("cannot merge non-record value {:?}", other),
        }
    }
    Value::Record(merged)
}

/// Extracts the focus node by its own `rdf:type`.
///
/// No asserted type gives `None`. Otherwise every class on the subclass
/// chain of each asserted type that has a registered lens contributes, and
/// their records are merged with later classes overwriting earlier fields.
pub fn typed_extract(
    cache: Cache,
    sub_classes: Rc<SubClasses>,
    transforms: Rc<Transforms>,
) -> Lens<Context, Option<Value>> {
    let resolve = Lens::new(move |ctx: &Context, memo: &mut Memo| {
        let types: Vec<String> = ctx
            .types()
            .iter()
            .filter_map(|t| match t {
                Term::NamedNode(nn) => Some(nn.as_str().to_string()),
                _ => None,
            })
            .collect();

        let mut classes: Vec<String> = Vec::new();
        for ty in &types {
            for class in sub_classes.chain(ty) {
                if cache.contains(&class) && !classes.contains(&class) {
                    classes.push(class);
                }
            }
        }
        if classes.is_empty() {
            return Err(ExtractError::NoApplicableShape {
                ty: types.join(", "),
            });
        }
        debug!("{} dispatches to {:?}", ctx.focus(), classes);

        let mut results = Vec::with_capacity(classes.len());
        for class in &classes {
            let lens = cache
                .get(class)
                .ok_or_else(|| ExtractError::UnknownShapeReference {
                    class: class.clone(),
                })?;
            results.push(run_cached(&lens, ctx, memo)?);
        }
        let value = if results.len() == 1 {
            results.remove(0)
        } else {
            merge(results, memo)
        };
        apply_transform(&transforms, &types[0], value, memo)
    });

    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        if ctx.types().is_empty() {
            return Ok(None);
        }
        run_cached(&resolve, ctx, memo).map(Some)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iri, parse_turtle};

    #[test]
    fn last_declared_parent_wins() {
        let quads = parse_turtle(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            ex:Dog rdfs:subClassOf ex:Pet .
            ex:Dog rdfs:subClassOf ex:Mammal .
            ex:Mammal rdfs:subClassOf ex:Animal .
            "#,
        );
        let sub = SubClasses::from_quads(&quads);
        assert_eq!(sub.parent("http://example.org/Dog"), Some("http://example.org/Mammal"));
        assert_eq!(
            sub.chain("http://example.org/Dog"),
            vec![
                "http://example.org/Dog",
                "http://example.org/Mammal",
                "http://example.org/Animal"
            ]
        );
    }

    #[test]
    fn chain_stops_on_cycles() {
        let mut sub = SubClasses::default();
        sub.insert("A", "B");
        sub.insert("B", "A");
        assert_eq!(sub.chain("A"), vec!["A", "B"]);
    }

    #[test]
    fn register_keeps_earlier_alternative_first() {
        let cache = Cache::new();
        cache.register("C", Lens::constant(Value::Integer(1)));
        cache.register("C", Lens::constant(Value::Integer(2)));
        let ctx = Context::new(iri("http://example.org/x"), Rc::new(Vec::new()));
        assert_eq!(cache.get("C").unwrap().execute_once(&ctx), Ok(Value::Integer(1)));
    }

    #[test]
    fn unknown_class_reference() {
        let lens = class_lens("http://example.org/Nope".into(), Cache::new(), Rc::default());
        let ctx = Context::new(iri("http://example.org/x"), Rc::new(Vec::new()));
        assert_eq!(
            lens.execute_once(&ctx),
            Err(ExtractError::UnknownShapeReference {
                class: "http://example.org/Nope".into()
            })
        );
    }

    #[test]
    fn untyped_node_yields_nothing() {
        let quads = Rc::new(parse_turtle(
            "<http://example.org/x> <http://example.org/p> 1 .",
        ));
        let lens = typed_extract(Cache::new(), Rc::default(), Rc::default());
        let ctx = Context::new(iri("http://example.org/x"), quads);
        assert_eq!(lens.execute_once(&ctx), Ok(None));
    }
}
