//! Public entry points: compile a shapes graph, then extract from data.

use crate::cbd::cbd;
use crate::context::Context;
use crate::datatype::{Environment, ProcessEnvironment};
use crate::dispatch::{class_lens, typed_extract, Cache, SubClasses, Transform, Transforms};
use crate::error::{ExtractError, Result};
use crate::lens::Lens;
use crate::memo::Memo;
use crate::named_nodes::RDFL;
use crate::parser::{extract_shapes, ParsingContext};
use crate::path::path_parser;
use crate::shape::Shape;
use crate::value::{Extraction, Record, Value};
use log::info;
use oxigraph::model::Quad;
use std::collections::HashMap;
use std::rc::Rc;

/// Builder for a [`ShapeSet`].
///
/// ```no_run
/// # use shapelens::{ShapeCompiler, Value};
/// # let quads: Vec<oxigraph::model::Quad> = Vec::new();
/// let shapes = ShapeCompiler::new()
///     .with_transform("http://example.org/Point", |v: Value| Ok(v))
///     .compile(&quads)?;
/// # Ok::<(), shapelens::ExtractError>(())
/// ```
pub struct ShapeCompiler {
    transforms: Transforms,
    custom: Vec<(String, Lens<Context, Value>)>,
    env: Rc<dyn Environment>,
}

impl Default for ShapeCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeCompiler {
    pub fn new() -> Self {
        ShapeCompiler {
            transforms: HashMap::new(),
            custom: Vec::new(),
            env: Rc::new(ProcessEnvironment),
        }
    }

    /// Post-processes every value extracted for `class`.
    pub fn with_transform(
        mut self,
        class: impl Into<String>,
        transform: impl Fn(Value) -> Result<Value> + 'static,
    ) -> Self {
        let transform: Transform = Rc::new(transform);
        self.transforms.insert(class.into(), transform);
        self
    }

    /// Registers a hand-written lens for `class` before any shape is read.
    /// Shapes targeting the same class become further alternatives.
    pub fn with_lens(mut self, class: impl Into<String>, lens: Lens<Context, Value>) -> Self {
        self.custom.push((class.into(), lens));
        self
    }

    /// Where `rdfl:EnvVariable` values are looked up.
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Rc::new(env);
        self
    }

    pub fn compile(self, quads: &[Quad]) -> Result<ShapeSet> {
        let quads = Rc::new(quads.to_vec());
        let cache = Cache::new();
        let sub_classes = Rc::new(SubClasses::from_quads(&quads));
        let transforms = Rc::new(self.transforms);
        let typed = typed_extract(cache.clone(), Rc::clone(&sub_classes), Rc::clone(&transforms));

        seed_builtins(&cache, &typed);
        for (class, lens) in self.custom {
            cache.insert(class, lens);
        }

        let pc = ParsingContext {
            cache: cache.clone(),
            transforms: Rc::clone(&transforms),
            env: self.env,
        };
        let shapes = extract_shapes(quads, &pc)?;
        info!(
            "compiled {} shape(s) over {} class(es), {} subclass link(s)",
            shapes.len(),
            cache.classes().len(),
            sub_classes.len()
        );
        Ok(ShapeSet {
            shapes,
            cache,
            sub_classes,
            transforms,
            typed,
        })
    }
}

fn seed_builtins(cache: &Cache, typed: &Lens<Context, Option<Value>>) {
    let rdfl = RDFL::new();
    cache.insert(rdfl.cbd.as_str(), cbd().map(|quads| Value::Quads(Rc::new(quads))));
    cache.insert(rdfl.path_lens.as_str(), path_parser().map(Value::Path));
    cache.insert(
        rdfl.context.as_str(),
        Lens::new(|ctx: &Context, _memo: &mut Memo| {
            Ok(Value::Record(Record::from([
                ("id".to_string(), Value::Term(ctx.focus().clone())),
                ("quads".to_string(), Value::Quads(Rc::clone(ctx.shared_quads()))),
            ])))
        }),
    );
    cache.insert(
        rdfl.typed_extract.as_str(),
        typed.clone().map(|found| found.unwrap_or(Value::Null)),
    );
}

/// Compiled shapes, ready to extract from data graphs.
pub struct ShapeSet {
    shapes: Vec<Shape>,
    cache: Cache,
    sub_classes: Rc<SubClasses>,
    transforms: Rc<Transforms>,
    typed: Lens<Context, Option<Value>>,
}

impl ShapeSet {
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn sub_classes(&self) -> &SubClasses {
        &self.sub_classes
    }

    /// The lens registered for `class`, without memoization or transform.
    pub fn lens(&self, class: &str) -> Option<Lens<Context, Value>> {
        self.cache.get(class)
    }

    /// Extracts the focus of `ctx` as an instance of `class`.
    pub fn extract(&self, class: &str, ctx: &Context) -> Result<Extraction> {
        if !self.cache.contains(class) {
            return Err(ExtractError::UnknownShapeReference {
                class: class.to_string(),
            });
        }
        let lens = class_lens(class.to_string(), self.cache.clone(), Rc::clone(&self.transforms));
        let mut memo = Memo::new();
        let value = lens.execute(ctx, &mut memo)?;
        Ok(Extraction::new(value, memo))
    }

    /// Extracts the focus of `ctx` by its asserted type. `None` when the node
    /// asserts no type.
    pub fn extract_typed(&self, ctx: &Context) -> Result<Option<Extraction>> {
        let mut memo = Memo::new();
        Ok(self
            .typed
            .execute(ctx, &mut memo)?
            .map(|value| Extraction::new(value, memo)))
    }
}
