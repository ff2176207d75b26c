//! The property-path algebra.
//!
//! Parsing reads a path description from the shapes graph into a [`Path`];
//! compiling turns a `Path` into a multi-valued lens over the data graph.

use crate::context::Context;
use crate::error::{ExtractError, Result};
use crate::lens::{or, or_all, Lens};
use crate::memo::Memo;
use crate::named_nodes::{RDF, SHACL};
use crate::types::Path;
use oxigraph::model::{NamedNode, Term};
use std::collections::HashSet;

/// Decodes the RDF list whose head is the focus node into one context per
/// member, in order.
///
/// A cell without exactly one `rdf:first` and one `rdf:rest`, or a cell seen
/// twice, is a malformed list.
pub fn rdf_list() -> Lens<Context, Vec<Context>> {
    Lens::new(|ctx: &Context, _memo: &mut Memo| {
        let rdf = RDF::new();
        let mut items = Vec::new();
        let mut seen = HashSet::new();
        let mut cell = ctx.clone();
        loop {
            if matches!(cell.focus(), Term::NamedNode(nn) if nn.as_ref() == rdf.nil) {
                return Ok(items);
            }
            let malformed = |reason: &str| ExtractError::MalformedList {
                node: cell.focus().to_string(),
                reason: reason.to_string(),
            };
            if !seen.insert(cell.focus().clone()) {
                return Err(malformed("list cell revisited"));
            }
            let first = cell.objects(rdf.first);
            let rest = cell.objects(rdf.rest);
            match (first.as_slice(), rest.as_slice()) {
                ([first], [rest]) => {
                    items.push(cell.with_focus(first.clone()));
                    cell = cell.with_focus(rest.clone());
                }
                ([], _) => return Err(malformed("missing rdf:first")),
                (_, []) => return Err(malformed("missing rdf:rest")),
                _ => return Err(malformed("more than one rdf:first or rdf:rest")),
            }
        }
    })
}

fn is_list_head(ctx: &Context) -> bool {
    let rdf = RDF::new();
    match ctx.focus() {
        Term::NamedNode(nn) => nn.as_ref() == rdf.nil || ctx.object(rdf.first).is_some(),
        Term::BlankNode(_) => ctx.object(rdf.first).is_some(),
        _ => false,
    }
}

fn not_a(form: &str, ctx: &Context) -> ExtractError {
    ExtractError::InvalidPath {
        node: format!("{} (not {form})", ctx.focus()),
    }
}

/// `( p1 p2 ... )`: an RDF list of paths, walked left to right.
fn sequence_path() -> Lens<Context, Path> {
    Lens::new(|ctx: &Context, memo: &mut Memo| {
        if !is_list_head(ctx) {
            return Err(not_a("a sequence", ctx));
        }
        let members = rdf_list().then_all(path_parser()).execute(ctx, memo)?;
        Ok(Path::Sequence(members))
    })
}

/// `[ sh:alternativePath ( p1 p2 ... ) ]`
fn alternative_path() -> Lens<Context, Path> {
    Lens::new(|ctx: &Context, memo: &mut Memo| {
        let shacl = SHACL::new();
        let head = ctx
            .object(shacl.alternative_path)
            .ok_or_else(|| not_a("an alternative", ctx))?;
        let options = rdf_list()
            .then_all(path_parser())
            .execute(&ctx.with_focus(head), memo)?;
        Ok(Path::Alternative(options))
    })
}

/// `[ sh:inversePath p ]`, where `p` is a predicate or a sequence.
fn inverse_path() -> Lens<Context, Path> {
    Lens::new(|ctx: &Context, memo: &mut Memo| {
        let shacl = SHACL::new();
        let inner = ctx
            .object(shacl.inverse_path)
            .ok_or_else(|| not_a("an inverse", ctx))?;
        let inner = path_parser().execute(&ctx.with_focus(inner), memo)?;
        Ok(inner.inverse())
    })
}

/// `[ sh:zeroOrMorePath p ]` and its siblings.
fn repeated_path() -> Lens<Context, Path> {
    Lens::new(|ctx: &Context, memo: &mut Memo| {
        let shacl = SHACL::new();
        let forms: [(_, fn(Box<Path>) -> Path); 3] = [
            (shacl.zero_or_more_path, Path::ZeroOrMore),
            (shacl.one_or_more_path, Path::OneOrMore),
            (shacl.zero_or_one_path, Path::ZeroOrOne),
        ];
        for (predicate, build) in forms {
            if let Some(inner) = ctx.object(predicate) {
                let inner = path_parser().execute(&ctx.with_focus(inner), memo)?;
                return Ok(build(Box::new(inner)));
            }
        }
        Err(not_a("a repetition", ctx))
    })
}

/// A bare IRI used as a forward predicate.
fn predicate_path() -> Lens<Context, Path> {
    Lens::new(|ctx: &Context, _memo: &mut Memo| match ctx.focus() {
        Term::NamedNode(nn) => Ok(Path::Simple(nn.clone())),
        other => Err(ExtractError::InvalidPath {
            node: other.to_string(),
        }),
    })
}

/// Parses the path description at the focus of a shapes-graph context.
/// The forms are tried in a fixed order and the first that applies wins.
///
/// A list head is always read as a sequence, so a broken list reports its
/// own error instead of falling through to the other forms.
pub fn path_parser() -> Lens<Context, Path> {
    let sequence = sequence_path();
    let others = or(vec![
        alternative_path(),
        inverse_path(),
        repeated_path(),
        predicate_path(),
    ]);
    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        if is_list_head(ctx) {
            sequence.execute(ctx, memo)
        } else {
            others.execute(ctx, memo)
        }
    })
}

/// Every object `o` with `focus predicate o`.
pub fn pred(predicate: NamedNode) -> Lens<Context, Vec<Context>> {
    Lens::new(move |ctx: &Context, _memo: &mut Memo| {
        Ok(ctx
            .objects(predicate.as_ref())
            .into_iter()
            .map(|o| ctx.with_focus(o))
            .collect())
    })
}

/// Every subject `s` with `s predicate focus`.
pub fn inverse_pred(predicate: NamedNode) -> Lens<Context, Vec<Context>> {
    Lens::new(move |ctx: &Context, _memo: &mut Memo| {
        Ok(ctx
            .subjects(predicate.as_ref())
            .into_iter()
            .map(|s| ctx.with_focus(s))
            .collect())
    })
}

/// The focus node itself.
pub fn identity() -> Lens<Context, Vec<Context>> {
    Lens::new(|ctx: &Context, _memo: &mut Memo| Ok(vec![ctx.clone()]))
}

/// Breadth-first repetition of `step`, without revisiting nodes.
fn closure_of(step: Lens<Context, Vec<Context>>, reflexive: bool) -> Lens<Context, Vec<Context>> {
    Lens::new(move |ctx: &Context, memo: &mut Memo| {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if reflexive {
            seen.insert(ctx.focus().clone());
            out.push(ctx.clone());
        }
        let mut frontier = vec![ctx.clone()];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for node in &frontier {
                for hop in step.execute(node, memo)? {
                    if seen.insert(hop.focus().clone()) {
                        out.push(hop.clone());
                        next.push(hop);
                    }
                }
            }
            frontier = next;
        }
        Ok(out)
    })
}

impl Path {
    /// Compiles the path into a traversal over the data graph.
    pub fn to_lens(&self) -> Lens<Context, Vec<Context>> {
        match self {
            Path::Simple(p) => pred(p.clone()),
            Path::Inverse(inner) => match inner.as_ref() {
                Path::Simple(p) => inverse_pred(p.clone()),
                other => other.inverse().to_lens(),
            },
            Path::Sequence(paths) => paths
                .iter()
                .fold(identity(), |acc, p| acc.then_flat(p.to_lens())),
            Path::Alternative(paths) => or_all(paths.iter().map(Path::to_lens).collect()),
            Path::ZeroOrMore(inner) => closure_of(inner.to_lens(), true),
            Path::OneOrMore(inner) => closure_of(inner.to_lens(), false),
            Path::ZeroOrOne(inner) => {
                let step = inner.to_lens();
                Lens::new(move |ctx: &Context, memo: &mut Memo| {
                    let mut out = vec![ctx.clone()];
                    out.extend(
                        step.execute(ctx, memo)?
                            .into_iter()
                            .filter(|hop| hop.focus() != ctx.focus()),
                    );
                    Ok(out)
                })
            }
        }
    }
}

/// Parses the path description at the focus of `ctx` and compiles it.
pub fn shacl_path() -> Lens<Context, (Path, Lens<Context, Vec<Context>>)> {
    path_parser().map(|path| {
        let lens = path.to_lens();
        (path, lens)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iri, parse_turtle};
    use std::rc::Rc;

    const PREFIXES: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix ex: <http://example.org/> .
    "#;

    fn parse_path_at(shapes: &str, subject: &str) -> Result<Path> {
        let quads = Rc::new(parse_turtle(&format!("{PREFIXES}{shapes}")));
        let ctx = Context::new(iri(subject), quads);
        let path_term = ctx
            .object(SHACL::new().path)
            .expect("shape has sh:path");
        path_parser().execute_once(&ctx.with_focus(path_term))
    }

    fn ex(name: &str) -> NamedNode {
        iri(&format!("http://example.org/{name}"))
    }

    fn foci(hops: &[Context]) -> Vec<String> {
        hops.iter().map(|c| c.focus().to_string()).collect()
    }

    #[test]
    fn parses_every_form_in_priority_order() {
        let path = parse_path_at(
            "ex:s sh:path ( ex:p1 [ sh:inversePath ex:p2 ] [ sh:alternativePath ( ex:a ex:b ) ] [ sh:zeroOrMorePath ex:c ] ) .",
            "http://example.org/s",
        )
        .unwrap();
        assert_eq!(
            path,
            Path::Sequence(vec![
                Path::Simple(ex("p1")),
                Path::Inverse(Box::new(Path::Simple(ex("p2")))),
                Path::Alternative(vec![Path::Simple(ex("a")), Path::Simple(ex("b"))]),
                Path::ZeroOrMore(Box::new(Path::Simple(ex("c")))),
            ])
        );
    }

    #[test]
    fn inverse_of_sequence_is_reversed() {
        let path = parse_path_at(
            "ex:s sh:path [ sh:inversePath ( ex:p1 ex:p2 ) ] .",
            "http://example.org/s",
        )
        .unwrap();
        assert_eq!(
            path,
            Path::Sequence(vec![
                Path::Inverse(Box::new(Path::Simple(ex("p2")))),
                Path::Inverse(Box::new(Path::Simple(ex("p1")))),
            ])
        );
    }

    #[test]
    fn empty_list_is_identity() {
        let path = parse_path_at("ex:s sh:path () .", "http://example.org/s").unwrap();
        assert_eq!(path, Path::Sequence(vec![]));
        let data = Rc::new(parse_turtle(""));
        let ctx = Context::new(ex("x"), data);
        assert_eq!(foci(&path.to_lens().execute_once(&ctx).unwrap()), vec!["<http://example.org/x>"]);
    }

    #[test]
    fn blank_node_without_path_form_is_invalid() {
        let err = parse_path_at("ex:s sh:path [ ex:unrelated 1 ] .", "http://example.org/s");
        assert!(matches!(err, Err(ExtractError::InvalidPath { .. })));
    }

    #[test]
    fn cyclic_list_is_rejected() {
        let quads = Rc::new(parse_turtle(&format!(
            "{PREFIXES} @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
             ex:l rdf:first ex:p ; rdf:rest ex:l ."
        )));
        let ctx = Context::new(ex("l"), quads);
        assert!(matches!(
            rdf_list().execute_once(&ctx),
            Err(ExtractError::MalformedList { .. })
        ));
    }

    #[test]
    fn repetition_tells_iris_from_literals_with_the_same_text() {
        let data = Rc::new(parse_turtle(&format!(
            "{PREFIXES} ex:a ex:p ex:x, \"http://example.org/x\" ."
        )));
        let ctx = Context::new(ex("a"), data);
        let hops = Path::OneOrMore(Box::new(Path::Simple(ex("p"))))
            .to_lens()
            .execute_once(&ctx)
            .unwrap();
        assert_eq!(hops.len(), 2);
        let hops = Path::ZeroOrMore(Box::new(Path::Simple(ex("p"))))
            .to_lens()
            .execute_once(&ctx)
            .unwrap();
        assert_eq!(hops.len(), 3);
    }

    #[test]
    fn broken_sequence_reports_the_list_error() {
        for list in [
            "_:l rdf:first ex:p ; rdf:rest _:l .",
            "_:l rdf:first ex:p .",
            "_:l rdf:first ex:p ; rdf:rest _:m . _:m rdf:rest rdf:nil .",
        ] {
            let shapes = format!(
                "@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
                 ex:S sh:path _:l . {list}"
            );
            let err = parse_path_at(&shapes, "http://example.org/S");
            assert!(
                matches!(err, Err(ExtractError::MalformedList { .. })),
                "{list}: {err:?}"
            );
        }
    }

    #[test]
    fn sequence_fans_out_in_discovery_order() {
        let data = Rc::new(parse_turtle(&format!(
            "{PREFIXES}
             ex:f ex:p1 ex:a1, ex:a2 .
             ex:a1 ex:p2 ex:b1, ex:b2 .
             ex:a2 ex:p2 ex:b3, ex:b4 ."
        )));
        let path = Path::Sequence(vec![Path::Simple(ex("p1")), Path::Simple(ex("p2"))]);
        let hops = path.to_lens().execute_once(&Context::new(ex("f"), data)).unwrap();
        assert_eq!(
            foci(&hops),
            vec![
                "<http://example.org/b1>",
                "<http://example.org/b2>",
                "<http://example.org/b3>",
                "<http://example.org/b4>"
            ]
        );
    }

    #[test]
    fn inverse_sequence_walks_back() {
        let data = Rc::new(parse_turtle(&format!(
            "{PREFIXES} ex:f ex:p1 ex:a . ex:a ex:p2 ex:b ."
        )));
        let forward = Path::Sequence(vec![Path::Simple(ex("p1")), Path::Simple(ex("p2"))]);
        let ctx = Context::new(ex("f"), Rc::clone(&data));
        assert_eq!(
            foci(&forward.to_lens().execute_once(&ctx).unwrap()),
            vec!["<http://example.org/b>"]
        );
        let back = Path::Inverse(Box::new(forward));
        let from_b = Context::new(ex("b"), data);
        assert_eq!(
            foci(&back.to_lens().execute_once(&from_b).unwrap()),
            vec!["<http://example.org/f>"]
        );
    }

    #[test]
    fn alternative_takes_first_branch_with_hops() {
        let data = Rc::new(parse_turtle(&format!(
            "{PREFIXES} ex:f ex:b ex:x . ex:f ex:c ex:y ."
        )));
        let path = Path::Alternative(vec![
            Path::Simple(ex("a")),
            Path::Simple(ex("b")),
            Path::Simple(ex("c")),
        ]);
        let ctx = Context::new(ex("f"), data);
        assert_eq!(
            foci(&path.to_lens().execute_once(&ctx).unwrap()),
            vec!["<http://example.org/x>"]
        );
    }

    #[test]
    fn repetition_terminates_on_cycles() {
        let data = Rc::new(parse_turtle(&format!(
            "{PREFIXES} ex:a ex:next ex:b . ex:b ex:next ex:c . ex:c ex:next ex:a ."
        )));
        let ctx = Context::new(ex("a"), data);
        let star = Path::ZeroOrMore(Box::new(Path::Simple(ex("next"))));
        assert_eq!(star.to_lens().execute_once(&ctx).unwrap().len(), 3);
        let plus = Path::OneOrMore(Box::new(Path::Simple(ex("next"))));
        assert_eq!(
            foci(&plus.to_lens().execute_once(&ctx).unwrap()),
            vec![
                "<http://example.org/b>",
                "<http://example.org/c>",
                "<http://example.org/a>"
            ]
        );
        let opt = Path::ZeroOrOne(Box::new(Path::Simple(ex("next"))));
        assert_eq!(opt.to_lens().execute_once(&ctx).unwrap().len(), 2);
    }
}
