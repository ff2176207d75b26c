use crate::cbd;
use crate::named_nodes::RDF;
use oxigraph::model::{NamedNodeRef, NamedOrBlankNode, Quad, Term};
use std::fmt;
use std::rc::Rc;

/// Returns true when a quad subject denotes the given term.
pub(crate) fn is_subject(subject: &NamedOrBlankNode, term: &Term) -> bool {
    match (subject, term) {
        (NamedOrBlankNode::NamedNode(s), Term::NamedNode(t)) => s == t,
        (NamedOrBlankNode::BlankNode(s), Term::BlankNode(t)) => s == t,
        _ => false,
    }
}

/// Formats a `Term` for messages: the local name of an IRI, or the
/// N-Triples form of anything else.
pub(crate) fn format_term_for_label(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => {
            let iri_str = nn.as_str();
            match iri_str.rfind(['#', '/']) {
                Some(idx) if idx + 1 < iri_str.len() => iri_str[idx + 1..].to_string(),
                _ => iri_str.to_string(),
            }
        }
        other => other.to_string(),
    }
}

/// The unit every lens consumes: a focus node and the quads visible from it.
///
/// The quads are shared, so moving the focus along a path never copies the
/// graph.
#[derive(Clone)]
pub struct Context {
    focus: Term,
    quads: Rc<Vec<Quad>>,
}

impl Context {
    pub fn new(focus: impl Into<Term>, quads: Rc<Vec<Quad>>) -> Self {
        Context {
            focus: focus.into(),
            quads,
        }
    }

    /// A context whose visible quads are only the Concise Bounded Description
    /// of `focus` within `quads`.
    pub fn scoped(focus: impl Into<Term>, quads: &[Quad]) -> Self {
        let focus = focus.into();
        let closure = cbd::closure(&focus, quads);
        Context {
            focus,
            quads: Rc::new(closure),
        }
    }

    /// The same visible quads, focused on another node.
    pub fn with_focus(&self, focus: Term) -> Self {
        Context {
            focus,
            quads: Rc::clone(&self.quads),
        }
    }

    pub fn focus(&self) -> &Term {
        &self.focus
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    /// The visible quads as the shared handle, for values that keep them.
    pub fn shared_quads(&self) -> &Rc<Vec<Quad>> {
        &self.quads
    }

    /// Quads whose subject is the focus node, in graph order.
    pub fn outgoing(&self) -> impl Iterator<Item = &Quad> + '_ {
        self.quads
            .iter()
            .filter(move |q| is_subject(&q.subject, &self.focus))
    }

    /// Every `o` such that `focus predicate o`.
    pub fn objects(&self, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        self.outgoing()
            .filter(|q| q.predicate.as_ref() == predicate)
            .map(|q| q.object.clone())
            .collect()
    }

    /// Every `s` such that `s predicate focus`.
    pub fn subjects(&self, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        self.quads
            .iter()
            .filter(|q| q.predicate.as_ref() == predicate && q.object == self.focus)
            .map(|q| Term::from(q.subject.clone()))
            .collect()
    }

    /// The single object for `predicate`, if any. Extra values are ignored.
    pub fn object(&self, predicate: NamedNodeRef<'_>) -> Option<Term> {
        self.outgoing()
            .find(|q| q.predicate.as_ref() == predicate)
            .map(|q| q.object.clone())
    }

    /// The `rdf:type` values asserted for the focus node.
    pub fn types(&self) -> Vec<Term> {
        self.objects(RDF::new().type_)
    }

    pub fn has_type(&self, class: NamedNodeRef<'_>) -> bool {
        let rdf = RDF::new();
        self.outgoing().any(|q| {
            q.predicate.as_ref() == rdf.type_
                && matches!(&q.object, Term::NamedNode(nn) if nn.as_ref() == class)
        })
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("focus", &self.focus)
            .field("quads", &self.quads.len())
            .finish()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iri, parse_turtle};

    #[test]
    fn forward_and_backward_lookups() {
        let quads = parse_turtle(
            r#"
            @prefix ex: <http://example.org/> .
            ex:a ex:p ex:b, ex:c .
            ex:d ex:p ex:b .
            "#,
        );
        let p = iri("http://example.org/p");
        let ctx = Context::new(iri("http://example.org/a"), Rc::new(quads));
        assert_eq!(
            ctx.objects(p.as_ref()),
            vec![
                Term::from(iri("http://example.org/b")),
                Term::from(iri("http://example.org/c"))
            ]
        );
        let b = ctx.with_focus(iri("http://example.org/b").into());
        assert_eq!(
            b.subjects(p.as_ref()),
            vec![
                Term::from(iri("http://example.org/a")),
                Term::from(iri("http://example.org/d"))
            ]
        );
        assert!(b.objects(p.as_ref()).is_empty());
    }

    #[test]
    fn labels_use_local_names() {
        assert_eq!(
            format_term_for_label(&iri("http://example.org/ns#Thing").into()),
            "Thing"
        );
        assert_eq!(
            format_term_for_label(&iri("http://example.org/ns/").into()),
            "http://example.org/ns/"
        );
    }
}
