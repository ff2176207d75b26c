use oxigraph::model::{NamedNode, Term};
use std::fmt;

/// Identity of a compiled lens, used as the first part of a memo key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LensID(pub u64);

impl From<u64> for LensID {
    fn from(item: u64) -> Self {
        LensID(item)
    }
}

impl fmt::Display for LensID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// Handle of a result slot in the memo arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotID(pub usize);

impl From<usize> for SlotID {
    fn from(item: usize) -> Self {
        SlotID(item)
    }
}

impl fmt::Display for SlotID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    Iri,
    BlankNode,
    Literal,
    Triple,
}

impl TermKind {
    pub fn of(term: &Term) -> Self {
        match term {
            Term::NamedNode(_) => TermKind::Iri,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
            #[allow(unreachable_patterns)]
            _ => TermKind::Triple,
        }
    }
}

/// The lexical value of a term: the IRI, the blank node label or the literal's
/// lexical form.
pub fn lexical(term: &Term) -> String {
    match term {
        Term::NamedNode(nn) => nn.as_str().to_string(),
        Term::BlankNode(bn) => bn.as_str().to_string(),
        Term::Literal(lit) => lit.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

/// A parsed SHACL property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    Simple(NamedNode),
    Inverse(Box<Path>),
    Sequence(Vec<Path>),
    Alternative(Vec<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    ZeroOrOne(Box<Path>),
}

impl Path {
    /// The path that walks this one backwards.
    ///
    /// The inverse of a sequence is the reversed sequence of inverses.
    pub fn inverse(&self) -> Path {
        match self {
            Path::Simple(_) => Path::Inverse(Box::new(self.clone())),
            Path::Inverse(inner) => (**inner).clone(),
            Path::Sequence(paths) => Path::Sequence(paths.iter().rev().map(Path::inverse).collect()),
            Path::Alternative(paths) => Path::Alternative(paths.iter().map(Path::inverse).collect()),
            Path::ZeroOrMore(inner) => Path::ZeroOrMore(Box::new(inner.inverse())),
            Path::OneOrMore(inner) => Path::OneOrMore(Box::new(inner.inverse())),
            Path::ZeroOrOne(inner) => Path::ZeroOrOne(Box::new(inner.inverse())),
        }
    }

    fn format_named_node_for_sparql(nn: &NamedNode) -> String {
        format!("<{}>", nn.as_str())
    }

    /// Renders the path in SPARQL 1.1 property path syntax.
    pub fn to_sparql_path(&self) -> String {
        match self {
            Path::Simple(nn) => Self::format_named_node_for_sparql(nn),
            Path::Inverse(inner) => format!("^{}", inner.to_sparql_path()),
            // the empty sequence is the identity path
            Path::Sequence(paths) if paths.is_empty() => "(!<>)?".to_string(),
            Path::Sequence(paths) if paths.len() == 1 => paths[0].to_sparql_path(),
            Path::Sequence(paths) => {
                let parts: Vec<String> = paths.iter().map(Path::to_sparql_path).collect();
                format!("({})", parts.join(" / "))
            }
            Path::Alternative(paths) => {
                let parts: Vec<String> = paths.iter().map(Path::to_sparql_path).collect();
                format!("({})", parts.join(" | "))
            }
            Path::ZeroOrMore(inner) => format!("{}*", inner.to_sparql_path()),
            Path::OneOrMore(inner) => format!("{}+", inner.to_sparql_path()),
            Path::ZeroOrOne(inner) => format!("{}?", inner.to_sparql_path()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sparql_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(name: &str) -> Path {
        Path::Simple(NamedNode::new_unchecked(format!("http://example.org/{name}")))
    }

    #[test]
    fn inverse_of_sequence_reverses_segments() {
        let seq = Path::Sequence(vec![p("a"), p("b")]);
        assert_eq!(
            seq.inverse(),
            Path::Sequence(vec![
                Path::Inverse(Box::new(p("b"))),
                Path::Inverse(Box::new(p("a")))
            ])
        );
        assert_eq!(seq.inverse().inverse(), seq);
    }

    #[test]
    fn sparql_rendering() {
        let path = Path::Alternative(vec![
            Path::Sequence(vec![p("a"), p("b")]),
            Path::Inverse(Box::new(p("c"))),
        ]);
        assert_eq!(
            path.to_sparql_path(),
            "((<http://example.org/a> / <http://example.org/b>) | ^<http://example.org/c>)"
        );
        assert_eq!(
            Path::ZeroOrMore(Box::new(p("a"))).to_string(),
            "<http://example.org/a>*"
        );
    }
}
