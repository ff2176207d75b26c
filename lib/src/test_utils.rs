//! Helpers shared by unit and integration tests.

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{NamedNode, Quad};
use std::io::Cursor;

/// Parses an inline Turtle document. Panics on malformed input.
pub fn parse_turtle(ttl: &str) -> Vec<Quad> {
    let parser = RdfParser::from_format(RdfFormat::Turtle)
        .with_base_iri("http://example.org/")
        .expect("static base IRI is valid");
    parser
        .for_reader(Cursor::new(ttl.as_bytes()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("failed to parse test turtle: {e}\n{ttl}"))
}

pub fn iri(value: &str) -> NamedNode {
    NamedNode::new(value).unwrap_or_else(|e| panic!("bad test IRI {value}: {e}"))
}
