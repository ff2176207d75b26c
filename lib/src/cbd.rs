//! Concise Bounded Description: the quads of a node plus, transitively, the
//! quads of every blank node reachable as an object.

use crate::context::{is_subject, Context};
use crate::lens::Lens;
use crate::memo::Memo;
use oxigraph::model::{Quad, Term};
use std::collections::{HashSet, VecDeque};

/// Computes the closure of `focus` over `quads`.
///
/// Each blank node is expanded at most once (the focus itself counts as
/// visited), so cyclic blank-node structures terminate. Quads come out in
/// discovery order; a quad reached along several routes is repeated.
pub fn closure(focus: &Term, quads: &[Quad]) -> Vec<Quad> {
    let mut out = Vec::new();
    let mut visited: HashSet<Term> = HashSet::from([focus.clone()]);
    let mut queue = VecDeque::from([focus.clone()]);

    while let Some(node) = queue.pop_front() {
        for quad in quads.iter().filter(|q| is_subject(&q.subject, &node)) {
            if matches!(quad.object, Term::BlankNode(_)) && visited.insert(quad.object.clone()) {
                queue.push_back(quad.object.clone());
            }
            out.push(quad.clone());
        }
    }
    out
}

/// The closure as a lens over the context's visible quads.
pub fn cbd() -> Lens<Context, Vec<Quad>> {
    Lens::new(|ctx: &Context, _memo: &mut Memo| Ok(closure(ctx.focus(), ctx.quads())))
}
