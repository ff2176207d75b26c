//! Per-call memo store.
//!
//! Results are kept in an arena of slots addressed by `SlotID`. A slot is
//! registered before the computation that fills it runs, so a recursive
//! extraction of the same node through the same lens gets a reference to the
//! unfinished slot instead of recursing forever.

use crate::context::Context;
use crate::error::Result;
use crate::lens::Lens;
use crate::types::{lexical, LensID, SlotID, TermKind};
use crate::value::{Value, PENDING};
use log::trace;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Pending,
    Ready(Value),
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    lens: LensID,
    kind: TermKind,
    value: String,
}

/// Lives for exactly one top-level extraction call.
#[derive(Debug, Default)]
pub struct Memo {
    slots: Vec<Slot>,
    index: HashMap<MemoKey, SlotID>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, id: SlotID) -> Option<&Slot> {
        self.slots.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Follows `Value::Ref` chains. An unfinished or failed slot reads as
    /// `Value::Pending`.
    pub fn resolve<'a>(&'a self, value: &'a Value) -> &'a Value {
        let mut current = value;
        // a slot never refers to itself once finalised, the bound is a guard
        for _ in 0..=self.slots.len() {
            match current {
                Value::Ref(id) => match self.slot(*id) {
                    Some(Slot::Ready(inner)) => current = inner,
                    _ => return PENDING,
                },
                other => return other,
            }
        }
        PENDING
    }

    fn lookup(&self, key: &MemoKey) -> Option<SlotID> {
        self.index.get(key).copied()
    }

    fn reserve(&mut self, key: MemoKey) -> SlotID {
        let id = SlotID(self.slots.len());
        self.slots.push(Slot::Pending);
        self.index.insert(key, id);
        id
    }

    fn fill(&mut self, id: SlotID, value: Value) {
        self.slots[id.0] = Slot::Ready(value);
    }

    /// Fails `from` and every slot reserved after it. Those were all filled
    /// inside the failed run and may hold references to `from`.
    fn rollback(&mut self, from: SlotID) {
        self.index.retain(|_, id| id.0 < from.0);
        for slot in &mut self.slots[from.0..] {
            *slot = Slot::Failed;
        }
    }
}

/// Wraps `lens` so that within one call each (lens, node) pair is computed at
/// most once. The result is always a `Value::Ref` to the shared slot.
pub fn cached(lens: Lens<Context, Value>) -> Lens<Context, Value> {
    Lens::new(move |ctx: &Context, memo: &mut Memo| run_cached(&lens, ctx, memo))
}

pub(crate) fn run_cached(lens: &Lens<Context, Value>, ctx: &Context, memo: &mut Memo) -> Result<Value> {
    let key = MemoKey {
        lens: lens.id(),
        kind: TermKind::of(ctx.focus()),
        value: lexical(ctx.focus()),
    };
    if let Some(id) = memo.lookup(&key) {
        trace!("memo hit {} for {} -> {}", key.lens, ctx.focus(), id);
        return Ok(Value::Ref(id));
    }
    let id = memo.reserve(key);
    match lens.execute(ctx, memo) {
        Ok(value) => {
            memo.fill(id, value);
            Ok(Value::Ref(id))
        }
        Err(e) => {
            trace!("rolling back {} slot(s) from {}", memo.len() - id.0, id);
            memo.rollback(id);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{iri, parse_turtle};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn runs_once_per_node() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let lens = cached(Lens::new(move |_ctx: &Context, _memo: &mut Memo| {
            counter.set(counter.get() + 1);
            Ok(Value::Integer(7))
        }));
        let quads = Rc::new(parse_turtle(""));
        let a = Context::new(iri("http://example.org/a"), Rc::clone(&quads));
        let b = a.with_focus(iri("http://example.org/b").into());

        let mut memo = Memo::new();
        let first = lens.execute(&a, &mut memo).unwrap();
        let second = lens.execute(&a, &mut memo).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert_eq!(memo.resolve(&first), &Value::Integer(7));

        lens.execute(&b, &mut memo).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn recursion_observes_pending_slot() {
        // a lens that extracts itself on the same node terminates and sees a
        // reference to its own unfinished slot
        let quads = Rc::new(parse_turtle(""));
        let ctx = Context::new(iri("http://example.org/a"), quads);
        let inner: Rc<std::cell::RefCell<Option<Lens<Context, Value>>>> = Default::default();
        let handle = Rc::clone(&inner);
        let base = Lens::new(move |ctx: &Context, memo: &mut Memo| {
            let me = handle.borrow().clone().expect("lens installed");
            let seen = run_cached(&me, ctx, memo)?;
            let pending = memo.resolve(&seen) == &Value::Pending;
            Ok(Value::Bool(pending))
        });
        *inner.borrow_mut() = Some(base.clone());

        let mut memo = Memo::new();
        let out = run_cached(&base, &ctx, &mut memo).unwrap();
        assert_eq!(memo.resolve(&out), &Value::Bool(true));
    }

    #[test]
    fn failure_releases_the_key() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let lens = cached(Lens::new(move |_ctx: &Context, _memo: &mut Memo| {
            counter.set(counter.get() + 1);
            Err(crate::error::ExtractError::NoAlternative)
        }));
        let ctx = Context::new(iri("http://example.org/a"), Rc::new(Vec::new()));
        let mut memo = Memo::new();
        assert!(lens.execute(&ctx, &mut memo).is_err());
        assert!(lens.execute(&ctx, &mut memo).is_err());
        assert_eq!(calls.get(), 2);
        assert_eq!(memo.slot(SlotID(0)), Some(&Slot::Failed));
    }

    #[test]
    fn failure_rolls_back_slots_filled_during_the_run() {
        let inner_calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&inner_calls);
        let inner = Lens::new(move |_ctx: &Context, _memo: &mut Memo| {
            counter.set(counter.get() + 1);
            Ok(Value::Integer(1))
        });
        let dependent = inner.clone();
        let outer = Lens::new(move |ctx: &Context, memo: &mut Memo| {
            run_cached(&dependent, ctx, memo)?;
            Err::<Value, _>(crate::error::ExtractError::NoAlternative)
        });
        let ctx = Context::new(iri("http://example.org/a"), Rc::new(Vec::new()));

        let mut memo = Memo::new();
        assert!(run_cached(&outer, &ctx, &mut memo).is_err());
        assert_eq!(memo.slot(SlotID(0)), Some(&Slot::Failed));
        assert_eq!(memo.slot(SlotID(1)), Some(&Slot::Failed));

        // the inner slot is recomputed instead of being served from the failed run
        let again = run_cached(&inner, &ctx, &mut memo).unwrap();
        assert_eq!(inner_calls.get(), 2);
        assert_eq!(memo.resolve(&again), &Value::Integer(1));
    }
}
