//! The combinator core.
//!
//! A `Lens<I, O>` turns an input (usually a [`Context`]) into an `O` or an
//! [`ExtractError`]. Multi-valued traversals are lenses producing a `Vec`;
//! they get the collapsing and fan-out operators in a dedicated impl block.
//!
//! [`Context`]: crate::context::Context

use crate::error::{ExtractError, Result};
use crate::memo::Memo;
use crate::types::LensID;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LENS_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> LensID {
    LensID(NEXT_LENS_ID.fetch_add(1, Ordering::Relaxed))
}

type LensFn<I, O> = dyn Fn(&I, &mut Memo) -> Result<O>;

pub struct Lens<I, O> {
    id: LensID,
    run: Rc<LensFn<I, O>>,
}

impl<I, O> Clone for Lens<I, O> {
    fn clone(&self) -> Self {
        Lens {
            id: self.id,
            run: Rc::clone(&self.run),
        }
    }
}

impl<I, O> fmt::Debug for Lens<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lens({})", self.id)
    }
}

impl<I: 'static, O: 'static> Lens<I, O> {
    pub fn new(run: impl Fn(&I, &mut Memo) -> Result<O> + 'static) -> Self {
        Lens {
            id: next_id(),
            run: Rc::new(run),
        }
    }

    /// A lens that ignores its input and always yields `value`.
    pub fn constant(value: O) -> Self
    where
        O: Clone,
    {
        Lens::new(move |_, _| Ok(value.clone()))
    }

    /// A lens that always fails with `error`.
    pub fn fail(error: ExtractError) -> Self {
        Lens::new(move |_, _| Err(error.clone()))
    }

    pub fn id(&self) -> LensID {
        self.id
    }

    pub fn execute(&self, input: &I, memo: &mut Memo) -> Result<O> {
        (self.run)(input, memo)
    }

    /// Runs with a fresh memo store.
    pub fn execute_once(&self, input: &I) -> Result<O> {
        self.execute(input, &mut Memo::new())
    }

    pub fn map<P: 'static>(self, f: impl Fn(O) -> P + 'static) -> Lens<I, P> {
        Lens::new(move |input, memo| self.execute(input, memo).map(&f))
    }

    pub fn try_map<P: 'static>(self, f: impl Fn(O) -> Result<P> + 'static) -> Lens<I, P> {
        Lens::new(move |input, memo| self.execute(input, memo).and_then(&f))
    }

    /// Rewrites a failure, with access to the input that caused it.
    pub fn map_err(self, f: impl Fn(ExtractError, &I) -> ExtractError + 'static) -> Lens<I, O> {
        Lens::new(move |input, memo| self.execute(input, memo).map_err(|e| f(e, input)))
    }

    /// Feeds the output of this lens into `next`.
    pub fn then<P: 'static>(self, next: Lens<O, P>) -> Lens<I, P> {
        Lens::new(move |input, memo| {
            let out = self.execute(input, memo)?;
            next.execute(&out, memo)
        })
    }

    /// Binary form of [`or`].
    pub fn or(self, other: Lens<I, O>) -> Lens<I, O> {
        or(vec![self, other])
    }
}

/// Ordered alternation: the first lens that succeeds wins. Errors of earlier
/// attempts are discarded; if all fail the last error is returned.
pub fn or<I: 'static, O: 'static>(lenses: Vec<Lens<I, O>>) -> Lens<I, O> {
    Lens::new(move |input, memo| {
        let mut last = ExtractError::NoAlternative;
        for lens in &lenses {
            match lens.execute(input, memo) {
                Ok(out) => return Ok(out),
                Err(e) => last = e,
            }
        }
        Err(last)
    })
}

/// Runs every lens on the same input; fails on the first failure, otherwise
/// yields all outputs in order.
pub fn and<I: 'static, O: 'static>(lenses: Vec<Lens<I, O>>) -> Lens<I, Vec<O>> {
    Lens::new(move |input, memo| {
        lenses
            .iter()
            .map(|lens| lens.execute(input, memo))
            .collect()
    })
}

/// Ordered alternation over traversals: the first branch that succeeds with
/// at least one hop wins. Branches that fail or come back empty are skipped.
/// All branches empty gives an empty result; all branches failing gives the
/// last error.
pub fn or_all<I: 'static, O: 'static>(lenses: Vec<Lens<I, Vec<O>>>) -> Lens<I, Vec<O>> {
    Lens::new(move |input, memo| {
        let mut last = None;
        let mut any_ok = false;
        for lens in &lenses {
            match lens.execute(input, memo) {
                Ok(out) if !out.is_empty() => return Ok(out),
                Ok(_) => any_ok = true,
                Err(e) => last = Some(e),
            }
        }
        match last {
            Some(e) if !any_ok => Err(e),
            None if lenses.is_empty() => Err(ExtractError::NoAlternative),
            _ => Ok(Vec::new()),
        }
    })
}

impl<I: 'static, O: 'static> Lens<I, Vec<O>> {
    /// Exactly one hop, or `RequiredValueMissing` with the count found.
    pub fn one(self) -> Lens<I, O> {
        self.try_map(|mut items| {
            if items.len() == 1 {
                Ok(items.remove(0))
            } else {
                Err(ExtractError::RequiredValueMissing { found: items.len() })
            }
        })
    }

    /// Like [`Lens::one`], but zero hops yield `default`.
    pub fn one_or(self, default: O) -> Lens<I, O>
    where
        O: Clone,
    {
        self.try_map(move |mut items| match items.len() {
            0 => Ok(default.clone()),
            1 => Ok(items.remove(0)),
            found => Err(ExtractError::RequiredValueMissing { found }),
        })
    }

    /// Applies `elem` to every hop; any element failure fails the whole.
    pub fn then_all<P: 'static>(self, elem: Lens<O, P>) -> Lens<I, Vec<P>> {
        Lens::new(move |input, memo| {
            let items = self.execute(input, memo)?;
            items.iter().map(|item| elem.execute(item, memo)).collect()
        })
    }

    /// Applies `elem` to every hop and keeps the successes.
    pub fn then_some<P: 'static>(self, elem: Lens<O, P>) -> Lens<I, Vec<P>> {
        Lens::new(move |input, memo| {
            let items = self.execute(input, memo)?;
            Ok(items
                .iter()
                .filter_map(|item| elem.execute(item, memo).ok())
                .collect())
        })
    }

    /// Sequential composition of traversals: every hop of `self` expanded by
    /// `next`, concatenated in order.
    pub fn then_flat<P: 'static>(self, next: Lens<O, Vec<P>>) -> Lens<I, Vec<P>> {
        Lens::new(move |input, memo| {
            let mut out = Vec::new();
            for item in self.execute(input, memo)? {
                out.extend(next.execute(&item, memo)?);
            }
            Ok(out)
        })
    }
}
