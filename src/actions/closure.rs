// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt::{Debug, Formatter};

use crate::engine::context::DeferContext;
use crate::traits::{DeferOutcome, DeferredAction};

type DeferFn = dyn Fn(&mut DeferContext<'_>) -> DeferOutcome + Send + Sync;

/// Closure-backed deferred action for ad-hoc call chains.
pub struct FnAction {
    name: String,
    body: Box<DeferFn>,
}

impl FnAction {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut DeferContext<'_>) -> DeferOutcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }
}

impl Debug for FnAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction").field("name", &self.name).finish()
    }
}

impl DeferredAction for FnAction {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        (self.body)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Shorthand for [`FnAction::new`].
///
/// # Example
/// ```
/// use the_unwinder::actions::defer_fn;
/// use the_unwinder::engine::{FrameDef, Payload, UnwindEngine};
/// use the_unwinder::traits::DeferOutcome;
///
/// let root = FrameDef::named("root")
///     .defer(defer_fn("recover-and-count", |ctx| {
///         if ctx.recover().is_some() {
///             ctx.write_result(|values| values.number = 10);
///         }
///         DeferOutcome::Continue
///     }))
///     .raise(Payload::text("Whoops!"));
///
/// let report = UnwindEngine::start(root).unwrap().run().unwrap();
/// assert_eq!(report.outcome.result().unwrap().number, 10);
/// ```
pub fn defer_fn<F>(name: impl Into<String>, body: F) -> FnAction
where
    F: Fn(&mut DeferContext<'_>) -> DeferOutcome + Send + Sync + 'static,
{
    FnAction::new(name, body)
}
