// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::context::DeferContext;
use crate::engine::payload::Payload;

/// What a deferred action asks the engine to do once it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferOutcome {
    Continue,
    /// Raise a new signal. Any signal still active on the frame is discarded.
    Raise(Payload),
}

/// A cleanup unit registered on a frame and run exactly once when that frame
/// exits, last-registered first.
///
/// Running does not stop a signal. Only calling [`DeferContext::recover`]
/// intercepts.
pub trait DeferredAction: Send + Sync {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome;

    fn name(&self) -> &str;
}
