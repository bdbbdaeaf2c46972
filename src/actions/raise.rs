// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::context::DeferContext;
use crate::engine::payload::Payload;
use crate::traits::{DeferOutcome, DeferredAction};

/// Raise - raises a new signal from cleanup
///
/// Whatever signal is still active when this runs is discarded in favour of
/// the new one.
#[derive(Debug, Clone)]
pub struct Raise {
    payload: Payload,
    only_when_unwinding: bool,
}

impl Raise {
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            only_when_unwinding: false,
        }
    }

    /// Only raise if a signal is active when the action runs.
    pub fn when_unwinding(mut self) -> Self {
        self.only_when_unwinding = true;
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl DeferredAction for Raise {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        if self.only_when_unwinding && !ctx.is_unwinding() {
            return DeferOutcome::Continue;
        }
        DeferOutcome::Raise(self.payload.clone())
    }

    fn name(&self) -> &str {
        "raise"
    }
}
