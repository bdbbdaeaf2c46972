// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::context::DeferContext;
use crate::observability::messages::{actions::DeferredAnnounced, StructuredLog};
use crate::traits::{DeferOutcome, DeferredAction};

/// Announce - runs without ever consulting the signal
#[derive(Debug, Clone)]
pub struct Announce {
    label: String,
}

impl Announce {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl DeferredAction for Announce {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        DeferredAnnounced {
            frame: ctx.frame_name(),
            label: &self.label,
        }
        .log();
        DeferOutcome::Continue
    }

    fn name(&self) -> &str {
        "announce"
    }
}
