// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::context::DeferContext;
use crate::engine::payload::Payload;
use crate::observability::messages::actions::{ErrorResultSet, RecoverReturnedNil, Recovered};
use crate::observability::messages::StructuredLog;
use crate::traits::{DeferOutcome, DeferredAction};

/// Intercepts the active signal and reports what came back.
///
/// Returns the payload when there was something to report. A signal raised
/// with `Payload::None` is still stopped, but to a nil-check it looks exactly
/// like no signal at all, so it is reported as nothing.
fn recover_and_report(ctx: &mut DeferContext<'_>) -> Option<Payload> {
    match ctx.recover() {
        Some(Payload::None) => {
            RecoverReturnedNil {
                frame: ctx.frame_name(),
                swallowed: true,
            }
            .log();
            None
        }
        Some(payload) => {
            Recovered {
                frame: ctx.frame_name(),
                payload: &payload,
            }
            .log();
            Some(payload)
        }
        None => {
            RecoverReturnedNil {
                frame: ctx.frame_name(),
                swallowed: false,
            }
            .log();
            None
        }
    }
}

/// Recover - stops the active signal and reports it
#[derive(Debug, Clone, Default)]
pub struct Recover;

impl Recover {
    pub fn new() -> Self {
        Self
    }
}

impl DeferredAction for Recover {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        recover_and_report(ctx);
        DeferOutcome::Continue
    }

    fn name(&self) -> &str {
        "recover"
    }
}

/// RecoverAndSetError - stops the active signal and writes an error into the
/// frame's result
///
/// The write only reaches the caller when the frame has named results. A
/// `Payload::None` signal is stopped without writing anything.
#[derive(Debug, Clone)]
pub struct RecoverAndSetError {
    message: String,
}

impl RecoverAndSetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl DeferredAction for RecoverAndSetError {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        if recover_and_report(ctx).is_some() {
            ErrorResultSet {
                frame: ctx.frame_name(),
                error: &self.message,
            }
            .log();
            let message = self.message.clone();
            ctx.write_result(|values| values.error = Some(message));
        }
        DeferOutcome::Continue
    }

    fn name(&self) -> &str {
        "recover_and_set_error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FrameDef, ReturnValues, TraceEvent, UnwindEngine};

    #[test]
    fn test_recover_with_nothing_active_is_a_no_op() {
        let root = FrameDef::new("root")
            .defer(Recover::new())
            .returns(ReturnValues::new(9, "no panic"));

        let report = UnwindEngine::start(root).unwrap().run().unwrap();
        assert_eq!(
            report.outcome.result(),
            Some(&ReturnValues::new(9, "no panic"))
        );
        assert!(report.trace.interceptions().is_empty());
    }

    #[test]
    fn test_set_error_writes_on_named_frame() {
        let root = FrameDef::named("namedReturnVals")
            .defer(RecoverAndSetError::new("panic recovered"))
            .raise(Payload::Integer(42));

        let report = UnwindEngine::start(root).unwrap().run().unwrap();
        assert_eq!(
            report.outcome.result(),
            Some(&ReturnValues::default().with_error("panic recovered"))
        );
    }

    #[test]
    fn test_set_error_swallows_none_payload_without_writing() {
        let root = FrameDef::named("namedReturnVals")
            .defer(RecoverAndSetError::new("panic recovered"))
            .raise(Payload::None);

        let report = UnwindEngine::start(root).unwrap().run().unwrap();
        assert_eq!(report.outcome.result(), Some(&ReturnValues::default()));
        assert_eq!(
            report
                .trace
                .count(|e| matches!(e, TraceEvent::SignalIntercepted { .. })),
            1
        );
    }
}
