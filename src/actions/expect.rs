// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::context::DeferContext;
use crate::engine::payload::{Payload, PayloadKind};
use crate::observability::messages::actions::{
    ErrorResultSet, PayloadKindMismatch, RecoverReturnedNil, Recovered,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DeferOutcome, DeferredAction};

/// RecoverExpecting - recovers, then insists on a payload kind
///
/// A payload of any other kind is not a crash: the action raises a new
/// `Payload::Error` describing the failed conversion, which then unwinds from
/// this frame like any other signal.
#[derive(Debug, Clone)]
pub struct RecoverExpecting {
    expected: PayloadKind,
    store_as_error: bool,
}

impl RecoverExpecting {
    pub fn new(expected: PayloadKind) -> Self {
        Self {
            expected,
            store_as_error: false,
        }
    }

    /// On a match, write the payload's message into the result's error.
    pub fn store_as_error(mut self) -> Self {
        self.store_as_error = true;
        self
    }

    pub fn expected(&self) -> PayloadKind {
        self.expected
    }

    pub fn conversion_error(expected: PayloadKind, found: PayloadKind) -> Payload {
        Payload::error(format!(
            "interface conversion: payload is {}, not {}",
            found, expected
        ))
    }
}

impl DeferredAction for RecoverExpecting {
    fn run(&self, ctx: &mut DeferContext<'_>) -> DeferOutcome {
        let payload = match ctx.recover() {
            Some(Payload::None) => {
                RecoverReturnedNil {
                    frame: ctx.frame_name(),
                    swallowed: true,
                }
                .log();
                return DeferOutcome::Continue;
            }
            Some(payload) => payload,
            None => {
                RecoverReturnedNil {
                    frame: ctx.frame_name(),
                    swallowed: false,
                }
                .log();
                return DeferOutcome::Continue;
            }
        };

        if payload.kind() != self.expected {
            PayloadKindMismatch {
                frame: ctx.frame_name(),
                expected: self.expected,
                found: payload.kind(),
            }
            .log();
            return DeferOutcome::Raise(Self::conversion_error(self.expected, payload.kind()));
        }

        Recovered {
            frame: ctx.frame_name(),
            payload: &payload,
        }
        .log();

        if self.store_as_error {
            let message = payload.to_string();
            ErrorResultSet {
                frame: ctx.frame_name(),
                error: &message,
            }
            .log();
            ctx.write_result(|values| values.error = Some(message));
        }
        DeferOutcome::Continue
    }

    fn name(&self) -> &str {
        "recover_expecting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FrameDef, ReturnValues, TraceEvent, UnwindEngine};

    fn f9x(raised: Payload) -> FrameDef {
        FrameDef::named("f98")
            .defer(RecoverExpecting::new(PayloadKind::Error).store_as_error())
            .raise(raised)
    }

    #[test]
    fn test_matching_kind_is_stored_as_error() {
        let report = UnwindEngine::start(f9x(Payload::error("Whoops")))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(
            report.outcome.result(),
            Some(&ReturnValues::default().with_error("Whoops"))
        );
    }

    #[test]
    fn test_mismatch_raises_conversion_signal() {
        let report = UnwindEngine::start(f9x(Payload::text("Whoops")))
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(
            report.outcome.payload(),
            Some(&Payload::error(
                "interface conversion: payload is text, not error"
            ))
        );
        // The first signal was intercepted, so nothing was replaced.
        assert_eq!(report.trace.interceptions().len(), 1);
        assert_eq!(
            report
                .trace
                .count(|e| matches!(e, TraceEvent::SignalReRaised { .. })),
            0
        );
    }

    #[test]
    fn test_mismatch_is_caught_by_an_outer_recover() {
        let safe_call = FrameDef::new("safeCall")
            .defer(crate::actions::Recover::new())
            .call(f9x(Payload::text("Whoops")))
            .returns(ReturnValues::new(1, "unreached"));

        let report = UnwindEngine::start(safe_call).unwrap().run().unwrap();
        assert!(report.outcome.is_completed());
        assert_eq!(report.trace.interceptions().len(), 2);
    }
}
