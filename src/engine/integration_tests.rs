// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::actions::{defer_fn, Announce, RecoverExpecting};
use crate::config::{RecoveryMode, Scenario, StartFunction};
use crate::engine::{
    run, BoundFrom, FrameDef, Payload, PayloadKind, ReturnValues, TraceEvent, UnwindEngine,
};
use crate::engine::lines::{LineOutcome, TerminationPolicy};
use crate::traits::DeferOutcome;

/// End-to-end runs of the default call chain and hand-built chains
#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(start: &str, recovery: &str, payload: &str) -> Scenario {
        Scenario::from_tags(start, recovery, payload).unwrap()
    }

    #[test]
    fn test_unnamed_basic_recovery_completes_with_zero_value() {
        let report = run(&scenario("unnamed", "basic", "string")).unwrap();

        assert_eq!(report.outcome.result(), Some(&ReturnValues::default()));

        let root = report.trace.frame_named("unnamedReturnVals").unwrap();
        assert_eq!(report.trace.interceptions().len(), 1);
        assert_eq!(report.trace.interceptions()[0].0, root);
        // first, recover, last: run last-registered first
        assert_eq!(report.trace.defer_order(root), vec![2, 1, 0]);
    }

    #[test]
    fn test_enclosing_cleanup_write_is_discarded_on_unnamed_frame() {
        let innermost = FrameDef::new("innermost")
            .raise(Payload::text("Whoops!"))
            .returns(ReturnValues::new(99, "unreached"));
        let enclosing = FrameDef::new("enclosing")
            .defer(defer_fn("recover-and-write", |ctx| {
                ctx.recover();
                ctx.write_result(|values| values.error = Some("recovered".to_string()));
                DeferOutcome::Continue
            }))
            .call(innermost)
            .returns(ReturnValues::new(9, "no panic"));
        let root = FrameDef::new("root")
            .call(enclosing)
            .returns(ReturnValues::new(1, "root"));

        let report = UnwindEngine::start(root).unwrap().run().unwrap();
        assert_eq!(report.outcome.result(), Some(&ReturnValues::new(1, "root")));

        let enclosing = report.trace.frame_named("enclosing").unwrap();
        let bound = report.trace.iter().find_map(|event| match event {
            TraceEvent::ResultBound { frame, value, source } if *frame == enclosing => {
                Some((value.clone(), *source))
            }
            _ => None,
        });
        assert_eq!(bound, Some((ReturnValues::default(), BoundFrom::Zero)));
    }

    #[test]
    fn test_named_seterr_synthesizes_error() {
        let scenario = Scenario::new(
            StartFunction::Named,
            RecoveryMode::SetErrorOnRecover,
            Payload::error("Whoops!"),
        )
        .unwrap();

        let report = run(&scenario).unwrap();
        let result = report.outcome.result().unwrap();
        assert_eq!(result.error.as_deref(), Some("panic recovered"));
        assert_ne!(result.error.as_deref(), Some("Whoops!"));
    }

    #[test]
    fn test_reraise_in_cleanup_terminates_with_second_signal() {
        let scenario = scenario("unnamed", "none", "int").with_reraise_in_cleanup(true);
        let report = run(&scenario).unwrap();

        assert_eq!(report.outcome.payload(), Some(&Payload::text("2nd panic")));
        assert_eq!(
            report.trace.raised_payloads(),
            vec![&Payload::Integer(42), &Payload::text("2nd panic")]
        );

        let first = report
            .trace
            .position(|e| {
                matches!(
                    e,
                    TraceEvent::SignalRaised {
                        payload: Payload::Integer(42),
                        ..
                    }
                )
            })
            .unwrap();
        let replaced = report
            .trace
            .position(|e| matches!(e, TraceEvent::SignalReRaised { .. }))
            .unwrap();
        assert!(first < replaced);
    }

    #[test]
    fn test_no_recovery_terminates_without_interceptions() {
        let report = run(&scenario("named", "none", "err")).unwrap();

        assert_eq!(report.outcome.payload(), Some(&Payload::error("an error")));
        assert!(report.trace.interceptions().is_empty());

        // every frame of the chain was unwound, innermost first
        let unwound: Vec<_> = report
            .trace
            .iter()
            .filter_map(|event| match event {
                TraceEvent::FrameUnwound { frame, .. } => report.trace.frame_name(*frame),
                _ => None,
            })
            .collect();
        assert_eq!(
            unwound,
            vec!["panicker", "f3", "f2", "f1", "namedReturnVals"]
        );
    }

    #[test]
    fn test_reraise_is_recovered_by_basic_recovery() {
        let scenario = scenario("named", "basic", "struct").with_reraise_in_cleanup(true);
        let report = run(&scenario).unwrap();

        assert!(report.outcome.is_completed());
        let intercepted = report.trace.interceptions();
        assert_eq!(intercepted.len(), 1);
        assert_eq!(report.trace.raised_payloads().len(), 2);
    }

    #[test]
    fn test_nil_payload_terminates_without_recovery() {
        let report = run(&scenario("unnamed", "none", "nil")).unwrap();
        assert_eq!(report.outcome.payload(), Some(&Payload::None));
    }

    #[test]
    fn test_nil_payload_is_swallowed_by_seterr() {
        let report = run(&scenario("named", "seterr", "nil")).unwrap();

        assert_eq!(report.outcome.result(), Some(&ReturnValues::default()));
        assert_eq!(
            report
                .trace
                .count(|e| matches!(e, TraceEvent::SignalIntercepted { .. })),
            1
        );
    }

    #[test]
    fn test_no_raise_returns_body_value() {
        let report = run(&scenario("named", "seterr", "int").with_raise(false)).unwrap();

        assert_eq!(
            report.outcome.result(),
            Some(&ReturnValues::new(9, "no panic"))
        );
        assert!(report.trace.raised_payloads().is_empty());
    }

    #[test]
    fn test_background_lines_are_abandoned_with_cleanup_unrun() {
        let scenario = scenario("unnamed", "none", "string")
            .with_background_lines(2)
            .unwrap();
        let report = run(&scenario).unwrap();

        assert!(report.is_terminated());
        assert_eq!(report.background.len(), 2);
        for line in &report.background {
            assert_eq!(
                line.outcome,
                LineOutcome::Abandoned {
                    pending_deferred: 1
                }
            );
        }
    }

    #[test]
    fn test_isolated_background_lines_run_their_cleanup() {
        let scenario = scenario("unnamed", "none", "string")
            .with_line_policy(TerminationPolicy::IsolateLine)
            .with_background_lines(2)
            .unwrap();
        let report = run(&scenario).unwrap();

        assert!(report.is_terminated());
        for line in &report.background {
            assert!(line.outcome.outcome().unwrap().is_completed());
            assert_eq!(
                line.trace
                    .count(|e| matches!(e, TraceEvent::DeferRan { .. })),
                1
            );
        }
    }

    #[test]
    fn test_type_assertion_failure_reaches_safe_call() {
        let f97 = FrameDef::named("f97")
            .defer(RecoverExpecting::new(PayloadKind::Error).store_as_error())
            .raise(Payload::text("Whoops"));
        let safe_call = FrameDef::new("safeCall")
            .defer(defer_fn("report", |ctx| {
                let recovered = ctx.recover();
                assert_eq!(
                    recovered,
                    Some(Payload::error(
                        "interface conversion: payload is text, not error"
                    ))
                );
                DeferOutcome::Continue
            }))
            .call(f97);

        let report = UnwindEngine::start(safe_call).unwrap().run().unwrap();
        assert!(report.outcome.is_completed());
    }

    #[test]
    fn test_actions_after_raise_point_never_run() {
        let f99 = FrameDef::new("f99")
            .defer(Announce::new("deferred function 1"))
            .defer(Announce::new("deferred function 2"))
            .raise(Payload::error("Whoops!"))
            .defer(Announce::new("deferred function 3"))
            .returns(ReturnValues::new(99, ""));
        let safe_call = FrameDef::new("safeCall")
            .defer(crate::actions::Recover::new())
            .call(f99);

        let report = UnwindEngine::start(safe_call).unwrap().run().unwrap();
        let f99 = report.trace.frame_named("f99").unwrap();
        assert_eq!(report.trace.defer_order(f99), vec![1, 0]);
        assert!(report.outcome.is_completed());
    }

    #[test]
    fn test_whole_matrix_runs() {
        for scenario in Scenario::matrix() {
            let report = run(&scenario).unwrap();
            if !scenario.raise() {
                assert_eq!(
                    report.outcome.result(),
                    Some(&ReturnValues::new(9, "no panic")),
                    "{}",
                    scenario.name()
                );
            } else if scenario.recovery() == RecoveryMode::None {
                assert!(report.is_terminated(), "{}", scenario.name());
            } else {
                assert!(report.outcome.is_completed(), "{}", scenario.name());
            }
        }
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = run(&scenario("named", "basic", "int")).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"]["outcome"], "completed");
        assert_eq!(json["trace"][0]["event"], "frame_entered");
        assert_eq!(json["trace"][0]["name"], "namedReturnVals");
    }
}
