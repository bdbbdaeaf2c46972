// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

#[cfg(test)]
mod integration_tests {
    use crate::config::{
        load_and_validate_scenario, RecoveryMode, StartFunction,
    };
    use crate::engine::lines::{LineOutcome, TerminationPolicy};
    use crate::engine::{run, Payload, ReturnValues};

    /// Test that the shipped scenario files load and behave as described
    #[test]
    fn test_unnamed_basic_yaml() {
        let scenario = load_and_validate_scenario("configs/unnamed-basic.yaml").unwrap();

        assert_eq!(scenario.name(), "unnamed-basic");
        assert_eq!(scenario.start(), StartFunction::Unnamed);
        assert_eq!(scenario.recovery(), RecoveryMode::Basic);

        let report = run(&scenario).unwrap();
        assert_eq!(report.outcome.result(), Some(&ReturnValues::default()));
    }

    #[test]
    fn test_named_seterr_yaml() {
        let scenario = load_and_validate_scenario("configs/named-seterr.yaml").unwrap();
        assert_eq!(scenario.payload(), &Payload::error("Whoops!"));

        let report = run(&scenario).unwrap();
        assert_eq!(
            report.outcome.result().unwrap().error.as_deref(),
            Some("panic recovered")
        );
    }

    #[test]
    fn test_nil_payload_yaml() {
        let scenario = load_and_validate_scenario("configs/nil-payload.yaml").unwrap();

        // seterr with no start given runs the named variant
        assert_eq!(scenario.start(), StartFunction::Named);

        let report = run(&scenario).unwrap();
        assert_eq!(report.outcome.result(), Some(&ReturnValues::default()));
    }

    #[test]
    fn test_panic_in_defer_yaml() {
        let scenario = load_and_validate_scenario("configs/panic-in-defer.yaml").unwrap();

        let report = run(&scenario).unwrap();
        assert_eq!(report.outcome.payload(), Some(&Payload::text("2nd panic")));
    }

    #[test]
    fn test_no_panic_yaml() {
        let scenario = load_and_validate_scenario("configs/no-panic.yaml").unwrap();
        assert!(!scenario.raise());

        let report = run(&scenario).unwrap();
        assert_eq!(
            report.outcome.result(),
            Some(&ReturnValues::new(9, "no panic"))
        );
    }

    #[test]
    fn test_background_lines_yaml() {
        let scenario = load_and_validate_scenario("configs/background-lines.yaml").unwrap();
        assert_eq!(scenario.line_policy(), TerminationPolicy::AbortGroup);

        let report = run(&scenario).unwrap();
        assert!(report.is_terminated());
        assert!(report
            .background
            .iter()
            .all(|line| matches!(line.outcome, LineOutcome::Abandoned { .. })));
    }

    #[test]
    fn test_isolated_lines_toml() {
        let scenario = load_and_validate_scenario("configs/isolated-lines.toml").unwrap();
        assert_eq!(scenario.line_policy(), TerminationPolicy::IsolateLine);
        assert_eq!(
            scenario.payload().to_string(),
            "panicStruct{i: 7, s: \"seven\"}"
        );

        let report = run(&scenario).unwrap();
        assert!(report.outcome.is_completed());
        assert_eq!(report.background.len(), 2);
        assert!(report
            .background
            .iter()
            .all(|line| line.outcome.outcome().is_some()));
    }
}
