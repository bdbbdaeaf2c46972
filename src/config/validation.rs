// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scenario validation.
//!
//! Checks run in a fixed order and every failure is collected, so a file with
//! several problems reports all of them in one go:
//!
//! 1. **Tags**: start, recovery and payload tags must each be known
//! 2. **Payload value**: an override must fit the payload tag
//! 3. **Combination**: `seterr` needs a `named` start
//! 4. **Limits**: background lines are capped
//!
//! The combination check only runs when both tags it looks at parsed.

use crate::config::consts::MAX_BACKGROUND_LINES;
use crate::config::loader::ScenarioConfig;
use crate::config::scenario::{PayloadTag, RecoveryMode, StartFunction};
use crate::errors::ConfigError;
use crate::observability::messages::validation::ReRaiseWithoutRaise;
use crate::observability::messages::StructuredLog;

/// Validates a scenario file's contents.
///
/// # Returns
///
/// * `Ok(())` - The scenario can be converted and run
/// * `Err(Vec<ConfigError>)` - Every problem found
pub fn validate_scenario(config: &ScenarioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let start = config
        .start_tag()
        .parse::<StartFunction>()
        .map_err(|e| errors.push(e))
        .ok();
    let recovery = config
        .recovery
        .parse::<RecoveryMode>()
        .map_err(|e| errors.push(e))
        .ok();
    let payload = config
        .payload
        .parse::<PayloadTag>()
        .map_err(|e| errors.push(e))
        .ok();

    if let (Some(tag), Some(value)) = (payload, &config.value) {
        if let Err(e) = tag.payload_with(value) {
            errors.push(e);
        }
    }

    if let (Some(start), Some(recovery)) = (start, recovery) {
        if recovery.requires_named_results() && start != StartFunction::Named {
            errors.push(ConfigError::RecoveryRequiresNamedResults { start, recovery });
        }
    }

    if config.background_lines > MAX_BACKGROUND_LINES {
        errors.push(ConfigError::TooManyBackgroundLines {
            requested: config.background_lines,
            max: MAX_BACKGROUND_LINES,
        });
    }

    if config.panic_in_defer && !config.raise {
        ReRaiseWithoutRaise {
            scenario: config.name.as_deref().unwrap_or("-"),
        }
        .log();
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::scenario::PayloadValue;

    fn config(start: Option<&str>, recovery: &str, payload: &str) -> ScenarioConfig {
        ScenarioConfig {
            start: start.map(str::to_string),
            recovery: recovery.to_string(),
            payload: payload.to_string(),
            ..ScenarioConfig::default()
        }
    }

    #[test]
    fn test_valid_default_config() {
        assert!(validate_scenario(&ScenarioConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_unknown_tags() {
        let errors = validate_scenario(&config(Some("sideways"), "retry", "float")).unwrap_err();

        let fields: Vec<_> = errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::UnknownTag { field, .. } => Some(*field),
                _ => None,
            })
            .collect();
        assert_eq!(fields, vec!["start", "recovery", "payload"]);
    }

    #[test]
    fn test_explicit_unnamed_with_seterr_is_rejected() {
        let errors = validate_scenario(&config(Some("unnamed"), "seterr", "int")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("only works with a starting function of named"));
    }

    #[test]
    fn test_combination_check_skipped_when_tag_unknown() {
        let errors = validate_scenario(&config(Some("bogus"), "seterr", "int")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::UnknownTag { field: "start", .. }));
    }

    #[test]
    fn test_nil_payload_takes_no_value() {
        let mut cfg = config(None, "basic", "nil");
        cfg.value = Some(PayloadValue::Integer(1));

        let errors = validate_scenario(&cfg).unwrap_err();
        assert!(matches!(errors[0], ConfigError::PayloadValueMismatch { .. }));
    }

    #[test]
    fn test_background_line_cap() {
        let mut cfg = ScenarioConfig::default();
        cfg.background_lines = MAX_BACKGROUND_LINES + 1;

        let errors = validate_scenario(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![ConfigError::TooManyBackgroundLines {
                requested: MAX_BACKGROUND_LINES + 1,
                max: MAX_BACKGROUND_LINES,
            }]
        );
    }

    #[test]
    fn test_reraise_without_raise_is_only_a_warning() {
        let mut cfg = ScenarioConfig::default();
        cfg.raise = false;
        cfg.panic_in_defer = true;

        assert!(validate_scenario(&cfg).is_ok());
    }
}
