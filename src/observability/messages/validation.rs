// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for scenario loading and validation.
//!
//! This module contains message types for logging events related to:
//! * Scenario file loading
//! * Validation failures
//! * Settings that are accepted but have no effect

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A scenario file was parsed.
///
/// # Log Level
/// `debug!` - Configuration detail
pub struct ScenarioLoaded<'a> {
    pub path: &'a str,
    pub format: &'a str,
}

impl Display for ScenarioLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Loaded {} scenario from '{}'", self.format, self.path)
    }
}

impl StructuredLog for ScenarioLoaded<'_> {
    fn log(&self) {
        tracing::debug!(path = self.path, format = self.format, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("scenario_loaded", span_name = name, path = self.path)
    }
}

/// A scenario was rejected.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_unwinder::observability::messages::validation::ScenarioRejected;
///
/// let msg = ScenarioRejected {
///     scenario: "named-seterr",
///     issue_count: 1,
///     reason: "recovery type seterr needs named results",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ScenarioRejected<'a> {
    pub scenario: &'a str,
    pub issue_count: usize,
    pub reason: &'a str,
}

impl Display for ScenarioRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scenario '{}' rejected with {} issue(s): {}",
            self.scenario, self.issue_count, self.reason
        )
    }
}

impl StructuredLog for ScenarioRejected<'_> {
    fn log(&self) {
        tracing::error!(
            scenario = self.scenario,
            issue_count = self.issue_count,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "scenario_rejected",
            span_name = name,
            scenario = self.scenario,
            issue_count = self.issue_count,
        )
    }
}

/// A re-raise was requested but nothing is raised, so it never fires.
///
/// # Log Level
/// `warn!` - Accepted but ineffective setting
pub struct ReRaiseWithoutRaise<'a> {
    pub scenario: &'a str,
}

impl Display for ReRaiseWithoutRaise<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scenario '{}' asks to raise again in cleanup but never raises; the cleanup raise is skipped",
            self.scenario
        )
    }
}

impl StructuredLog for ReRaiseWithoutRaise<'_> {
    fn log(&self) {
        tracing::warn!(scenario = self.scenario, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "reraise_without_raise",
            span_name = name,
            scenario = self.scenario,
        )
    }
}
