// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for execution line scheduling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A line group is about to start running.
///
/// # Log Level
/// `info!` - Important operational event
pub struct LineGroupStarted<'a> {
    pub lines: usize,
    pub primary: &'a str,
    pub policy: &'a str,
}

impl Display for LineGroupStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} execution lines (primary '{}', policy {})",
            self.lines, self.primary, self.policy
        )
    }
}

impl StructuredLog for LineGroupStarted<'_> {
    fn log(&self) {
        tracing::info!(
            lines = self.lines,
            primary = self.primary,
            policy = self.policy,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "line_group",
            span_name = name,
            lines = self.lines,
            primary = self.primary,
        )
    }
}

/// A line reached its own end.
///
/// # Log Level
/// `debug!` - Fine-grained scheduling progress
pub struct LineFinished<'a> {
    pub line: &'a str,
    pub terminated: bool,
}

impl Display for LineFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.terminated {
            write!(f, "line '{}' finished by termination", self.line)
        } else {
            write!(f, "line '{}' finished normally", self.line)
        }
    }
}

impl StructuredLog for LineFinished<'_> {
    fn log(&self) {
        tracing::debug!(line = self.line, terminated = self.terminated, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("line_finished", span_name = name, line = self.line)
    }
}

/// A line was abandoned; its pending deferred actions will never run.
///
/// # Log Level
/// `warn!` - Cleanup was skipped
///
/// # Example
/// ```
/// use the_unwinder::observability::messages::lines::LineAbandoned;
///
/// let msg = LineAbandoned {
///     line: "sleeper-1",
///     pending_deferred: 1,
///     cause: "main",
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "line 'sleeper-1' abandoned after 'main' ended: 1 deferred actions never ran"
/// );
/// ```
pub struct LineAbandoned<'a> {
    pub line: &'a str,
    pub pending_deferred: usize,
    pub cause: &'a str,
}

impl Display for LineAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "line '{}' abandoned after '{}' ended: {} deferred actions never ran",
            self.line, self.cause, self.pending_deferred
        )
    }
}

impl StructuredLog for LineAbandoned<'_> {
    fn log(&self) {
        tracing::warn!(
            line = self.line,
            pending_deferred = self.pending_deferred,
            cause = self.cause,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "line_abandoned",
            span_name = name,
            line = self.line,
            pending_deferred = self.pending_deferred,
        )
    }
}
