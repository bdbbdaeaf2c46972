// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for what individual deferred actions observe.
//!
//! At `info` level these read as a running narration of the unwind.

use crate::engine::payload::{Payload, PayloadKind};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A deferred action ran without looking at the signal.
///
/// # Log Level
/// `info!` - Narration
pub struct DeferredAnnounced<'a> {
    pub frame: &'a str,
    pub label: &'a str,
}

impl Display for DeferredAnnounced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}(deferred) - {}", self.frame, self.label)
    }
}

impl StructuredLog for DeferredAnnounced<'_> {
    fn log(&self) {
        tracing::info!(frame = self.frame, label = self.label, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("deferred", span_name = name, frame = self.frame)
    }
}

/// A recovery action got something back.
///
/// # Log Level
/// `info!` - Narration
pub struct Recovered<'a> {
    pub frame: &'a str,
    pub payload: &'a Payload,
}

impl Display for Recovered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}(deferred) - recovered, signal value: {}",
            self.frame, self.payload
        )
    }
}

impl StructuredLog for Recovered<'_> {
    fn log(&self) {
        tracing::info!(
            frame = self.frame,
            payload = %self.payload.describe(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("recovered", span_name = name, frame = self.frame)
    }
}

/// A recovery action's nil-check saw nothing.
///
/// Logged both when there was no signal and when a `None` payload was
/// intercepted. In the second case the signal has been stopped even though
/// the action reports nothing; `swallowed` says which case it was.
///
/// # Log Level
/// `info!` for no signal, `warn!` when a `None` payload was swallowed
pub struct RecoverReturnedNil<'a> {
    pub frame: &'a str,
    pub swallowed: bool,
}

impl Display for RecoverReturnedNil<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.swallowed {
            write!(
                f,
                "{}(deferred) - recover returned nil (a signal raised with nil was stopped)",
                self.frame
            )
        } else {
            write!(f, "{}(deferred) - recover returned nil", self.frame)
        }
    }
}

impl StructuredLog for RecoverReturnedNil<'_> {
    fn log(&self) {
        if self.swallowed {
            tracing::warn!(frame = self.frame, swallowed = true, "{}", self);
        } else {
            tracing::info!(frame = self.frame, swallowed = false, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "recover_returned_nil",
            span_name = name,
            frame = self.frame,
            swallowed = self.swallowed,
        )
    }
}

/// A recovery action set the frame's error result.
///
/// # Log Level
/// `info!` - Narration
pub struct ErrorResultSet<'a> {
    pub frame: &'a str,
    pub error: &'a str,
}

impl Display for ErrorResultSet<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}(deferred) - setting error: {}", self.frame, self.error)
    }
}

impl StructuredLog for ErrorResultSet<'_> {
    fn log(&self) {
        tracing::info!(frame = self.frame, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("error_result_set", span_name = name, frame = self.frame)
    }
}

/// A recovered payload was not the kind the action expected.
///
/// # Log Level
/// `warn!` - A conversion signal is about to be raised
pub struct PayloadKindMismatch<'a> {
    pub frame: &'a str,
    pub expected: PayloadKind,
    pub found: PayloadKind,
}

impl Display for PayloadKindMismatch<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}(deferred) - recovered a {} payload, expected {}",
            self.frame, self.found, self.expected
        )
    }
}

impl StructuredLog for PayloadKindMismatch<'_> {
    fn log(&self) {
        tracing::warn!(
            frame = self.frame,
            expected = %self.expected,
            found = %self.found,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "payload_kind_mismatch",
            span_name = name,
            frame = self.frame,
            expected = %self.expected,
            found = %self.found,
        )
    }
}
