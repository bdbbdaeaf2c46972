// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it at its documented level with structured
//! fields attached.
//!
//! # Organization
//!
//! * `engine` - frame, signal and run lifecycle events
//! * `lines` - execution line scheduling
//! * `actions` - deferred action observations
//! * `validation` - scenario loading and validation

use tracing::Span;

pub mod actions;
pub mod engine;
pub mod lines;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its documented level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
