// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging throughout the unwinder. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep log wording in one place per subsystem
//! * Provide consistent, structured logging output
//!
//! Logging is strictly a side channel. The execution trace is the record of
//! what the engine did; log output never feeds back into engine decisions.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - frame, signal and run lifecycle events
//! * `messages::lines` - execution line scheduling and abandonment
//! * `messages::actions` - what individual deferred actions observed
//! * `messages::validation` - scenario loading and validation
//!
//! # Usage
//!
//! ```rust
//! use the_unwinder::observability::messages::engine::FrameEntered;
//! use the_unwinder::observability::messages::StructuredLog;
//!
//! let msg = FrameEntered {
//!     frame: "panicker",
//!     depth: 4,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
