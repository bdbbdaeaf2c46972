// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine invariant violations.
//!
//! None of these are reachable through a correct engine. A raised signal that
//! reaches the root is *not* an error; it is reported as
//! `Outcome::Terminated`.

use thiserror::Error;

use crate::engine::frame::FrameId;
use crate::engine::signal::SignalId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The frame being exited is not the top of the stack.
    #[error("frame stack corrupted: expected {expected} on top, found {found:?}")]
    StackCorrupted {
        expected: FrameId,
        found: Option<FrameId>,
    },

    #[error("attempted to pop an empty frame stack")]
    EmptyStack,

    /// A handle outlived its frame.
    #[error("stale frame handle: {frame} is no longer on the stack")]
    StaleFrameHandle { frame: FrameId },

    #[error("signal {signal} intercepted twice (second time in {frame})")]
    DoubleInterception { signal: SignalId, frame: FrameId },

    /// A frame completed without a body value and without an interception.
    #[error("{frame} completed without producing a result")]
    MissingResult { frame: FrameId },

    /// The body cursor and the frame stack disagree about the current frame.
    #[error("body cursor out of sync with frame stack at {frame}")]
    CursorMismatch { frame: FrameId },

    /// A line was abandoned or left unfinished where a finished run was required.
    #[error("line '{line}' did not finish")]
    LineUnfinished { line: String },

    #[error("line name '{line}' is used more than once")]
    DuplicateLine { line: String },
}
