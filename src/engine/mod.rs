// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod binding;
pub mod context;
pub mod frame;
pub mod lines;
pub mod payload;
pub mod runner;
pub mod signal;
pub mod trace;
pub mod unwind;
#[cfg(test)]
pub mod integration_tests;

pub use binding::{bind_result, BoundFrom, BoundResult, ResultBinding, ReturnValues};
pub use context::DeferContext;
pub use frame::{FrameDef, FrameHandle, FrameId, FrameStack, Step};
pub use lines::{GroupReport, LineGroup, LineOutcome, LineReport, TerminationPolicy};
pub use payload::{FieldValue, Payload, PayloadKind, StructuredValue};
pub use runner::{run, run_all, RunReport};
pub use signal::{RaiseOrigin, Signal, SignalId};
pub use trace::{ExecutionTrace, TraceEvent, TraceRecorder};
pub use unwind::{EngineReport, EngineState, Outcome, StepResult, UnwindEngine};
