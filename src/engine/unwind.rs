// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The unwind state machine.
//!
//! ```text
//!              body step                      body returns
//!   Running(f) ---------> Running(f|callee)   -------------> run f's deferreds
//!       |                                                        |
//!       | Raise(p)                                     no signal | signal left
//!       v                                                        v
//!   Unwinding(f, s) --- run f's deferreds ---> caller Running / Unwinding(caller, s')
//!                                              root:  Completed(result) / Terminated(s')
//! ```
//!
//! Each call to [`UnwindEngine::step`] performs exactly one transition. A
//! transition that exits a frame runs *all* of that frame's deferred actions
//! before returning, so an unwind in progress is never split across steps that
//! another execution line could interleave with in the middle of a frame.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::engine::binding::{bind_result, BoundResult, ResultBinding, ReturnValues};
use crate::engine::context::DeferContext;
use crate::engine::frame::{FrameDef, FrameHandle, FrameId, FrameStack, Step};
use crate::engine::payload::Payload;
use crate::engine::signal::{RaiseOrigin, Signal, SignalId};
use crate::engine::trace::{ExecutionTrace, TraceEvent, TraceRecorder};
use crate::errors::EngineError;
use crate::observability::messages::engine::{
    FrameEntered, LineTerminated, SignalRaised, SignalReplaced,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{DeferOutcome, DeferredAction};

/// Where the engine is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    Running(FrameHandle),
    Unwinding(FrameHandle, Signal),
    Completed(ReturnValues),
    /// A signal reached the root frame without being intercepted.
    Terminated(Signal),
}

/// Final result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed { result: ReturnValues },
    Terminated { signal: SignalId, payload: Payload },
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, Outcome::Terminated { .. })
    }

    pub fn result(&self) -> Option<&ReturnValues> {
        match self {
            Outcome::Completed { result } => Some(result),
            Outcome::Terminated { .. } => None,
        }
    }

    /// Payload of the signal that terminated the line.
    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Outcome::Completed { .. } => None,
            Outcome::Terminated { payload, .. } => Some(payload),
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Completed { result } => write!(f, "completed with {}", result),
            Outcome::Terminated { signal, payload } => {
                write!(f, "terminated by signal {} ({})", signal, payload.describe())
            }
        }
    }
}

/// What a single [`UnwindEngine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Continued,
    /// The body hit a `Yield` step; the line may hand control to another line.
    Yielded,
    Finished,
}

/// Result of running one frame's deferred actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameExit {
    pub frame: FrameId,
    /// The signal still active after every action ran.
    pub signal: Option<Signal>,
    /// The bound result, present exactly when no signal is left.
    pub result: Option<BoundResult>,
}

/// Outcome plus trace of a finished engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReport {
    pub outcome: Outcome,
    pub trace: ExecutionTrace,
}

struct BodyCursor {
    frame: FrameId,
    def: Arc<FrameDef>,
    next: usize,
}

impl BodyCursor {
    fn next_step(&mut self) -> Option<Step> {
        let step = self.def.steps().get(self.next).cloned();
        if step.is_some() {
            self.next += 1;
        }
        step
    }
}

enum BodyProgress {
    State(EngineState),
    Yielded,
}

/// One execution line's private engine: frame stack, body cursors, trace.
pub struct UnwindEngine {
    root_name: String,
    stack: FrameStack,
    cursors: Vec<BodyCursor>,
    trace: TraceRecorder,
    next_signal: u64,
    state: EngineState,
}

impl UnwindEngine {
    /// Enters the root frame and positions the engine at its first step.
    pub fn start(root: impl Into<Arc<FrameDef>>) -> Result<Self, EngineError> {
        let root: Arc<FrameDef> = root.into();
        let mut engine = Self {
            root_name: root.name().to_string(),
            stack: FrameStack::new(),
            cursors: Vec::new(),
            trace: TraceRecorder::new(),
            next_signal: 1,
            state: EngineState::Completed(ReturnValues::default()),
        };
        let handle = engine.enter_frame(root.name(), root.binding())?;
        engine.cursors.push(BodyCursor {
            frame: handle.id,
            def: root,
            next: 0,
        });
        engine.state = EngineState::Running(handle);
        Ok(engine)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            EngineState::Completed(_) | EngineState::Terminated(_)
        )
    }

    /// Deferred actions registered on frames that are still live.
    pub fn pending_deferred(&self) -> usize {
        self.stack.pending_deferred()
    }

    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match &self.state {
            EngineState::Completed(result) => Some(Outcome::Completed {
                result: result.clone(),
            }),
            EngineState::Terminated(signal) => Some(Outcome::Terminated {
                signal: signal.id(),
                payload: signal.payload().clone(),
            }),
            _ => None,
        }
    }

    /// Freezes whatever has been recorded so far.
    pub fn into_trace(self) -> ExecutionTrace {
        self.trace.finish()
    }

    /// Drives the engine to a terminal state. `Yield` steps are ignored.
    pub fn run(mut self) -> Result<EngineReport, EngineError> {
        while self.step()? != StepResult::Finished {}

        let outcome = self.outcome().ok_or_else(|| EngineError::LineUnfinished {
            line: self.root_name.clone(),
        })?;
        Ok(EngineReport {
            outcome,
            trace: self.into_trace(),
        })
    }

    /// Performs one transition.
    pub fn step(&mut self) -> Result<StepResult, EngineError> {
        let next = match &self.state {
            EngineState::Completed(_) | EngineState::Terminated(_) => {
                return Ok(StepResult::Finished)
            }
            EngineState::Running(frame) => {
                let frame = *frame;
                match self.advance_body(frame)? {
                    BodyProgress::State(state) => state,
                    BodyProgress::Yielded => return Ok(StepResult::Yielded),
                }
            }
            EngineState::Unwinding(frame, signal) => {
                let (frame, signal) = (*frame, signal.clone());
                self.exit_frame(frame, Some(signal))?
            }
        };

        self.state = next;
        if self.is_finished() {
            Ok(StepResult::Finished)
        } else {
            Ok(StepResult::Continued)
        }
    }

    pub(crate) fn enter_frame(
        &mut self,
        name: &str,
        binding: ResultBinding,
    ) -> Result<FrameHandle, EngineError> {
        let handle = self.stack.push(name, binding)?;
        self.trace.record(TraceEvent::FrameEntered {
            frame: handle.id,
            name: name.to_string(),
            depth: handle.depth,
        });
        FrameEntered {
            frame: name,
            depth: handle.depth,
        }
        .log();
        Ok(handle)
    }

    pub(crate) fn register_deferred(
        &mut self,
        frame: FrameHandle,
        action: Arc<dyn DeferredAction>,
    ) -> Result<usize, EngineError> {
        self.stack.register(frame, action)
    }

    /// Pops `frame` and runs its deferred actions last-registered first,
    /// whatever the state of `incoming`.
    pub(crate) fn run_deferred_and_exit(
        &mut self,
        frame: FrameHandle,
        incoming: Option<Signal>,
    ) -> Result<FrameExit, EngineError> {
        let mut exiting = self.stack.pop(frame)?;
        let actions = std::mem::take(&mut exiting.deferred);
        let mut signal = incoming;
        let mut interceptions = Vec::new();

        for (index, action) in actions.iter().enumerate().rev() {
            self.trace.record(TraceEvent::DeferRan {
                frame: exiting.id,
                index,
            });

            let outcome = {
                let mut ctx = DeferContext {
                    frame: exiting.id,
                    frame_name: &exiting.name,
                    depth: exiting.depth,
                    binding: exiting.binding,
                    index,
                    signal: &mut signal,
                    slot: &mut exiting.slot,
                    trace: &mut self.trace,
                    interceptions: &mut interceptions,
                };
                action.run(&mut ctx)
            };

            if let DeferOutcome::Raise(payload) = outcome {
                let raised = self.raise(exiting.id, &exiting.name, payload, RaiseOrigin::Deferred);
                if let Some(previous) = signal.as_ref().filter(|s| s.is_active()) {
                    self.trace.record(TraceEvent::SignalReRaised {
                        frame: exiting.id,
                        discarded: previous.id(),
                        signal: raised.id(),
                        payload: raised.payload().clone(),
                    });
                    SignalReplaced {
                        frame: &exiting.name,
                        discarded: previous.payload(),
                        replacement: raised.payload(),
                    }
                    .log();
                }
                signal = Some(raised);
            }
        }

        let mut seen = HashSet::new();
        for id in &interceptions {
            if !seen.insert(*id) {
                return Err(EngineError::DoubleInterception {
                    signal: *id,
                    frame: exiting.id,
                });
            }
        }

        let outgoing = signal.filter(Signal::is_active);
        let result = match outgoing {
            Some(_) => None,
            None => {
                let bound = bind_result(
                    exiting.binding,
                    !interceptions.is_empty(),
                    exiting.slot.written_after_interception(),
                    exiting.slot.body(),
                )
                .ok_or(EngineError::MissingResult { frame: exiting.id })?;
                self.trace.record(TraceEvent::ResultBound {
                    frame: exiting.id,
                    value: bound.value.clone(),
                    source: bound.source,
                });
                Some(bound)
            }
        };

        Ok(FrameExit {
            frame: exiting.id,
            signal: outgoing,
            result,
        })
    }

    fn advance_body(&mut self, frame: FrameHandle) -> Result<BodyProgress, EngineError> {
        let step = {
            let cursor = self
                .cursors
                .last_mut()
                .filter(|cursor| cursor.frame == frame.id)
                .ok_or(EngineError::CursorMismatch { frame: frame.id })?;
            cursor.next_step()
        };

        let next = match step {
            Some(Step::Defer(action)) => {
                self.register_deferred(frame, action)?;
                EngineState::Running(frame)
            }
            Some(Step::Call(callee)) => {
                let handle = self.enter_frame(callee.name(), callee.binding())?;
                self.cursors.push(BodyCursor {
                    frame: handle.id,
                    def: callee,
                    next: 0,
                });
                EngineState::Running(handle)
            }
            Some(Step::Raise(payload)) => {
                let name = self.cursor_name(frame);
                let signal = self.raise(frame.id, &name, payload, RaiseOrigin::Body);
                EngineState::Unwinding(frame, signal)
            }
            Some(Step::Return(values)) => {
                self.stack.slot_mut(frame)?.set_body(values);
                self.exit_frame(frame, None)?
            }
            Some(Step::Yield) => return Ok(BodyProgress::Yielded),
            None => {
                self.stack.slot_mut(frame)?.set_body(ReturnValues::default());
                self.exit_frame(frame, None)?
            }
        };
        Ok(BodyProgress::State(next))
    }

    fn exit_frame(
        &mut self,
        frame: FrameHandle,
        incoming: Option<Signal>,
    ) -> Result<EngineState, EngineError> {
        let exit = self.run_deferred_and_exit(frame, incoming)?;
        match self.cursors.pop() {
            Some(cursor) if cursor.frame == frame.id => {}
            _ => return Err(EngineError::CursorMismatch { frame: frame.id }),
        }
        let caller = self.stack.top();

        match exit.signal {
            Some(signal) => {
                self.trace.record(TraceEvent::FrameUnwound {
                    frame: frame.id,
                    signal: signal.id(),
                });
                match caller {
                    Some(caller) => Ok(EngineState::Unwinding(caller, signal)),
                    None => {
                        LineTerminated {
                            line: &self.root_name,
                            signal: signal.id(),
                            payload: signal.payload(),
                        }
                        .log();
                        Ok(EngineState::Terminated(signal))
                    }
                }
            }
            None => {
                let bound = exit
                    .result
                    .ok_or(EngineError::MissingResult { frame: frame.id })?;
                self.trace
                    .record(TraceEvent::FrameLeftNormally { frame: frame.id });
                match caller {
                    Some(caller) => Ok(EngineState::Running(caller)),
                    None => Ok(EngineState::Completed(bound.value)),
                }
            }
        }
    }

    fn raise(
        &mut self,
        frame: FrameId,
        frame_name: &str,
        payload: Payload,
        origin: RaiseOrigin,
    ) -> Signal {
        let id = SignalId(self.next_signal);
        self.next_signal += 1;

        self.trace.record(TraceEvent::SignalRaised {
            frame,
            signal: id,
            payload: payload.clone(),
            origin,
        });
        SignalRaised {
            frame: frame_name,
            signal: id,
            payload: &payload,
            origin,
        }
        .log();

        Signal::new(id, payload, frame)
    }

    fn cursor_name(&self, frame: FrameHandle) -> String {
        self.cursors
            .iter()
            .rev()
            .find(|cursor| cursor.frame == frame.id)
            .map(|cursor| cursor.def.name().to_string())
            .unwrap_or_default()
    }
}
