// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::binding::{ResultBinding, ResultSlot, ReturnValues};
use crate::engine::frame::FrameId;
use crate::engine::payload::Payload;
use crate::engine::signal::{Signal, SignalId};
use crate::engine::trace::{TraceEvent, TraceRecorder};
use crate::observability::messages::engine::{ResultWriteDiscarded, SignalIntercepted};
use crate::observability::messages::StructuredLog;

/// View of the exiting frame handed to each deferred action.
pub struct DeferContext<'a> {
    pub(crate) frame: FrameId,
    pub(crate) frame_name: &'a str,
    pub(crate) depth: usize,
    pub(crate) binding: ResultBinding,
    pub(crate) index: usize,
    pub(crate) signal: &'a mut Option<Signal>,
    pub(crate) slot: &'a mut ResultSlot,
    pub(crate) trace: &'a mut TraceRecorder,
    pub(crate) interceptions: &'a mut Vec<SignalId>,
}

impl<'a> DeferContext<'a> {
    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn frame_name(&self) -> &str {
        self.frame_name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn binding(&self) -> ResultBinding {
        self.binding
    }

    /// Registration index of the running action.
    pub fn index(&self) -> usize {
        self.index
    }

    /// True while a signal is propagating through this frame.
    pub fn is_unwinding(&self) -> bool {
        self.signal.as_ref().is_some_and(Signal::is_active)
    }

    /// Looks at the active signal's payload without intercepting it.
    pub fn peek(&self) -> Option<&Payload> {
        self.signal
            .as_ref()
            .filter(|signal| signal.is_active())
            .map(Signal::payload)
    }

    /// Intercepts the active signal, if any.
    ///
    /// `Some(Payload::None)` means a signal raised with no value was stopped;
    /// `None` means there was nothing to stop.
    pub fn recover(&mut self) -> Option<Payload> {
        let signal = self.signal.as_mut()?;
        let payload = signal.intercept()?;
        let id = signal.id();

        self.interceptions.push(id);
        self.trace.record(TraceEvent::SignalIntercepted {
            frame: self.frame,
            signal: id,
        });
        SignalIntercepted {
            frame: self.frame_name,
            signal: id,
            payload: &payload,
        }
        .log();

        Some(payload)
    }

    /// The result value as cleanup currently sees it.
    pub fn current_result(&self) -> ReturnValues {
        self.slot.current()
    }

    /// Writes into the frame's result slot.
    ///
    /// Only a write made after this frame intercepted a signal can become
    /// the frame's result, and only on a named frame. Earlier writes are
    /// still seen by later cleanup through [`DeferContext::current_result`].
    pub fn write_result(&mut self, update: impl FnOnce(&mut ReturnValues)) {
        let after_interception = !self.interceptions.is_empty();
        self.slot.write(after_interception, update);
        if self.binding == ResultBinding::Unnamed {
            ResultWriteDiscarded {
                frame: self.frame_name,
                index: self.index,
            }
            .log();
        }
    }
}
