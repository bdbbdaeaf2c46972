// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for engine lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Frame entry
//! * Trace events as they are recorded
//! * Signals being raised, intercepted and replaced
//! * Execution line termination
//! * Scenario run start and completion

use crate::engine::payload::Payload;
use crate::engine::signal::{RaiseOrigin, SignalId};
use crate::engine::trace::TraceEvent;
use crate::engine::unwind::Outcome;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A frame was pushed.
///
/// # Log Level
/// `debug!` - Fine-grained engine progress
pub struct FrameEntered<'a> {
    pub frame: &'a str,
    pub depth: usize,
}

impl Display for FrameEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} - entered (depth {})", self.frame, self.depth)
    }
}

impl StructuredLog for FrameEntered<'_> {
    fn log(&self) {
        tracing::debug!(frame = self.frame, depth = self.depth, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "frame",
            span_name = name,
            frame = self.frame,
            depth = self.depth,
        )
    }
}

/// An event was appended to a run's trace.
///
/// # Log Level
/// `debug!` - Mirrors the trace as it is written
///
/// # Example
/// ```
/// use the_unwinder::engine::{FrameId, TraceEvent};
/// use the_unwinder::observability::messages::engine::TraceEventRecorded;
///
/// let event = TraceEvent::DeferRan {
///     frame: FrameId(2),
///     index: 0,
/// };
/// let msg = TraceEventRecorded {
///     seq: 7,
///     event: &event,
/// };
///
/// assert_eq!(msg.to_string(), "[7] frame#2 ran deferred action 0");
/// ```
pub struct TraceEventRecorded<'a> {
    pub seq: usize,
    pub event: &'a TraceEvent,
}

impl Display for TraceEventRecorded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.seq, self.event)
    }
}

impl StructuredLog for TraceEventRecorded<'_> {
    fn log(&self) {
        tracing::debug!(seq = self.seq, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("trace_event", span_name = name, seq = self.seq)
    }
}

/// A signal was raised from a body or from cleanup.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_unwinder::engine::{Payload, RaiseOrigin, SignalId};
/// use the_unwinder::observability::messages::engine::SignalRaised;
///
/// let payload = Payload::text("Whoops!");
/// let msg = SignalRaised {
///     frame: "panicker",
///     signal: SignalId(1),
///     payload: &payload,
///     origin: RaiseOrigin::Body,
/// };
///
/// assert_eq!(msg.to_string(), "panicker - about to raise signal #1 (text: Whoops!)");
/// ```
pub struct SignalRaised<'a> {
    pub frame: &'a str,
    pub signal: SignalId,
    pub payload: &'a Payload,
    pub origin: RaiseOrigin,
}

impl Display for SignalRaised<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.origin {
            RaiseOrigin::Body => write!(
                f,
                "{} - about to raise signal {} ({})",
                self.frame,
                self.signal,
                self.payload.describe()
            ),
            RaiseOrigin::Deferred => write!(
                f,
                "{}(deferred) - raising again: signal {} ({})",
                self.frame,
                self.signal,
                self.payload.describe()
            ),
        }
    }
}

impl StructuredLog for SignalRaised<'_> {
    fn log(&self) {
        tracing::info!(
            frame = self.frame,
            signal = self.signal.0,
            payload = %self.payload.describe(),
            origin = ?self.origin,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "signal_raised",
            span_name = name,
            frame = self.frame,
            signal = self.signal.0,
            payload = %self.payload.describe(),
        )
    }
}

/// A deferred action intercepted the active signal.
///
/// # Log Level
/// `info!` - Important operational event
pub struct SignalIntercepted<'a> {
    pub frame: &'a str,
    pub signal: SignalId,
    pub payload: &'a Payload,
}

impl Display for SignalIntercepted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}(deferred) - intercepted signal {} ({})",
            self.frame,
            self.signal,
            self.payload.describe()
        )
    }
}

impl StructuredLog for SignalIntercepted<'_> {
    fn log(&self) {
        tracing::info!(
            frame = self.frame,
            signal = self.signal.0,
            payload = %self.payload.describe(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "signal_intercepted",
            span_name = name,
            frame = self.frame,
            signal = self.signal.0,
        )
    }
}

/// Cleanup raised while another signal was still active; the older one is lost.
///
/// # Log Level
/// `warn!` - The discarded payload never reaches any caller
pub struct SignalReplaced<'a> {
    pub frame: &'a str,
    pub discarded: &'a Payload,
    pub replacement: &'a Payload,
}

impl Display for SignalReplaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}(deferred) - signal ({}) replaced by ({})",
            self.frame,
            self.discarded.describe(),
            self.replacement.describe()
        )
    }
}

impl StructuredLog for SignalReplaced<'_> {
    fn log(&self) {
        tracing::warn!(
            frame = self.frame,
            discarded = %self.discarded.describe(),
            replacement = %self.replacement.describe(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "signal_replaced",
            span_name = name,
            frame = self.frame,
            discarded = %self.discarded.describe(),
            replacement = %self.replacement.describe(),
        )
    }
}

/// A signal reached the root frame of a line without being intercepted.
///
/// # Log Level
/// `warn!` - Fatal to the execution line, but an expected outcome
pub struct LineTerminated<'a> {
    pub line: &'a str,
    pub signal: SignalId,
    pub payload: &'a Payload,
}

impl Display for LineTerminated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "line '{}' terminated by unrecovered signal {} ({})",
            self.line,
            self.signal,
            self.payload.describe()
        )
    }
}

impl StructuredLog for LineTerminated<'_> {
    fn log(&self) {
        tracing::warn!(
            line = self.line,
            signal = self.signal.0,
            payload = %self.payload.describe(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "line_terminated",
            span_name = name,
            line = self.line,
            signal = self.signal.0,
        )
    }
}

/// Cleanup wrote into an unnamed result; the caller will never see it.
///
/// # Log Level
/// `debug!` - Expected behaviour, useful when reading a trace
pub struct ResultWriteDiscarded<'a> {
    pub frame: &'a str,
    pub index: usize,
}

impl Display for ResultWriteDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}(deferred #{}) - wrote to an unnamed result, write will be discarded",
            self.frame, self.index
        )
    }
}

impl StructuredLog for ResultWriteDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(frame = self.frame, index = self.index, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "result_write_discarded",
            span_name = name,
            frame = self.frame,
            index = self.index,
        )
    }
}

/// A scenario run is starting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStarted<'a> {
    pub scenario: &'a str,
    pub start: &'a str,
    pub recovery: &'a str,
    pub payload: &'a Payload,
    pub background_lines: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running scenario '{}': start={}, recovery={}, payload=({}), background_lines={}",
            self.scenario,
            self.start,
            self.recovery,
            self.payload.describe(),
            self.background_lines
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            scenario = self.scenario,
            start = self.start,
            recovery = self.recovery,
            payload = %self.payload.describe(),
            background_lines = self.background_lines,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            scenario = self.scenario,
            start = self.start,
            recovery = self.recovery,
        )
    }
}

/// A scenario run finished (either outcome).
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted<'a> {
    pub scenario: &'a str,
    pub outcome: &'a Outcome,
    pub events: usize,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scenario '{}' {} after {} trace events",
            self.scenario, self.outcome, self.events
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            scenario = self.scenario,
            terminated = self.outcome.is_terminated(),
            events = self.events,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            scenario = self.scenario,
            terminated = self.outcome.is_terminated(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frame::FrameId;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Clone, Default)]
    struct LevelCapture(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for LevelCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if let Ok(mut levels) = self.0.lock() {
                levels.push(*event.metadata().level());
            }
        }
    }

    fn levels_of(log: impl FnOnce()) -> Vec<Level> {
        let capture = LevelCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        tracing::subscriber::with_default(subscriber, log);
        let levels = capture.0.lock().unwrap().clone();
        levels
    }

    #[test]
    fn test_line_terminated_logs_at_warn() {
        let payload = Payload::text("Whoops!");
        let levels = levels_of(|| {
            LineTerminated {
                line: "main",
                signal: SignalId(1),
                payload: &payload,
            }
            .log()
        });
        assert_eq!(levels, vec![Level::WARN]);
    }

    #[test]
    fn test_trace_event_recorded_logs_at_debug() {
        let event = TraceEvent::FrameLeftNormally { frame: FrameId(0) };
        let levels = levels_of(|| TraceEventRecorded { seq: 0, event: &event }.log());
        assert_eq!(levels, vec![Level::DEBUG]);
    }
}
