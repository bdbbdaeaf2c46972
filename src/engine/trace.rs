// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution trace recording.
//!
//! The engine appends one [`TraceEvent`] per transition through a
//! [`TraceRecorder`]. Once the run is over the recorder is frozen into an
//! [`ExecutionTrace`], which only offers read access. Nothing in the engine
//! ever reads the trace back to make a decision.

use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::engine::binding::{BoundFrom, ReturnValues};
use crate::engine::frame::FrameId;
use crate::engine::payload::Payload;
use crate::engine::signal::{RaiseOrigin, SignalId};
use crate::observability::messages::engine::TraceEventRecorded;
use crate::observability::messages::StructuredLog;

/// One engine transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    FrameEntered {
        frame: FrameId,
        name: String,
        depth: usize,
    },
    /// The frame returned to its caller, either from its body or after a
    /// deferred action recovered.
    FrameLeftNormally { frame: FrameId },
    /// The frame was popped with a signal still active.
    FrameUnwound { frame: FrameId, signal: SignalId },
    SignalRaised {
        frame: FrameId,
        signal: SignalId,
        payload: Payload,
        origin: RaiseOrigin,
    },
    /// `index` is the action's registration index within its frame.
    DeferRan { frame: FrameId, index: usize },
    SignalIntercepted { frame: FrameId, signal: SignalId },
    /// A raise from cleanup replaced a signal that was still active.
    SignalReRaised {
        frame: FrameId,
        discarded: SignalId,
        signal: SignalId,
        payload: Payload,
    },
    ResultBound {
        frame: FrameId,
        value: ReturnValues,
        source: BoundFrom,
    },
}

impl Display for TraceEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceEvent::FrameEntered { frame, name, depth } => {
                write!(f, "{} entered frame '{}' at depth {}", frame, name, depth)
            }
            TraceEvent::FrameLeftNormally { frame } => write!(f, "{} left", frame),
            TraceEvent::FrameUnwound { frame, signal } => {
                write!(f, "{} unwound by signal {}", frame, signal)
            }
            TraceEvent::SignalRaised {
                frame,
                signal,
                payload,
                origin,
            } => write!(
                f,
                "{} raised signal {} ({}) from {:?}",
                frame,
                signal,
                payload.describe(),
                origin
            ),
            TraceEvent::DeferRan { frame, index } => {
                write!(f, "{} ran deferred action {}", frame, index)
            }
            TraceEvent::SignalIntercepted { frame, signal } => {
                write!(f, "{} intercepted signal {}", frame, signal)
            }
            TraceEvent::SignalReRaised {
                frame,
                discarded,
                signal,
                payload,
            } => write!(
                f,
                "{} replaced signal {} with {} ({})",
                frame,
                discarded,
                signal,
                payload.describe()
            ),
            TraceEvent::ResultBound {
                frame,
                value,
                source,
            } => write!(f, "{} bound result [{}] from {:?}", frame, value, source),
        }
    }
}

/// Append-only sink the engine writes to during a run.
#[derive(Debug, Default)]
pub struct TraceRecorder {
    events: Vec<TraceEvent>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TraceEvent) {
        TraceEventRecorded {
            seq: self.events.len(),
            event: &event,
        }
        .log();
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn finish(self) -> ExecutionTrace {
        ExecutionTrace {
            events: self.events,
        }
    }
}

/// Frozen, ordered record of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExecutionTrace {
    events: Vec<TraceEvent>,
}

impl ExecutionTrace {
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter()
    }

    /// Frame id of the first frame entered under `name`.
    pub fn frame_named(&self, name: &str) -> Option<FrameId> {
        self.events.iter().find_map(|event| match event {
            TraceEvent::FrameEntered { frame, name: n, .. } if n == name => Some(*frame),
            _ => None,
        })
    }

    /// Name the frame was entered under.
    pub fn frame_name(&self, id: FrameId) -> Option<&str> {
        self.events.iter().find_map(|event| match event {
            TraceEvent::FrameEntered { frame, name, .. } if *frame == id => Some(name.as_str()),
            _ => None,
        })
    }

    /// Registration indices of the deferred actions that ran on `frame`, in
    /// execution order.
    pub fn defer_order(&self, frame: FrameId) -> Vec<usize> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::DeferRan { frame: f, index } if *f == frame => Some(*index),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every raise, in raise order.
    pub fn raised_payloads(&self) -> Vec<&Payload> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::SignalRaised { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    /// `(frame, signal)` pairs for every interception, in order.
    pub fn interceptions(&self) -> Vec<(FrameId, SignalId)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::SignalIntercepted { frame, signal } => Some((*frame, *signal)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&TraceEvent) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(event)).count()
    }

    /// Position of the first event matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&TraceEvent) -> bool) -> Option<usize> {
        self.events.iter().position(predicate)
    }
}

impl<'a> IntoIterator for &'a ExecutionTrace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExecutionTrace {
        let mut recorder = TraceRecorder::new();
        recorder.record(TraceEvent::FrameEntered {
            frame: FrameId(0),
            name: "root".to_string(),
            depth: 0,
        });
        recorder.record(TraceEvent::SignalRaised {
            frame: FrameId(0),
            signal: SignalId(1),
            payload: Payload::text("Whoops!"),
            origin: RaiseOrigin::Body,
        });
        recorder.record(TraceEvent::DeferRan {
            frame: FrameId(0),
            index: 1,
        });
        recorder.record(TraceEvent::DeferRan {
            frame: FrameId(0),
            index: 0,
        });
        recorder.record(TraceEvent::SignalIntercepted {
            frame: FrameId(0),
            signal: SignalId(1),
        });
        recorder.finish()
    }

    #[test]
    fn test_recorder_preserves_order() {
        let trace = sample();
        assert_eq!(trace.len(), 5);
        assert!(matches!(trace.events()[0], TraceEvent::FrameEntered { .. }));
        assert!(matches!(
            trace.events()[4],
            TraceEvent::SignalIntercepted { .. }
        ));
    }

    #[test]
    fn test_queries() {
        let trace = sample();
        let root = trace.frame_named("root").unwrap();

        assert_eq!(trace.frame_name(root), Some("root"));
        assert_eq!(trace.defer_order(root), vec![1, 0]);
        assert_eq!(trace.raised_payloads(), vec![&Payload::text("Whoops!")]);
        assert_eq!(trace.interceptions(), vec![(root, SignalId(1))]);
        assert_eq!(
            trace.count(|e| matches!(e, TraceEvent::DeferRan { .. })),
            2
        );
    }

    #[test]
    fn test_trace_serializes_as_tagged_events() {
        let json = serde_json::to_value(sample()).unwrap();
        let events = json.as_array().unwrap();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0]["event"], "frame_entered");
        assert_eq!(events[1]["origin"], "body");
        assert_eq!(events[4]["signal"], 1);
    }
}
