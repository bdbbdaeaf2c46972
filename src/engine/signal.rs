// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::engine::frame::FrameId;
use crate::engine::payload::Payload;

/// Per-run identity of a raised signal, assigned in raise order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SignalId(pub u64);

impl Display for SignalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a raise came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RaiseOrigin {
    /// A `Raise` step in a frame body.
    Body,
    /// A deferred action returning `DeferOutcome::Raise`.
    Deferred,
}

/// An in-flight abnormal termination.
///
/// Activity is tracked by the `active` flag alone. A signal whose payload is
/// `Payload::None` is just as active as any other until it is intercepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    id: SignalId,
    payload: Payload,
    raised_in: FrameId,
    active: bool,
}

impl Signal {
    pub(crate) fn new(id: SignalId, payload: Payload, raised_in: FrameId) -> Self {
        Self {
            id,
            payload,
            raised_in,
            active: true,
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn raised_in(&self) -> FrameId {
        self.raised_in
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Marks the signal inactive and hands back its payload.
    ///
    /// Returns `None` when the signal was already intercepted, so a second
    /// interception attempt can never succeed.
    pub(crate) fn intercept(&mut self) -> Option<Payload> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_payload_signal_is_active() {
        let signal = Signal::new(SignalId(1), Payload::None, FrameId(0));
        assert!(signal.is_active());
        assert!(signal.payload().is_nil());
    }

    #[test]
    fn test_intercept_only_once() {
        let mut signal = Signal::new(SignalId(1), Payload::text("Whoops!"), FrameId(3));

        assert_eq!(signal.intercept(), Some(Payload::text("Whoops!")));
        assert!(!signal.is_active());
        assert_eq!(signal.intercept(), None);
    }

    #[test]
    fn test_intercepting_none_payload_yields_some() {
        let mut signal = Signal::new(SignalId(7), Payload::None, FrameId(0));
        assert_eq!(signal.intercept(), Some(Payload::None));
    }
}
