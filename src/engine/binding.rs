// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Return-value binding policy.
//!
//! Decides what a frame hands back to its caller once its deferred actions
//! have run and no signal is left active. The decision is a pure function of
//! the frame's binding, whether an interception happened, what cleanup wrote
//! and what the body returned.
//!
//! ```text
//! binding   body returned?   wrote after interception?   caller sees
//! -------   --------------   -------------------------   -----------------
//! Unnamed   yes              any                         body value
//! Unnamed   no (unwound)     any                         zero value
//! Named     any              yes                         written value
//! Named     yes              no                          body value
//! Named     no (unwound)     no                          zero value
//! ```
//!
//! A write made before the frame's signal was intercepted, or on a normal
//! exit with no signal at all, stays visible to later cleanup through
//! [`ResultSlot::current`] but is never bound on its own.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Whether a frame's result slot is visible to its own deferred actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultBinding {
    /// Result values are anonymous; cleanup cannot observe or change them.
    #[default]
    Unnamed,
    /// Result values live in a named slot cleanup may rewrite.
    Named,
}

/// The declared result of every simulated function: an integer, a text and an
/// optional error. `Default` is the zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValues {
    pub number: i64,
    pub text: String,
    pub error: Option<String>,
}

impl ReturnValues {
    pub fn new(number: i64, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl Display for ReturnValues {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "i: {}   s: {:?}   err: ", self.number, self.text)?;
        match &self.error {
            Some(error) => write!(f, "{}", error),
            None => write!(f, "<nil>"),
        }
    }
}

/// Which input the binding policy took the result from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundFrom {
    Body,
    Written,
    Zero,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundResult {
    pub value: ReturnValues,
    pub source: BoundFrom,
}

/// Writable result slot owned by a frame.
///
/// The body fills `body` when it returns; deferred actions write through
/// [`ResultSlot::write`], which always starts from the latest visible value.
#[derive(Debug, Clone, Default)]
pub struct ResultSlot {
    body: Option<ReturnValues>,
    written: Option<ReturnValues>,
    written_after_interception: bool,
}

impl ResultSlot {
    pub(crate) fn set_body(&mut self, values: ReturnValues) {
        self.body = Some(values);
    }

    pub fn body(&self) -> Option<&ReturnValues> {
        self.body.as_ref()
    }

    pub fn written(&self) -> Option<&ReturnValues> {
        self.written.as_ref()
    }

    /// The written value, if any write landed after an interception on
    /// this frame.
    pub fn written_after_interception(&self) -> Option<&ReturnValues> {
        self.written
            .as_ref()
            .filter(|_| self.written_after_interception)
    }

    /// The value a deferred action currently sees in the slot.
    pub fn current(&self) -> ReturnValues {
        self.written
            .as_ref()
            .or(self.body.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn write(
        &mut self,
        after_interception: bool,
        update: impl FnOnce(&mut ReturnValues),
    ) {
        let mut next = self.current();
        update(&mut next);
        self.written = Some(next);
        self.written_after_interception |= after_interception;
    }
}

/// Applies the binding policy.
///
/// `written` is the value cleanup wrote after an interception, as returned
/// by [`ResultSlot::written_after_interception`].
///
/// Returns `None` for the one impossible input: a frame with no body value
/// that was also never intercepted, which means it neither returned nor
/// recovered and should not be completing at all.
pub fn bind_result(
    binding: ResultBinding,
    intercepted: bool,
    written: Option<&ReturnValues>,
    body: Option<&ReturnValues>,
) -> Option<BoundResult> {
    if body.is_none() && !intercepted {
        return None;
    }

    let bound = match (binding, written, body) {
        (ResultBinding::Named, Some(value), _) => BoundResult {
            value: value.clone(),
            source: BoundFrom::Written,
        },
        (_, _, Some(value)) => BoundResult {
            value: value.clone(),
            source: BoundFrom::Body,
        },
        (_, _, None) => BoundResult {
            value: ReturnValues::default(),
            source: BoundFrom::Zero,
        },
    };
    Some(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recovered_error() -> ReturnValues {
        ReturnValues::default().with_error("panic recovered")
    }

    #[test]
    fn test_unnamed_ignores_written_value() {
        let body = ReturnValues::new(9, "no panic");
        let bound = bind_result(
            ResultBinding::Unnamed,
            false,
            Some(&recovered_error()),
            Some(&body),
        )
        .unwrap();

        assert_eq!(bound.value, body);
        assert_eq!(bound.source, BoundFrom::Body);
    }

    #[test]
    fn test_unnamed_unwound_frame_returns_zero() {
        let bound =
            bind_result(ResultBinding::Unnamed, true, Some(&recovered_error()), None).unwrap();

        assert!(bound.value.is_zero());
        assert_eq!(bound.source, BoundFrom::Zero);
    }

    #[test]
    fn test_named_prefers_written_value() {
        let bound =
            bind_result(ResultBinding::Named, true, Some(&recovered_error()), None).unwrap();

        assert_eq!(bound.value.error.as_deref(), Some("panic recovered"));
        assert_eq!(bound.source, BoundFrom::Written);
    }

    #[test]
    fn test_named_without_write_falls_back_to_body() {
        let body = ReturnValues::new(9, "no panic");
        let bound = bind_result(ResultBinding::Named, false, None, Some(&body)).unwrap();
        assert_eq!(bound.value, body);

        let bound = bind_result(ResultBinding::Named, true, None, None).unwrap();
        assert_eq!(bound.source, BoundFrom::Zero);
    }

    #[test]
    fn test_missing_body_without_interception_is_rejected() {
        assert!(bind_result(ResultBinding::Named, false, None, None).is_none());
        assert!(bind_result(ResultBinding::Unnamed, false, None, None).is_none());
    }

    #[test]
    fn test_slot_writes_build_on_body_value() {
        let mut slot = ResultSlot::default();
        slot.set_body(ReturnValues::new(9, "no panic"));
        slot.write(true, |values| values.error = Some("late".to_string()));

        let written = slot.written_after_interception().unwrap();
        assert_eq!(written.number, 9);
        assert_eq!(written.error.as_deref(), Some("late"));
    }

    #[test]
    fn test_slot_write_before_interception_is_not_bindable() {
        let mut slot = ResultSlot::default();
        slot.set_body(ReturnValues::new(9, "no panic"));
        slot.write(false, |values| values.number = 100);

        assert_eq!(slot.current().number, 100);
        assert!(slot.written().is_some());
        assert!(slot.written_after_interception().is_none());

        let bound = bind_result(
            ResultBinding::Named,
            false,
            slot.written_after_interception(),
            slot.body(),
        )
        .unwrap();
        assert_eq!(bound.value, ReturnValues::new(9, "no panic"));
        assert_eq!(bound.source, BoundFrom::Body);
    }

    #[test]
    fn test_slot_later_write_after_interception_carries_earlier_changes() {
        let mut slot = ResultSlot::default();
        slot.write(false, |values| values.number = 100);
        slot.write(true, |values| values.error = Some("recovered".to_string()));

        let written = slot.written_after_interception().unwrap();
        assert_eq!(written.number, 100);
        assert_eq!(written.error.as_deref(), Some("recovered"));
    }

    #[test]
    fn test_return_values_display() {
        assert_eq!(
            ReturnValues::new(9, "no panic").to_string(),
            "i: 9   s: \"no panic\"   err: <nil>"
        );
    }
}
