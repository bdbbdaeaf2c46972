// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Frames, frame definitions and the deferred-action registry.
//!
//! A [`FrameDef`] is the static shape of a function body: its name, its
//! result binding and an ordered list of [`Step`]s. At run time each call of
//! a definition becomes a [`Frame`] on a [`FrameStack`], which owns the
//! frame's deferred actions in registration order and its result slot.

use serde::Serialize;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::engine::binding::{ResultBinding, ResultSlot, ReturnValues};
use crate::engine::payload::Payload;
use crate::errors::EngineError;
use crate::traits::DeferredAction;

/// Per-run frame identity, assigned on entry and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FrameId(pub usize);

impl Display for FrameId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame#{}", self.0)
    }
}

/// Handle to a live frame. Only valid while that frame is on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle {
    pub id: FrameId,
    pub depth: usize,
}

/// One instruction of a frame body.
#[derive(Clone)]
pub enum Step {
    /// Register a deferred action on the current frame.
    Defer(Arc<dyn DeferredAction>),
    /// Call another function; the body continues after it returns.
    Call(Arc<FrameDef>),
    /// Raise a signal; no later step of this body runs.
    Raise(Payload),
    /// Return from the body with these values.
    Return(ReturnValues),
    /// Cooperative pause point for execution lines.
    Yield,
}

impl Debug for Step {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Defer(action) => write!(f, "Defer({})", action.name()),
            Step::Call(def) => write!(f, "Call({})", def.name),
            Step::Raise(payload) => write!(f, "Raise({})", payload.describe()),
            Step::Return(values) => write!(f, "Return({})", values),
            Step::Yield => write!(f, "Yield"),
        }
    }
}

/// Static description of a function body.
///
/// # Example
/// ```
/// use the_unwinder::actions::{Announce, Recover};
/// use the_unwinder::engine::{FrameDef, Payload, ReturnValues};
///
/// let panicker = FrameDef::new("panicker")
///     .defer(Announce::new("panicker - deferred func"))
///     .raise(Payload::text("Whoops!"));
///
/// let root = FrameDef::named("root")
///     .defer(Recover::new())
///     .call(panicker)
///     .returns(ReturnValues::new(9, "no panic"));
///
/// assert_eq!(root.steps().len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct FrameDef {
    name: String,
    binding: ResultBinding,
    steps: Vec<Step>,
}

impl FrameDef {
    /// A frame with unnamed results.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: ResultBinding::Unnamed,
            steps: Vec::new(),
        }
    }

    /// A frame with named results.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name).with_binding(ResultBinding::Named)
    }

    pub fn with_binding(mut self, binding: ResultBinding) -> Self {
        self.binding = binding;
        self
    }

    pub fn defer(self, action: impl DeferredAction + 'static) -> Self {
        self.defer_arc(Arc::new(action))
    }

    pub fn defer_arc(mut self, action: Arc<dyn DeferredAction>) -> Self {
        self.steps.push(Step::Defer(action));
        self
    }

    pub fn call(mut self, callee: FrameDef) -> Self {
        self.steps.push(Step::Call(Arc::new(callee)));
        self
    }

    pub fn raise(mut self, payload: Payload) -> Self {
        self.steps.push(Step::Raise(payload));
        self
    }

    pub fn returns(mut self, values: ReturnValues) -> Self {
        self.steps.push(Step::Return(values));
        self
    }

    pub fn yield_now(mut self) -> Self {
        self.steps.push(Step::Yield);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> ResultBinding {
        self.binding
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// A live call-chain entry.
pub struct Frame {
    pub(crate) id: FrameId,
    pub(crate) name: String,
    pub(crate) depth: usize,
    pub(crate) binding: ResultBinding,
    pub(crate) deferred: Vec<Arc<dyn DeferredAction>>,
    pub(crate) slot: ResultSlot,
}

impl Frame {
    pub fn id(&self) -> FrameId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn binding(&self) -> ResultBinding {
        self.binding
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    fn handle(&self) -> FrameHandle {
        FrameHandle {
            id: self.id,
            depth: self.depth,
        }
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("binding", &self.binding)
            .field("deferred_count", &self.deferred.len())
            .finish()
    }
}

/// Strict stack of live frames for one execution line.
#[derive(Debug, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
    next_id: usize,
}

impl FrameStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn top(&self) -> Option<FrameHandle> {
        self.frames.last().map(Frame::handle)
    }

    /// Deferred actions registered on live frames that have not run yet.
    pub fn pending_deferred(&self) -> usize {
        self.frames.iter().map(Frame::deferred_count).sum()
    }

    pub(crate) fn push(
        &mut self,
        name: &str,
        binding: ResultBinding,
    ) -> Result<FrameHandle, EngineError> {
        let depth = self.frames.len();
        if let Some(top) = self.frames.last() {
            if top.depth + 1 != depth {
                return Err(EngineError::StackCorrupted {
                    expected: top.id,
                    found: None,
                });
            }
        }

        let frame = Frame {
            id: FrameId(self.next_id),
            name: name.to_string(),
            depth,
            binding,
            deferred: Vec::new(),
            slot: ResultSlot::default(),
        };
        self.next_id += 1;
        let handle = frame.handle();
        self.frames.push(frame);
        Ok(handle)
    }

    /// Appends `action` to the frame's cleanup sequence and returns its
    /// registration index.
    pub(crate) fn register(
        &mut self,
        handle: FrameHandle,
        action: Arc<dyn DeferredAction>,
    ) -> Result<usize, EngineError> {
        let frame = self.live_mut(handle)?;
        frame.deferred.push(action);
        Ok(frame.deferred.len() - 1)
    }

    pub(crate) fn slot_mut(&mut self, handle: FrameHandle) -> Result<&mut ResultSlot, EngineError> {
        Ok(&mut self.live_mut(handle)?.slot)
    }

    /// Removes the top frame, which must be `handle`.
    pub(crate) fn pop(&mut self, handle: FrameHandle) -> Result<Frame, EngineError> {
        match self.frames.last() {
            Some(top) if top.id == handle.id => self.frames.pop().ok_or(EngineError::EmptyStack),
            Some(top) => Err(EngineError::StackCorrupted {
                expected: handle.id,
                found: Some(top.id),
            }),
            None => Err(EngineError::EmptyStack),
        }
    }

    fn live_mut(&mut self, handle: FrameHandle) -> Result<&mut Frame, EngineError> {
        self.frames
            .get_mut(handle.depth)
            .filter(|frame| frame.id == handle.id)
            .ok_or(EngineError::StaleFrameHandle { frame: handle.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Announce;

    #[test]
    fn test_push_assigns_increasing_ids_and_depths() {
        let mut stack = FrameStack::new();
        let root = stack.push("root", ResultBinding::Named).unwrap();
        let child = stack.push("child", ResultBinding::Unnamed).unwrap();

        assert_eq!(root, FrameHandle { id: FrameId(0), depth: 0 });
        assert_eq!(child, FrameHandle { id: FrameId(1), depth: 1 });
        assert_eq!(stack.top(), Some(child));
    }

    #[test]
    fn test_ids_are_not_reused_after_pop() {
        let mut stack = FrameStack::new();
        let root = stack.push("root", ResultBinding::Unnamed).unwrap();
        let first = stack.push("first", ResultBinding::Unnamed).unwrap();
        stack.pop(first).unwrap();
        let second = stack.push("second", ResultBinding::Unnamed).unwrap();

        assert_eq!(second.depth, first.depth);
        assert_ne!(second.id, first.id);
        assert_eq!(stack.top(), Some(second));
        assert_eq!(stack.len(), 2);
        assert_eq!(root.id, FrameId(0));
    }

    #[test]
    fn test_register_returns_registration_index() {
        let mut stack = FrameStack::new();
        let root = stack.push("root", ResultBinding::Unnamed).unwrap();

        let a = stack.register(root, Arc::new(Announce::new("a"))).unwrap();
        let b = stack.register(root, Arc::new(Announce::new("b"))).unwrap();

        assert_eq!((a, b), (0, 1));
        assert_eq!(stack.pending_deferred(), 2);
    }

    #[test]
    fn test_pop_rejects_non_top_frame() {
        let mut stack = FrameStack::new();
        let root = stack.push("root", ResultBinding::Unnamed).unwrap();
        let _child = stack.push("child", ResultBinding::Unnamed).unwrap();

        let err = stack.pop(root).unwrap_err();
        assert!(matches!(err, EngineError::StackCorrupted { .. }));
    }

    #[test]
    fn test_pop_on_empty_stack() {
        let mut stack = FrameStack::new();
        let handle = FrameHandle { id: FrameId(0), depth: 0 };
        assert!(matches!(stack.pop(handle), Err(EngineError::EmptyStack)));
    }

    #[test]
    fn test_stale_handle_cannot_register() {
        let mut stack = FrameStack::new();
        let root = stack.push("root", ResultBinding::Unnamed).unwrap();
        let child = stack.push("child", ResultBinding::Unnamed).unwrap();
        stack.pop(child).unwrap();

        let err = stack
            .register(child, Arc::new(Announce::new("late")))
            .unwrap_err();
        assert!(matches!(err, EngineError::StaleFrameHandle { .. }));
        assert!(stack.register(root, Arc::new(Announce::new("ok"))).is_ok());
    }

    #[test]
    fn test_step_debug_uses_action_name() {
        let def = FrameDef::new("f").defer(Announce::new("first")).yield_now();
        assert_eq!(format!("{:?}", def.steps()[1]), "Yield");
        assert!(format!("{:?}", def.steps()[0]).starts_with("Defer("));
    }
}
