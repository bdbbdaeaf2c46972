// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ready-made deferred actions.
//!
//! Each type implements [`DeferredAction`](crate::traits::DeferredAction) and
//! is registered on a frame with [`FrameDef::defer`](crate::engine::FrameDef::defer).

pub mod announce;
pub mod closure;
pub mod expect;
pub mod raise;
pub mod recover;

pub use announce::*;
pub use closure::*;
pub use expect::*;
pub use raise::*;
pub use recover::*;
