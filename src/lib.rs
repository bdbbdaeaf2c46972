// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod actions;    // deferred action library
pub mod config;     // scenarios + call chain builder
pub mod engine;     // unwind state machine
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // unified abstractions

pub use engine::{run, Outcome, RunReport};
pub use errors::UnwinderError;
