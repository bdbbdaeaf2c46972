// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod deferred;

pub use deferred::{DeferOutcome, DeferredAction};
