// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod engine;

pub use config::ConfigError;
pub use engine::EngineError;

use thiserror::Error;

/// Top-level error for callers that both configure and run scenarios.
#[derive(Error, Debug)]
pub enum UnwinderError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("engine invariant violated: {0}")]
    Engine(#[from] EngineError),

    #[error("scenario task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
