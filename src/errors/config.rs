// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::config::{RecoveryMode, StartFunction};

/// Errors that can occur while building or validating a scenario.
///
/// All of these are raised before any frame is entered, and all of them are
/// recoverable by asking for different input.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A tag did not name any known variant
    UnknownTag {
        /// Which scenario field the tag was for
        field: &'static str,
        /// The rejected tag
        value: String,
        /// Tags that would have been accepted
        allowed: &'static [&'static str],
    },
    /// The recovery mode writes into a named result the start function doesn't have
    RecoveryRequiresNamedResults {
        start: StartFunction,
        recovery: RecoveryMode,
    },
    /// A payload value override does not fit the payload tag
    PayloadValueMismatch { payload: String, value: String },
    /// More background lines were requested than the engine allows
    TooManyBackgroundLines { requested: usize, max: usize },
    /// A scenario file could not be read or parsed
    Load { path: String, reason: String },
    /// The scenario file extension is not one we can parse
    UnsupportedFormat { path: String },
    /// Validation found one or more problems
    Invalid { issues: Vec<ConfigError> },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownTag {
                field,
                value,
                allowed,
            } => {
                write!(
                    f,
                    "Unknown {} '{}' (expected one of: {})",
                    field,
                    value,
                    allowed.join(", ")
                )
            }
            ConfigError::RecoveryRequiresNamedResults { start, recovery } => {
                write!(
                    f,
                    "The starting function is set to {} but a recovery type of {} only works with a starting function of {}",
                    start,
                    recovery,
                    StartFunction::Named
                )
            }
            ConfigError::PayloadValueMismatch { payload, value } => {
                write!(f, "Payload '{}' cannot carry the value {}", payload, value)
            }
            ConfigError::TooManyBackgroundLines { requested, max } => {
                write!(
                    f,
                    "Requested {} background lines, at most {} are allowed",
                    requested, max
                )
            }
            ConfigError::Load { path, reason } => {
                write!(f, "Failed to load scenario '{}': {}", path, reason)
            }
            ConfigError::UnsupportedFormat { path } => {
                write!(
                    f,
                    "Unsupported scenario format for '{}': use .yaml, .yml or .toml",
                    path
                )
            }
            ConfigError::Invalid { issues } => {
                write!(f, "Scenario validation failed:")?;
                for issue in issues {
                    write!(f, "\n{}", issue)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}
