// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Payload model for raised signals.
//!
//! A raise always carries exactly one [`Payload`] variant. The variant is the
//! only statement about what was raised: `Payload::None` is a real payload
//! ("raised with nothing"), which is different from there being no signal at
//! all. Absence is always expressed one level up, as `Option<Payload>` or
//! `Option<Signal>`.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The value carried by a raised signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Raised with no value (the `nil` raise).
    None,
    Integer(i64),
    Text(String),
    Structured(StructuredValue),
    /// An error value carrying its message.
    Error(String),
}

/// Discriminant of a [`Payload`] without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    None,
    Integer,
    Text,
    Structured,
    Error,
}

/// A record-shaped payload with ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredValue {
    pub type_name: String,
    pub fields: Vec<(String, FieldValue)>,
}

/// Scalar value of a [`StructuredValue`] field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl Payload {
    pub fn text(value: impl Into<String>) -> Self {
        Payload::Text(value.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Payload::Error(message.into())
    }

    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::None => PayloadKind::None,
            Payload::Integer(_) => PayloadKind::Integer,
            Payload::Text(_) => PayloadKind::Text,
            Payload::Structured(_) => PayloadKind::Structured,
            Payload::Error(_) => PayloadKind::Error,
        }
    }

    /// True only for the `None` variant.
    ///
    /// This is what a "did recover give me something?" nil-check sees. It says
    /// nothing about whether a signal is active.
    pub fn is_nil(&self) -> bool {
        matches!(self, Payload::None)
    }

    /// `kind: value` rendering used in logs and traces.
    pub fn describe(&self) -> String {
        format!("{}: {}", self.kind(), self)
    }
}

impl StructuredValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_int(mut self, name: impl Into<String>, value: i64) -> Self {
        self.fields.push((name.into(), FieldValue::Int(value)));
        self
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FieldValue::Text(value.into())));
        self
    }
}

impl Display for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::None => write!(f, "nil"),
            Payload::Integer(value) => write!(f, "{}", value),
            Payload::Text(value) => write!(f, "{}", value),
            Payload::Structured(value) => write!(f, "{}", value),
            Payload::Error(message) => write!(f, "{}", message),
        }
    }
}

impl Display for StructuredValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{", self.type_name)?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                FieldValue::Int(v) => write!(f, "{}: {}", name, v)?,
                FieldValue::Text(v) => write!(f, "{}: {:?}", name, v)?,
            }
        }
        write!(f, "}}")
    }
}

impl Display for PayloadKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PayloadKind::None => "none",
            PayloadKind::Integer => "integer",
            PayloadKind::Text => "text",
            PayloadKind::Structured => "structured",
            PayloadKind::Error => "error",
        };
        write!(f, "{}", name)
    }
}
