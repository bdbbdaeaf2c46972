// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scenario values.
//!
//! A [`Scenario`] is the immutable, already-validated description of one run:
//! which starting function, which recovery, what gets raised and how many
//! background lines run next to it. Everything here can be built from the
//! short tags used on the command line and in scenario files
//! (`named`, `seterr`, `struct`, ...); an unknown tag is a [`ConfigError`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::config::consts::{
    DEFAULT_ERROR_PAYLOAD, DEFAULT_INTEGER_PAYLOAD, DEFAULT_TEXT_PAYLOAD, MAX_BACKGROUND_LINES,
    STRUCT_PAYLOAD_TYPE,
};
use crate::engine::binding::ResultBinding;
use crate::engine::lines::TerminationPolicy;
use crate::engine::payload::{FieldValue, Payload, StructuredValue};
use crate::errors::ConfigError;

/// Which variant of the starting function begins the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartFunction {
    #[default]
    Unnamed,
    Named,
}

impl StartFunction {
    pub const ALLOWED: &'static [&'static str] = &["unnamed", "named"];
    pub const ALL: [StartFunction; 2] = [StartFunction::Unnamed, StartFunction::Named];

    /// Frame name of the starting function.
    pub fn frame_name(&self) -> &'static str {
        match self {
            StartFunction::Unnamed => "unnamedReturnVals",
            StartFunction::Named => "namedReturnVals",
        }
    }

    pub fn binding(&self) -> ResultBinding {
        match self {
            StartFunction::Unnamed => ResultBinding::Unnamed,
            StartFunction::Named => ResultBinding::Named,
        }
    }
}

impl Display for StartFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StartFunction::Unnamed => write!(f, "unnamed"),
            StartFunction::Named => write!(f, "named"),
        }
    }
}

impl FromStr for StartFunction {
    type Err = ConfigError;

    /// Accepts the short tag or the starting function's frame name.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "unnamed" | "unnamedReturnVals" => Ok(StartFunction::Unnamed),
            "named" | "namedReturnVals" => Ok(StartFunction::Named),
            other => Err(ConfigError::UnknownTag {
                field: "start",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// How the starting function recovers, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMode {
    #[default]
    None,
    /// Recover and report what was recovered.
    Basic,
    /// Recover and write an error into the named result.
    SetErrorOnRecover,
}

impl RecoveryMode {
    pub const ALLOWED: &'static [&'static str] = &["none", "basic", "seterr"];
    pub const ALL: [RecoveryMode; 3] = [
        RecoveryMode::None,
        RecoveryMode::Basic,
        RecoveryMode::SetErrorOnRecover,
    ];

    /// True if the mode's effect only reaches the caller through named results.
    pub fn requires_named_results(&self) -> bool {
        matches!(self, RecoveryMode::SetErrorOnRecover)
    }
}

impl Display for RecoveryMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryMode::None => write!(f, "none"),
            RecoveryMode::Basic => write!(f, "basic"),
            RecoveryMode::SetErrorOnRecover => write!(f, "seterr"),
        }
    }
}

impl FromStr for RecoveryMode {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "none" => Ok(RecoveryMode::None),
            "basic" => Ok(RecoveryMode::Basic),
            "seterr" => Ok(RecoveryMode::SetErrorOnRecover),
            other => Err(ConfigError::UnknownTag {
                field: "recovery",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Payload tag as written in scenario input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadTag {
    Nil,
    Int,
    String,
    ErrorValue,
    Struct,
}

impl PayloadTag {
    pub const ALLOWED: &'static [&'static str] = &["nil", "int", "string", "err", "struct"];
    pub const ALL: [PayloadTag; 5] = [
        PayloadTag::Nil,
        PayloadTag::Int,
        PayloadTag::String,
        PayloadTag::ErrorValue,
        PayloadTag::Struct,
    ];

    pub fn default_payload(&self) -> Payload {
        match self {
            PayloadTag::Nil => Payload::None,
            PayloadTag::Int => Payload::Integer(DEFAULT_INTEGER_PAYLOAD),
            PayloadTag::String => Payload::text(DEFAULT_TEXT_PAYLOAD),
            PayloadTag::ErrorValue => Payload::error(DEFAULT_ERROR_PAYLOAD),
            PayloadTag::Struct => Payload::Structured(
                StructuredValue::new(STRUCT_PAYLOAD_TYPE)
                    .with_int("i", DEFAULT_INTEGER_PAYLOAD)
                    .with_text("s", DEFAULT_TEXT_PAYLOAD),
            ),
        }
    }

    /// Builds the payload for this tag from an overriding value.
    pub fn payload_with(&self, value: &PayloadValue) -> Result<Payload, ConfigError> {
        match (self, value) {
            (PayloadTag::Int, PayloadValue::Integer(n)) => Ok(Payload::Integer(*n)),
            (PayloadTag::String, PayloadValue::Text(text)) => Ok(Payload::text(text.clone())),
            (PayloadTag::ErrorValue, PayloadValue::Text(message)) => {
                Ok(Payload::error(message.clone()))
            }
            (PayloadTag::Struct, PayloadValue::Fields(fields)) => {
                let mut value = StructuredValue::new(STRUCT_PAYLOAD_TYPE);
                value.fields = fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.clone()))
                    .collect();
                Ok(Payload::Structured(value))
            }
            (tag, value) => Err(ConfigError::PayloadValueMismatch {
                payload: tag.to_string(),
                value: value.to_string(),
            }),
        }
    }
}

impl Display for PayloadTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            PayloadTag::Nil => "nil",
            PayloadTag::Int => "int",
            PayloadTag::String => "string",
            PayloadTag::ErrorValue => "err",
            PayloadTag::Struct => "struct",
        };
        write!(f, "{}", tag)
    }
}

impl FromStr for PayloadTag {
    type Err = ConfigError;

    fn from_str(tag: &str) -> Result<Self, ConfigError> {
        match tag {
            "nil" => Ok(PayloadTag::Nil),
            "int" => Ok(PayloadTag::Int),
            "string" => Ok(PayloadTag::String),
            "err" => Ok(PayloadTag::ErrorValue),
            "struct" => Ok(PayloadTag::Struct),
            other => Err(ConfigError::UnknownTag {
                field: "payload",
                value: other.to_string(),
                allowed: Self::ALLOWED,
            }),
        }
    }
}

/// Optional override for a payload's default value.
///
/// ```yaml
/// payload: struct
/// value: { i: 7, s: "seven" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Integer(i64),
    Text(String),
    Fields(BTreeMap<String, FieldValue>),
}

impl Display for PayloadValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadValue::Integer(n) => write!(f, "{}", n),
            PayloadValue::Text(text) => write!(f, "{:?}", text),
            PayloadValue::Fields(fields) => write!(f, "{} fields", fields.len()),
        }
    }
}

/// A validated run description.
///
/// # Example
/// ```
/// use the_unwinder::config::{RecoveryMode, Scenario, StartFunction};
/// use the_unwinder::engine::Payload;
///
/// let scenario = Scenario::from_tags("named", "seterr", "int").unwrap();
/// assert_eq!(scenario.start(), StartFunction::Named);
/// assert_eq!(scenario.recovery(), RecoveryMode::SetErrorOnRecover);
/// assert_eq!(scenario.payload(), &Payload::Integer(42));
///
/// assert!(Scenario::from_tags("unnamed", "seterr", "int").is_err());
/// assert!(Scenario::from_tags("unnamed", "basic", "float").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    name: String,
    start: StartFunction,
    recovery: RecoveryMode,
    payload: Payload,
    raise: bool,
    reraise_in_cleanup: bool,
    background_lines: usize,
    line_policy: TerminationPolicy,
}

impl Scenario {
    pub fn new(
        start: StartFunction,
        recovery: RecoveryMode,
        payload: Payload,
    ) -> Result<Self, ConfigError> {
        if recovery.requires_named_results() && start != StartFunction::Named {
            return Err(ConfigError::RecoveryRequiresNamedResults { start, recovery });
        }
        Ok(Self {
            name: format!("{}-{}-{}", start, recovery, payload.kind()),
            start,
            recovery,
            payload,
            raise: true,
            reraise_in_cleanup: false,
            background_lines: 0,
            line_policy: TerminationPolicy::default(),
        })
    }

    /// Parses the three tags, then validates the combination.
    pub fn from_tags(start: &str, recovery: &str, payload: &str) -> Result<Self, ConfigError> {
        let start = start.parse::<StartFunction>()?;
        let recovery = recovery.parse::<RecoveryMode>()?;
        let payload = payload.parse::<PayloadTag>()?;
        let scenario = Self::new(start, recovery, payload.default_payload())?;
        Ok(scenario.with_name(format!("{}-{}-{}", start, recovery, payload)))
    }

    /// Every valid combination of start, recovery, payload and the two raise
    /// flags. Re-raising is only varied when something is raised.
    pub fn matrix() -> Vec<Scenario> {
        let mut scenarios = Vec::new();
        for start in StartFunction::ALL {
            for recovery in RecoveryMode::ALL {
                for tag in PayloadTag::ALL {
                    let Ok(base) = Self::new(start, recovery, tag.default_payload()) else {
                        continue;
                    };
                    let name = format!("{}-{}-{}", start, recovery, tag);
                    scenarios.push(base.clone().with_name(name.clone()));
                    scenarios.push(
                        base.clone()
                            .with_reraise_in_cleanup(true)
                            .with_name(format!("{}-reraise", name)),
                    );
                    scenarios.push(
                        base.with_raise(false)
                            .with_name(format!("{}-no-raise", name)),
                    );
                }
            }
        }
        scenarios
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_raise(mut self, raise: bool) -> Self {
        self.raise = raise;
        self
    }

    pub fn with_reraise_in_cleanup(mut self, reraise: bool) -> Self {
        self.reraise_in_cleanup = reraise;
        self
    }

    pub fn with_line_policy(mut self, policy: TerminationPolicy) -> Self {
        self.line_policy = policy;
        self
    }

    pub fn with_background_lines(mut self, lines: usize) -> Result<Self, ConfigError> {
        if lines > MAX_BACKGROUND_LINES {
            return Err(ConfigError::TooManyBackgroundLines {
                requested: lines,
                max: MAX_BACKGROUND_LINES,
            });
        }
        self.background_lines = lines;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> StartFunction {
        self.start
    }

    pub fn recovery(&self) -> RecoveryMode {
        self.recovery
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn raise(&self) -> bool {
        self.raise
    }

    pub fn reraise_in_cleanup(&self) -> bool {
        self.reraise_in_cleanup
    }

    /// True when `f2`'s cleanup will actually raise.
    pub fn raises_in_cleanup(&self) -> bool {
        self.raise && self.reraise_in_cleanup
    }

    pub fn background_lines(&self) -> usize {
        self.background_lines
    }

    pub fn line_policy(&self) -> TerminationPolicy {
        self.line_policy
    }
}
