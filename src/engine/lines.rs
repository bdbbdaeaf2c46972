// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Independent execution lines.
//!
//! A [`LineGroup`] runs several root frames side by side, each on its own
//! [`UnwindEngine`]. Lines are stepped round-robin in the order they were
//! added; a line keeps the turn until it reaches a `Yield` step or finishes.
//! Engines share nothing, so a signal on one line can never run, skip or
//! reorder deferred actions registered on another.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::engine::frame::FrameDef;
use crate::engine::trace::ExecutionTrace;
use crate::engine::unwind::{Outcome, StepResult, UnwindEngine};
use crate::errors::EngineError;
use crate::observability::messages::lines::{LineAbandoned, LineFinished, LineGroupStarted};
use crate::observability::messages::StructuredLog;

/// What happens to the rest of the group when a line ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationPolicy {
    /// The primary line finishing, or any line terminating, ends the whole
    /// group. Unfinished lines are abandoned with their deferreds unrun.
    #[default]
    AbortGroup,
    /// Every line runs to its own end.
    IsolateLine,
}

impl Display for TerminationPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationPolicy::AbortGroup => write!(f, "abort_group"),
            TerminationPolicy::IsolateLine => write!(f, "isolate_line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineOutcome {
    Finished { outcome: Outcome },
    /// The group ended first; `pending_deferred` actions never ran.
    Abandoned { pending_deferred: usize },
}

impl LineOutcome {
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            LineOutcome::Finished { outcome } => Some(outcome),
            LineOutcome::Abandoned { .. } => None,
        }
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, LineOutcome::Abandoned { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub name: String,
    pub outcome: LineOutcome,
    pub trace: ExecutionTrace,
}

/// Per-line reports in the order the lines were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    lines: Vec<LineReport>,
}

impl GroupReport {
    pub fn lines(&self) -> &[LineReport] {
        &self.lines
    }

    pub fn line(&self, name: &str) -> Option<&LineReport> {
        self.lines.iter().find(|line| line.name == name)
    }

    pub fn abandoned(&self) -> impl Iterator<Item = &LineReport> {
        self.lines.iter().filter(|line| line.outcome.is_abandoned())
    }

    pub fn into_lines(self) -> Vec<LineReport> {
        self.lines
    }
}

struct ExecutionLine {
    name: String,
    root: Arc<FrameDef>,
}

/// A live line during a group run.
struct RunningLine {
    name: String,
    engine: Option<UnwindEngine>,
    report: Option<LineReport>,
}

impl RunningLine {
    fn is_done(&self) -> bool {
        self.report.is_some()
    }

    /// Gives the line its turn. Returns true once the line has finished.
    fn advance(&mut self) -> Result<bool, EngineError> {
        match self.engine.as_mut() {
            Some(engine) => run_until_pause(engine),
            None => Err(EngineError::LineUnfinished {
                line: self.name.clone(),
            }),
        }
    }

    fn finish(&mut self) -> Result<&Outcome, EngineError> {
        let engine = self
            .engine
            .take()
            .ok_or_else(|| EngineError::LineUnfinished {
                line: self.name.clone(),
            })?;
        let outcome = engine.outcome().ok_or_else(|| EngineError::LineUnfinished {
            line: self.name.clone(),
        })?;
        LineFinished {
            line: &self.name,
            terminated: outcome.is_terminated(),
        }
        .log();

        let report = self.report.insert(LineReport {
            name: self.name.clone(),
            outcome: LineOutcome::Finished { outcome },
            trace: engine.into_trace(),
        });
        match &report.outcome {
            LineOutcome::Finished { outcome } => Ok(outcome),
            LineOutcome::Abandoned { .. } => Err(EngineError::LineUnfinished {
                line: self.name.clone(),
            }),
        }
    }

    fn abandon(&mut self, cause: &str) {
        if let Some(engine) = self.engine.take() {
            let pending_deferred = engine.pending_deferred();
            LineAbandoned {
                line: &self.name,
                pending_deferred,
                cause,
            }
            .log();
            self.report = Some(LineReport {
                name: self.name.clone(),
                outcome: LineOutcome::Abandoned { pending_deferred },
                trace: engine.into_trace(),
            });
        }
    }
}

/// A deterministic group of independent execution lines.
///
/// # Example
/// ```
/// use the_unwinder::actions::Announce;
/// use the_unwinder::engine::{FrameDef, LineGroup, Payload};
///
/// let sleeper = FrameDef::new("sleeper")
///     .defer(Announce::new("sleeper: defer func called"))
///     .yield_now();
/// let panicker = FrameDef::new("panicker")
///     .defer(Announce::new("panicker: defer func called"))
///     .raise(Payload::text("Whoops!"));
///
/// let report = LineGroup::new()
///     .line("sleeper-1", sleeper)
///     .primary("main", panicker)
///     .run()
///     .unwrap();
///
/// assert!(report.line("main").unwrap().outcome.outcome().unwrap().is_terminated());
/// assert!(report.line("sleeper-1").unwrap().outcome.is_abandoned());
/// ```
pub struct LineGroup {
    lines: Vec<ExecutionLine>,
    primary: Option<String>,
    policy: TerminationPolicy,
}

impl Default for LineGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl LineGroup {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            primary: None,
            policy: TerminationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a line. Names must be unique within the group; [`LineGroup::run`]
    /// rejects duplicates.
    pub fn line(mut self, name: impl Into<String>, root: impl Into<Arc<FrameDef>>) -> Self {
        self.lines.push(ExecutionLine {
            name: name.into(),
            root: root.into(),
        });
        self
    }

    /// Adds the line whose end ends the group under [`TerminationPolicy::AbortGroup`].
    pub fn primary(mut self, name: impl Into<String>, root: impl Into<Arc<FrameDef>>) -> Self {
        let name = name.into();
        self.primary = Some(name.clone());
        self.line(name, root)
    }

    pub fn policy(&self) -> TerminationPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn run(self) -> Result<GroupReport, EngineError> {
        let mut names = HashSet::new();
        for line in &self.lines {
            if !names.insert(line.name.clone()) {
                return Err(EngineError::DuplicateLine {
                    line: line.name.clone(),
                });
            }
        }

        let policy = self.policy;
        let primary = self.primary;

        LineGroupStarted {
            lines: self.lines.len(),
            primary: primary.as_deref().unwrap_or("-"),
            policy: &policy.to_string(),
        }
        .log();

        let mut running = self
            .lines
            .into_iter()
            .map(|line| {
                Ok(RunningLine {
                    engine: Some(UnwindEngine::start(line.root)?),
                    name: line.name,
                    report: None,
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        while running.iter().any(|line| !line.is_done()) {
            for index in 0..running.len() {
                if running[index].is_done() {
                    continue;
                }

                if !running[index].advance()? {
                    continue;
                }

                let terminated = running[index].finish()?.is_terminated();
                let is_primary = primary.as_deref() == Some(running[index].name.as_str());

                if policy == TerminationPolicy::AbortGroup && (terminated || is_primary) {
                    let cause = running[index].name.clone();
                    for line in running.iter_mut().filter(|line| !line.is_done()) {
                        line.abandon(&cause);
                    }
                    break;
                }
            }
        }

        let lines = running
            .into_iter()
            .map(|line| {
                line.report.ok_or(EngineError::LineUnfinished { line: line.name })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        Ok(GroupReport { lines })
    }
}

/// Steps `engine` until it yields or finishes. Returns true when finished.
fn run_until_pause(engine: &mut UnwindEngine) -> Result<bool, EngineError> {
    loop {
        match engine.step()? {
            StepResult::Continued => continue,
            StepResult::Yielded => return Ok(false),
            StepResult::Finished => return Ok(true),
        }
    }
}
