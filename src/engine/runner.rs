// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::consts::MAIN_LINE;
use crate::config::{background_line_name, build_call_chain, sleeper_line, Scenario};
use crate::engine::lines::{LineGroup, LineReport};
use crate::engine::trace::ExecutionTrace;
use crate::engine::unwind::{Outcome, UnwindEngine};
use crate::errors::{EngineError, UnwinderError};
use crate::observability::messages::engine::{RunCompleted, RunStarted};
use crate::observability::messages::StructuredLog;

/// Everything one scenario run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub outcome: Outcome,
    /// Trace of the main line.
    pub trace: ExecutionTrace,
    /// Sleeper lines, in start order.
    pub background: Vec<LineReport>,
}

impl RunReport {
    pub fn is_terminated(&self) -> bool {
        self.outcome.is_terminated()
    }
}

/// Runs a scenario's call chain to completion.
///
/// A signal that nothing intercepts is reported as
/// [`Outcome::Terminated`], not as an error. `Err` means the engine itself
/// found a broken invariant.
///
/// # Example
/// ```
/// use the_unwinder::config::Scenario;
/// use the_unwinder::engine::{run, ReturnValues};
///
/// let scenario = Scenario::from_tags("named", "seterr", "string").unwrap();
/// let report = run(&scenario).unwrap();
///
/// assert_eq!(
///     report.outcome.result(),
///     Some(&ReturnValues::default().with_error("panic recovered"))
/// );
/// ```
pub fn run(scenario: &Scenario) -> Result<RunReport, EngineError> {
    let start = scenario.start().to_string();
    let recovery = scenario.recovery().to_string();
    let start_msg = RunStarted {
        scenario: scenario.name(),
        start: &start,
        recovery: &recovery,
        payload: scenario.payload(),
        background_lines: scenario.background_lines(),
    };
    let span = start_msg.span("scenario_run");
    let _guard = span.enter();
    start_msg.log();

    let chain = build_call_chain(scenario);

    let (outcome, trace, background) = if scenario.background_lines() == 0 {
        let report = UnwindEngine::start(chain)?.run()?;
        (report.outcome, report.trace, Vec::new())
    } else {
        // Sleepers go first so they have registered their deferreds before
        // the main line can end the group.
        let mut group = LineGroup::new().with_policy(scenario.line_policy());
        for index in 0..scenario.background_lines() {
            group = group.line(background_line_name(index), sleeper_line());
        }
        let mut lines = group.primary(MAIN_LINE, chain).run()?.into_lines();

        let main_index = lines
            .iter()
            .position(|line| line.name == MAIN_LINE)
            .ok_or_else(|| EngineError::LineUnfinished {
                line: MAIN_LINE.to_string(),
            })?;
        let main = lines.remove(main_index);
        let outcome = main
            .outcome
            .outcome()
            .cloned()
            .ok_or_else(|| EngineError::LineUnfinished {
                line: MAIN_LINE.to_string(),
            })?;
        (outcome, main.trace, lines)
    };

    RunCompleted {
        scenario: scenario.name(),
        outcome: &outcome,
        events: trace.len(),
    }
    .log();

    Ok(RunReport {
        scenario: scenario.name().to_string(),
        outcome,
        trace,
        background,
    })
}

/// Runs every scenario on its own blocking task and returns the reports in
/// input order.
///
/// Engines share nothing, so the runs are independent; the first failing run
/// aborts the rest.
pub async fn run_all(scenarios: Vec<Scenario>) -> Result<Vec<RunReport>, UnwinderError> {
    let mut tasks = JoinSet::new();
    for (index, scenario) in scenarios.into_iter().enumerate() {
        tasks.spawn_blocking(move || run(&scenario).map(|report| (index, report)));
    }

    let mut reports: Vec<Option<RunReport>> = vec![None; tasks.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, report) = joined??;
        reports[index] = Some(report);
    }
    Ok(reports.into_iter().flatten().collect())
}
