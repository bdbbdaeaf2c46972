// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::env;
use std::time::Instant;

use anyhow::Context;
use the_unwinder::config::{load_and_validate_scenario, Scenario};
use the_unwinder::engine::{
    run, run_all, ExecutionTrace, FrameId, LineOutcome, RunReport, TraceEvent,
};
use tracing_subscriber::EnvFilter;

const INDENT: &str = "   ";

fn usage(program: &str) {
    eprintln!("Usage: {} [--json] <scenario.yaml|scenario.toml> [more scenarios ...]", program);
    eprintln!("       {} [--json] --matrix", program);
    eprintln!("Example: {} configs/unnamed-basic.yaml configs/named-seterr.yaml", program);
    eprintln!("Example: RUST_LOG=info {} configs/panic-in-defer.yaml", program);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("the-unwinder");
    let json = args.iter().skip(1).any(|arg| arg == "--json");
    let matrix = args.iter().skip(1).any(|arg| arg == "--matrix");
    let scenario_files: Vec<&String> = args
        .iter()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .collect();

    if !matrix && scenario_files.is_empty() {
        usage(program);
        std::process::exit(1);
    }

    if matrix {
        return run_matrix(json).await;
    }

    let mut failures = 0;
    for (i, scenario_file) in scenario_files.iter().enumerate() {
        if i > 0 && !json {
            println!("\n{}", "─".repeat(80));
        }

        if let Err(e) = run_scenario_file(scenario_file, json) {
            eprintln!("❌ Failed to run {}: {:#}", scenario_file, e);
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} scenarios failed", failures, scenario_files.len());
    }
    Ok(())
}

fn run_scenario_file(scenario_file: &str, json: bool) -> anyhow::Result<()> {
    let scenario = load_and_validate_scenario(scenario_file)
        .with_context(|| format!("loading {}", scenario_file))?;

    let started = Instant::now();
    let report = run(&scenario)?;
    let elapsed = started.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📋 Scenario: {} ({})", scenario.name(), scenario_file);
    println!(
        "🔧 Start: {}   Recovery: {}   Payload: {}",
        scenario.start().frame_name(),
        scenario.recovery(),
        scenario.payload().describe()
    );
    println!(
        "⚙️  Raise: {}   Raise again in cleanup: {}   Background lines: {}",
        scenario.raise(),
        scenario.reraise_in_cleanup(),
        scenario.background_lines()
    );

    println!("\n🔄 Trace:");
    print_trace(&report.trace);
    print_background(&report);

    println!("\n🎯 Outcome:");
    match report.outcome.result() {
        Some(result) => println!(
            "{}{} returned: {}",
            INDENT,
            scenario.start().frame_name(),
            result
        ),
        None => println!("{}{}", INDENT, report.outcome),
    }
    println!("\n⏱️  Run Time: {:?}", elapsed);
    Ok(())
}

async fn run_matrix(json: bool) -> anyhow::Result<()> {
    let scenarios = Scenario::matrix();
    let count = scenarios.len();

    let started = Instant::now();
    let reports = run_all(scenarios).await?;
    let elapsed = started.elapsed();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    println!("📊 Scenario Matrix ({} scenarios)", count);
    println!("{}", "═".repeat(80));
    for report in &reports {
        let marker = if report.is_terminated() { "💥" } else { "✅" };
        println!("{} {:<32} {}", marker, report.scenario, report.outcome);
    }
    let terminated = reports.iter().filter(|r| r.is_terminated()).count();
    println!("{}", "═".repeat(80));
    println!(
        "Completed: {}   Terminated: {}   ⏱️  {:?}",
        reports.len() - terminated,
        terminated,
        elapsed
    );
    Ok(())
}

/// Prints the trace indented by frame depth.
fn print_trace(trace: &ExecutionTrace) {
    let mut depths: HashMap<FrameId, usize> = HashMap::new();
    for event in trace {
        if let TraceEvent::FrameEntered { frame, depth, .. } = event {
            depths.insert(*frame, *depth);
        }
    }

    for event in trace {
        let depth = event_frame(event)
            .and_then(|frame| depths.get(&frame))
            .copied()
            .unwrap_or(0);
        println!("{}{}", INDENT.repeat(depth + 1), render(trace, event));
    }
}

fn event_frame(event: &TraceEvent) -> Option<FrameId> {
    match event {
        TraceEvent::FrameEntered { frame, .. }
        | TraceEvent::FrameLeftNormally { frame }
        | TraceEvent::FrameUnwound { frame, .. }
        | TraceEvent::SignalRaised { frame, .. }
        | TraceEvent::DeferRan { frame, .. }
        | TraceEvent::SignalIntercepted { frame, .. }
        | TraceEvent::SignalReRaised { frame, .. }
        | TraceEvent::ResultBound { frame, .. } => Some(*frame),
    }
}

fn render(trace: &ExecutionTrace, event: &TraceEvent) -> String {
    let name = |frame: &FrameId| trace.frame_name(*frame).unwrap_or("?").to_string();
    match event {
        TraceEvent::FrameEntered { frame, .. } => format!("{} - entered", name(frame)),
        TraceEvent::FrameLeftNormally { frame } => format!("{} - left", name(frame)),
        TraceEvent::FrameUnwound { frame, signal } => {
            format!("{} - unwound by signal {}", name(frame), signal)
        }
        TraceEvent::SignalRaised { frame, payload, .. } => {
            format!("{} - raising ({})", name(frame), payload.describe())
        }
        TraceEvent::DeferRan { frame, index } => {
            format!("{}(deferred #{}) - ran", name(frame), index)
        }
        TraceEvent::SignalIntercepted { frame, signal } => {
            format!("{}(deferred) - intercepted signal {}", name(frame), signal)
        }
        TraceEvent::SignalReRaised {
            frame,
            discarded,
            payload,
            ..
        } => format!(
            "{}(deferred) - signal {} replaced by ({})",
            name(frame),
            discarded,
            payload.describe()
        ),
        TraceEvent::ResultBound {
            frame,
            value,
            source,
        } => format!("{} - result {} (from {:?})", name(frame), value, source),
    }
}

fn print_background(report: &RunReport) {
    if report.background.is_empty() {
        return;
    }
    println!("\n🧵 Background Lines:");
    for line in &report.background {
        match &line.outcome {
            LineOutcome::Finished { outcome } => {
                println!("{}{} - {}", INDENT, line.name, outcome)
            }
            LineOutcome::Abandoned { pending_deferred } => println!(
                "{}{} - abandoned, {} deferred actions never ran",
                INDENT, line.name, pending_deferred
            ),
        }
    }
}
