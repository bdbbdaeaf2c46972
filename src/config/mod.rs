// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod call_chain;
mod loader;
mod scenario;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use call_chain::{background_line_name, build_call_chain, sleeper_line};
pub use loader::{
    load_and_validate_scenario, load_scenario_config, ScenarioConfig, ScenarioFormat,
};
pub use scenario::{PayloadTag, PayloadValue, RecoveryMode, Scenario, StartFunction};
pub use validation::validate_scenario;
