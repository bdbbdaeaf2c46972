// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::scenario::{PayloadTag, PayloadValue, RecoveryMode, Scenario, StartFunction};
use crate::config::validation::validate_scenario;
use crate::engine::lines::TerminationPolicy;
use crate::errors::ConfigError;
use crate::observability::messages::validation::{ScenarioLoaded, ScenarioRejected};
use crate::observability::messages::StructuredLog;

/// Scenario file contents, before validation.
///
/// Every tag is kept as the raw string so that validation can report all
/// unknown tags at once, each with the list of accepted values.
///
/// # Fields
/// * `name` - Label for reports (defaults to the file stem)
/// * `start` - `unnamed` or `named`; defaults to `named` for `seterr`, else `unnamed`
/// * `recovery` - `none`, `basic` or `seterr` (defaults to `none`)
/// * `payload` - `nil`, `int`, `string`, `err` or `struct` (defaults to `string`)
/// * `value` - Optional override of the payload's default value
/// * `raise` - Whether `panicker` raises at all (defaults to true)
/// * `panic_in_defer` - Whether `f2`'s cleanup raises again while unwinding
/// * `background_lines` - Number of sleeper lines started before the main line
/// * `line_policy` - `abort_group` (default) or `isolate_line`
///
/// # Example
/// ```yaml
/// name: named-seterr-struct
/// start: named
/// recovery: seterr
/// payload: struct
/// value: { i: 7, s: "seven" }
/// panic_in_defer: true
/// background_lines: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default = "default_recovery")]
    pub recovery: String,
    #[serde(default = "default_payload")]
    pub payload: String,
    #[serde(default)]
    pub value: Option<PayloadValue>,
    #[serde(default = "default_raise")]
    pub raise: bool,
    #[serde(default)]
    pub panic_in_defer: bool,
    #[serde(default)]
    pub background_lines: usize,
    #[serde(default)]
    pub line_policy: TerminationPolicy,
}

fn default_recovery() -> String {
    RecoveryMode::None.to_string()
}

fn default_payload() -> String {
    PayloadTag::String.to_string()
}

fn default_raise() -> bool {
    true
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: None,
            start: None,
            recovery: default_recovery(),
            payload: default_payload(),
            value: None,
            raise: default_raise(),
            panic_in_defer: false,
            background_lines: 0,
            line_policy: TerminationPolicy::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The start tag, filled in when the file leaves it out.
    ///
    /// `seterr` only works with named results, so it pulls the default start
    /// over to `named`; an explicit `unnamed` is still rejected.
    pub fn start_tag(&self) -> String {
        match &self.start {
            Some(start) => start.clone(),
            None if self.recovery == RecoveryMode::SetErrorOnRecover.to_string() => {
                StartFunction::Named.to_string()
            }
            None => StartFunction::Unnamed.to_string(),
        }
    }

    /// Validates and converts into a [`Scenario`].
    pub fn into_scenario(self) -> Result<Scenario, ConfigError> {
        let name = self.name.clone().unwrap_or_else(|| {
            format!("{}-{}-{}", self.start_tag(), self.recovery, self.payload)
        });

        if let Err(issues) = validate_scenario(&self) {
            let reason = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            ScenarioRejected {
                scenario: &name,
                issue_count: issues.len(),
                reason: &reason,
            }
            .log();
            return Err(ConfigError::Invalid { issues });
        }

        let start = self.start_tag().parse::<StartFunction>()?;
        let recovery = self.recovery.parse::<RecoveryMode>()?;
        let tag = self.payload.parse::<PayloadTag>()?;
        let payload = match &self.value {
            Some(value) => tag.payload_with(value)?,
            None => tag.default_payload(),
        };

        Ok(Scenario::new(start, recovery, payload)?
            .with_name(name)
            .with_raise(self.raise)
            .with_reraise_in_cleanup(self.panic_in_defer)
            .with_line_policy(self.line_policy)
            .with_background_lines(self.background_lines)?)
    }
}

/// Scenario file formats, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioFormat {
    Yaml,
    Toml,
}

impl ScenarioFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(ScenarioFormat::Yaml),
            Some("toml") => Ok(ScenarioFormat::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioFormat::Yaml => "yaml",
            ScenarioFormat::Toml => "toml",
        }
    }
}

/// Load a scenario file without validating it
pub fn load_scenario_config<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let format = ScenarioFormat::from_path(path)?;

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Load {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    let parsed = match format {
        ScenarioFormat::Yaml => ScenarioConfig::from_yaml_str(&content).map_err(|e| e.to_string()),
        ScenarioFormat::Toml => ScenarioConfig::from_toml_str(&content).map_err(|e| e.to_string()),
    };
    let mut config = parsed.map_err(|reason| ConfigError::Load {
        path: display.clone(),
        reason,
    })?;

    if config.name.is_none() {
        config.name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_string);
    }

    ScenarioLoaded {
        path: &display,
        format: format.name(),
    }
    .log();
    Ok(config)
}

/// Load and validate a scenario file
///
/// Validation problems are collected and returned together as
/// [`ConfigError::Invalid`].
pub fn load_and_validate_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, ConfigError> {
    load_scenario_config(path)?.into_scenario()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::payload::Payload;
    use std::io::Write;
    use tempfile::Builder;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_minimal_yaml_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml_str("payload: int\n").unwrap();

        assert_eq!(cfg.recovery, "none");
        assert!(cfg.raise);
        assert!(!cfg.panic_in_defer);
        assert_eq!(cfg.line_policy, TerminationPolicy::AbortGroup);
        assert_eq!(cfg.start_tag(), "unnamed");
    }

    #[test]
    fn test_seterr_defaults_start_to_named() {
        let cfg = ScenarioConfig::from_yaml_str("recovery: seterr\n").unwrap();
        assert_eq!(cfg.start_tag(), "named");

        let scenario = cfg.into_scenario().unwrap();
        assert_eq!(scenario.start(), StartFunction::Named);
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_temp(
            ".yaml",
            r#"
name: struct-override
start: named
recovery: basic
payload: struct
value: { i: 7, s: "seven" }
panic_in_defer: true
background_lines: 2
"#,
        );

        let scenario = load_and_validate_scenario(file.path()).unwrap();
        assert_eq!(scenario.name(), "struct-override");
        assert_eq!(
            scenario.payload().to_string(),
            "panicStruct{i: 7, s: \"seven\"}"
        );
        assert!(scenario.raises_in_cleanup());
        assert_eq!(scenario.background_lines(), 2);
    }

    #[test]
    fn test_load_toml_file_names_scenario_after_file() {
        let file = write_temp(
            ".toml",
            r#"
start = "named"
recovery = "seterr"
payload = "err"
value = "Whoops!"
"#,
        );

        let scenario = load_and_validate_scenario(file.path()).unwrap();
        assert_eq!(scenario.payload(), &Payload::error("Whoops!"));
        let stem = file.path().file_stem().unwrap().to_str().unwrap();
        assert_eq!(scenario.name(), stem);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".json", "{}");
        let err = load_and_validate_scenario(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_and_validate_scenario("does/not/exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_invalid_file_reports_every_issue() {
        let file = write_temp(
            ".yaml",
            r#"
start: unnamed
recovery: seterr
payload: float
"#,
        );

        match load_and_validate_scenario(file.path()).unwrap_err() {
            ConfigError::Invalid { issues } => {
                assert_eq!(issues.len(), 2);
                assert!(issues.iter().any(|issue| matches!(
                    issue,
                    ConfigError::UnknownTag {
                        field: "payload",
                        ..
                    }
                )));
                assert!(issues.iter().any(|issue| matches!(
                    issue,
                    ConfigError::RecoveryRequiresNamedResults { .. }
                )));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }
}
