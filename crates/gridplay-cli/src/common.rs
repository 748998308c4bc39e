//! Helpers shared by the subcommands.

use anyhow::{anyhow, Result};
use gridplay_cli::cli::ScenarioSource;
use gridplay_scenarios::{load_scenario_from_path, preset, preset_names, Scenario};
use serde::Serialize;
use std::io::{self, Write};
use tracing::info;

/// Loads the scenario named by `--preset` or the positional file argument.
pub fn load_source(source: &ScenarioSource) -> Result<Scenario> {
    match (&source.scenario, &source.preset) {
        (_, Some(name)) => {
            info!(preset = %name, "using built-in level");
            preset(name).ok_or_else(|| {
                anyhow!(
                    "unknown preset '{}'; available: {}",
                    name,
                    preset_names().join(", ")
                )
            })
        }
        (Some(path), None) => {
            info!(path = %path.display(), "loading scenario");
            load_scenario_from_path(path)
        }
        (None, None) => Err(anyhow!("either a scenario file or --preset is required")),
    }
}

/// Label used in headings: the scenario's name, else where it came from.
pub fn scenario_label(source: &ScenarioSource, scenario: &Scenario) -> String {
    scenario
        .name
        .clone()
        .or_else(|| source.preset.clone())
        .or_else(|| source.scenario.as_ref().map(|p| p.display().to_string()))
        .unwrap_or_else(|| "scenario".to_string())
}

pub fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
