use anyhow::{Context, Result};
use gridplay_core::GridConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::apply::apply_actions;

/// A single player edit, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridAction {
    /// Overwrites the generation of a generator or the load of a load.
    #[serde(rename_all = "camelCase")]
    Redispatch { node_key: String, power: f64 },
    /// Moves the endpoint(s) of a line that sit on a substation onto another bus.
    #[serde(rename = "buschange", rename_all = "camelCase")]
    BusChange {
        substation_key: String,
        line_key: String,
        bus: u32,
    },
    /// Overwrites the set flow of a DC link.
    #[serde(rename = "hvdc", rename_all = "camelCase")]
    HvdcSetpoint { hvdc_key: String, flow: f64 },
}

impl GridAction {
    pub fn redispatch(node_key: impl Into<String>, power: f64) -> Self {
        GridAction::Redispatch {
            node_key: node_key.into(),
            power,
        }
    }

    pub fn bus_change(
        substation_key: impl Into<String>,
        line_key: impl Into<String>,
        bus: u32,
    ) -> Self {
        GridAction::BusChange {
            substation_key: substation_key.into(),
            line_key: line_key.into(),
            bus,
        }
    }

    pub fn hvdc_setpoint(hvdc_key: impl Into<String>, flow: f64) -> Self {
        GridAction::HvdcSetpoint {
            hvdc_key: hvdc_key.into(),
            flow,
        }
    }
}

/// A level: a base grid plus the actions authored alongside it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub grid: GridConfig,
    #[serde(default)]
    pub actions: Vec<GridAction>,
}

impl Scenario {
    pub fn new(grid: GridConfig) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    /// The grid the solver should see: base grid with the scenario's actions applied.
    pub fn resolve(&self) -> GridConfig {
        apply_actions(&self.grid, &self.actions)
    }

    /// Like [`Scenario::resolve`] with extra actions appended after the scenario's own.
    pub fn resolve_with(&self, extra: &[GridAction]) -> GridConfig {
        let mut actions = self.actions.clone();
        actions.extend_from_slice(extra);
        apply_actions(&self.grid, &actions)
    }
}

/// Reads a scenario from JSON or YAML, picking the format from the file extension.
pub fn load_scenario_from_path(path: &Path) -> Result<Scenario> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario '{}'", path.display()))?;
    parse_document(path, &data).with_context(|| format!("parsing scenario '{}'", path.display()))
}

/// Reads a bare action list (`[ {"kind": ...}, ... ]`) from JSON or YAML.
pub fn load_actions_from_path(path: &Path) -> Result<Vec<GridAction>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading action file '{}'", path.display()))?;
    parse_document(path, &data)
        .with_context(|| format!("parsing action file '{}'", path.display()))
}

fn parse_document<T: serde::de::DeserializeOwned>(path: &Path, data: &str) -> Result<T> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(data).context("invalid yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(data).context("invalid json")
        }
        _ => serde_yaml::from_str(data)
            .or_else(|_| serde_json::from_str(data))
            .context("neither yaml nor json"),
    }
}
