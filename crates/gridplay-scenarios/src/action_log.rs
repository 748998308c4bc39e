//! Player action log with validation against the base grid.

use gridplay_core::{GridConfig, RedispatchBounds};
use thiserror::Error;
use tracing::debug;

use crate::apply::apply_actions;
use crate::spec::GridAction;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("no generator or load named '{key}'")]
    UnknownNode { key: String },

    #[error("node '{key}' cannot be redispatched")]
    RedispatchNotAllowed { key: String },

    #[error("node '{key}' allows redispatch but has no {bound} bound")]
    MissingRedispatchBound { key: String, bound: &'static str },

    #[error("{target}: value {value} outside [{min}, {max}]")]
    OutOfBounds {
        target: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("no line named '{key}'")]
    UnknownLine { key: String },

    #[error("no substation named '{key}'")]
    UnknownSubstation { key: String },

    #[error("line '{line}' is not connected to substation '{substation}'")]
    LineNotAtSubstation { line: String, substation: String },

    #[error("substation '{substation}' has buses 1..={buses}; bus {bus} does not exist")]
    BusOutOfRange {
        substation: String,
        bus: u32,
        buses: u32,
    },

    #[error("no HVDC link named '{key}'")]
    UnknownHvdc { key: String },
}

/// Checks an action against the grid it will be applied to.
pub fn validate_action(grid: &GridConfig, action: &GridAction) -> Result<(), ActionError> {
    match action {
        GridAction::Redispatch { node_key, power } => {
            let bounds = redispatch_bounds(grid, node_key)?;
            if !bounds.allow_redispatch {
                return Err(ActionError::RedispatchNotAllowed {
                    key: node_key.clone(),
                });
            }
            let missing = |bound| ActionError::MissingRedispatchBound {
                key: node_key.clone(),
                bound,
            };
            let min = bounds.redispatch_min.ok_or_else(|| missing("minimum"))?;
            let max = bounds.redispatch_max.ok_or_else(|| missing("maximum"))?;
            check_range(node_key, *power, min, max)
        }
        GridAction::BusChange {
            substation_key,
            line_key,
            bus,
        } => {
            let substation = grid
                .nodes
                .substations
                .iter()
                .find(|sub| &sub.key == substation_key)
                .ok_or_else(|| ActionError::UnknownSubstation {
                    key: substation_key.clone(),
                })?;
            let lines = &grid.lines;
            let mut ends = lines
                .regular
                .iter()
                .filter(|l| &l.key == line_key)
                .map(|l| &l.ends)
                .chain(lines.pst.iter().filter(|l| &l.key == line_key).map(|l| &l.ends))
                .chain(lines.hvdc.iter().filter(|l| &l.key == line_key).map(|l| &l.ends))
                .peekable();
            if ends.peek().is_none() {
                return Err(ActionError::UnknownLine {
                    key: line_key.clone(),
                });
            }
            if !ends.any(|ends| ends.touches(substation_key)) {
                return Err(ActionError::LineNotAtSubstation {
                    line: line_key.clone(),
                    substation: substation_key.clone(),
                });
            }
            if *bus == 0 || *bus > substation.bus_count {
                return Err(ActionError::BusOutOfRange {
                    substation: substation_key.clone(),
                    bus: *bus,
                    buses: substation.bus_count,
                });
            }
            Ok(())
        }
        GridAction::HvdcSetpoint { hvdc_key, flow } => {
            let hvdc = grid
                .lines
                .hvdc
                .iter()
                .find(|h| &h.key == hvdc_key)
                .ok_or_else(|| ActionError::UnknownHvdc {
                    key: hvdc_key.clone(),
                })?;
            check_range(hvdc_key, *flow, hvdc.flow_min, hvdc.flow_max)
        }
    }
}

/// Generators are looked up before loads.
fn redispatch_bounds<'a>(
    grid: &'a GridConfig,
    key: &str,
) -> Result<&'a RedispatchBounds, ActionError> {
    let nodes = &grid.nodes;
    nodes
        .generators
        .iter()
        .find(|g| g.key == key)
        .map(|g| &g.redispatch)
        .or_else(|| nodes.loads.iter().find(|l| l.key == key).map(|l| &l.redispatch))
        .ok_or_else(|| ActionError::UnknownNode {
            key: key.to_string(),
        })
}

fn check_range(target: &str, value: f64, min: f64, max: f64) -> Result<(), ActionError> {
    if value < min || value > max || !value.is_finite() {
        return Err(ActionError::OutOfBounds {
            target: target.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Actions a player has added on top of a level's own.
///
/// Submitting an action for a target that already has one replaces it in place,
/// so the log holds at most one action per target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionLog {
    actions: Vec<GridAction>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[GridAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Records `action` without validation.
    pub fn submit(&mut self, action: GridAction) {
        match self
            .actions
            .iter_mut()
            .find(|existing| existing.target() == action.target())
        {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
    }

    /// Validates `action` against `grid`, then records it.
    pub fn try_submit(&mut self, grid: &GridConfig, action: GridAction) -> Result<(), ActionError> {
        if let Err(err) = validate_action(grid, &action) {
            debug!(%err, "rejected action");
            return Err(err);
        }
        self.submit(action);
        Ok(())
    }

    /// Builds the grid a solve should use: `base`, then `level_actions`, then this log.
    pub fn resolve(&self, base: &GridConfig, level_actions: &[GridAction]) -> GridConfig {
        let mut actions = Vec::with_capacity(level_actions.len() + self.actions.len());
        actions.extend_from_slice(level_actions);
        actions.extend_from_slice(&self.actions);
        apply_actions(base, &actions)
    }
}
