use std::collections::HashMap;

use gridplay_core::{GridConfig, LineEnds};
use tracing::{debug, warn};

use crate::spec::GridAction;

/// The element an action edits. Two actions with the same target overwrite each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTarget<'a> {
    /// Generator or load, by key.
    Node(&'a str),
    /// One line's endpoints on one substation.
    LineAtSubstation { line: &'a str, substation: &'a str },
    Hvdc(&'a str),
}

impl GridAction {
    pub fn target(&self) -> ActionTarget<'_> {
        match self {
            GridAction::Redispatch { node_key, .. } => ActionTarget::Node(node_key),
            GridAction::BusChange {
                substation_key,
                line_key,
                ..
            } => ActionTarget::LineAtSubstation {
                line: line_key,
                substation: substation_key,
            },
            GridAction::HvdcSetpoint { hvdc_key, .. } => ActionTarget::Hvdc(hvdc_key),
        }
    }
}

/// Keeps only the last action for each target, in their original relative order.
pub fn effective_actions(actions: &[GridAction]) -> Vec<&GridAction> {
    let mut last: HashMap<ActionTarget<'_>, usize> = HashMap::with_capacity(actions.len());
    for (index, action) in actions.iter().enumerate() {
        last.insert(action.target(), index);
    }
    actions
        .iter()
        .enumerate()
        .filter(|(index, action)| last.get(&action.target()) == Some(index))
        .map(|(_, action)| action)
        .collect()
}

/// Builds a new grid from `base` with `actions` applied.
///
/// For every target only the last matching action takes effect. Actions whose
/// target does not exist are skipped with a warning; use
/// [`crate::validate_action`] to reject them up front.
pub fn apply_actions(base: &GridConfig, actions: &[GridAction]) -> GridConfig {
    let mut grid = base.clone();
    let effective = effective_actions(actions);
    for action in &effective {
        if !apply_one(&mut grid, action) {
            warn!(?action, "action target not found; skipped");
        }
    }
    debug!(
        submitted = actions.len(),
        applied = effective.len(),
        "applied actions"
    );
    grid
}

fn apply_one(grid: &mut GridConfig, action: &GridAction) -> bool {
    match action {
        GridAction::Redispatch { node_key, power } => {
            let mut hit = false;
            for gen in grid.nodes.generators.iter_mut().filter(|g| &g.key == node_key) {
                gen.generation = *power;
                hit = true;
            }
            for load in grid.nodes.loads.iter_mut().filter(|l| &l.key == node_key) {
                load.load = *power;
                hit = true;
            }
            hit
        }
        GridAction::BusChange {
            substation_key,
            line_key,
            bus,
        } => line_ends_mut(grid, line_key)
            .into_iter()
            .fold(false, |hit, ends| ends.move_to_bus(substation_key, *bus) || hit),
        GridAction::HvdcSetpoint { hvdc_key, flow } => {
            let mut hit = false;
            for hvdc in grid.lines.hvdc.iter_mut().filter(|h| &h.key == hvdc_key) {
                hvdc.set_flow = *flow;
                hit = true;
            }
            hit
        }
    }
}

/// Endpoints of every line (regular, PST or HVDC) carrying `key`.
fn line_ends_mut<'a>(grid: &'a mut GridConfig, key: &str) -> Vec<&'a mut LineEnds> {
    let lines = &mut grid.lines;
    lines
        .regular
        .iter_mut()
        .filter(|line| line.key == key)
        .map(|line| &mut line.ends)
        .chain(
            lines
                .pst
                .iter_mut()
                .filter(|line| line.key == key)
                .map(|line| &mut line.ends),
        )
        .chain(
            lines
                .hvdc
                .iter_mut()
                .filter(|line| line.key == key)
                .map(|line| &mut line.ends),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{hvdc_tutorial_grid, sample_grid};

    #[test]
    fn redispatch_overwrites_generation_and_load() {
        let base = sample_grid();
        let grid = apply_actions(
            &base,
            &[
                GridAction::redispatch("gen1", 80.0),
                GridAction::redispatch("load1", 160.0),
            ],
        );
        assert_eq!(grid.nodes.generators[0].generation, 80.0);
        assert_eq!(grid.nodes.loads[0].load, 160.0);
        // base untouched
        assert_eq!(base.nodes.generators[0].generation, 90.0);
    }

    #[test]
    fn last_action_per_target_wins() {
        let actions = vec![
            GridAction::redispatch("gen1", 60.0),
            GridAction::hvdc_setpoint("hvdc1", 5.0),
            GridAction::redispatch("gen1", 110.0),
        ];
        let effective = effective_actions(&actions);
        assert_eq!(effective, vec![&actions[1], &actions[2]]);

        let grid = apply_actions(&sample_grid(), &actions);
        assert_eq!(grid.nodes.generators[0].generation, 110.0);
    }

    #[test]
    fn redispatch_does_not_accumulate() {
        let actions = vec![GridAction::redispatch("load1", 160.0); 3];
        let grid = apply_actions(&sample_grid(), &actions);
        assert_eq!(grid.nodes.loads[0].load, 160.0);
    }

    #[test]
    fn bus_change_moves_only_the_matching_endpoint() {
        let grid = apply_actions(
            &hvdc_tutorial_grid(),
            &[GridAction::bus_change("sub1", "line3", 3)],
        );
        let line3 = grid.lines.regular.iter().find(|l| l.key == "line3").unwrap();
        assert_eq!(line3.ends.bus_from, 3);
        assert_eq!(line3.ends.node_to_key, "load1");
        assert_eq!(line3.ends.bus_to, 0);
        let line1 = grid.lines.regular.iter().find(|l| l.key == "line1").unwrap();
        assert_eq!(line1.ends.bus_to, 1);
    }

    #[test]
    fn bus_change_reaches_hvdc_endpoints() {
        let grid = apply_actions(
            &hvdc_tutorial_grid(),
            &[GridAction::bus_change("sub2", "hvdc1", 1)],
        );
        assert_eq!(grid.lines.hvdc[0].ends.bus_to, 1);
        assert_eq!(grid.lines.hvdc[0].ends.bus_from, 1);
    }

    #[test]
    fn hvdc_setpoint_overwrites_set_flow() {
        let grid = apply_actions(
            &hvdc_tutorial_grid(),
            &[GridAction::hvdc_setpoint("hvdc1", -40.0)],
        );
        assert_eq!(grid.lines.hvdc[0].set_flow, -40.0);
    }

    #[test]
    fn unknown_targets_leave_the_grid_unchanged() {
        let base = sample_grid();
        let grid = apply_actions(
            &base,
            &[
                GridAction::redispatch("gen99", 1.0),
                GridAction::bus_change("sub1", "line99", 2),
                GridAction::bus_change("sub4", "line1", 2),
                GridAction::hvdc_setpoint("dc", 1.0),
            ],
        );
        assert_eq!(grid, base);
    }
}
