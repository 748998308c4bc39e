//! Power flow analysis facade
//!
//! Provides a builder-style API that runs the full pipeline on an editable grid.

use std::collections::BTreeMap;

use gridplay_core::{
    ghost_line_keys, prepare, split_islands, ConfigurationError, GridConfig, LinearSystemBackend,
    SolverGridConfig, SolverKind,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::power_flow::{solve_island, IslandCondition, IslandSolution, LineFlowResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum IslandStatus {
    Solved,
    Unbalanced { net_mw: f64 },
    Singular { reason: String },
    Empty,
    Invalid { reason: String },
}

impl IslandStatus {
    pub fn is_solved(&self) -> bool {
        matches!(self, IslandStatus::Solved)
    }
}

impl From<&IslandCondition> for IslandStatus {
    fn from(condition: &IslandCondition) -> Self {
        match condition {
            IslandCondition::Imbalance { net_mw } => IslandStatus::Unbalanced { net_mw: *net_mw },
            IslandCondition::Singular { source } => IslandStatus::Singular {
                reason: source.to_string(),
            },
            IslandCondition::Empty => IslandStatus::Empty,
            IslandCondition::NodeOutOfRange { .. } => IslandStatus::Invalid {
                reason: condition.to_string(),
            },
        }
    }
}

/// What happened to one island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandReport {
    pub island_id: usize,
    pub node_keys: Vec<String>,
    pub line_keys: Vec<String>,
    pub net_injection_mw: f64,
    #[serde(flatten)]
    pub status: IslandStatus,
}

/// Merged result of a full solve.
///
/// `flows` only holds lines of islands that solved; a missing key means the line's
/// island was unbalanced or singular. The matching [`IslandReport`] says which.
///
/// An HVDC link has no entry under its own key. It reports through its ghost
/// lines `<key>_line_in` and `<key>_line_out`; use [`PowerFlowOutcome::hvdc_flow`]
/// to look one up by the link key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerFlowOutcome {
    pub flows: BTreeMap<String, LineFlowResult>,
    pub islands: Vec<IslandReport>,
}

impl PowerFlowOutcome {
    pub fn overloaded_lines(&self) -> impl Iterator<Item = &LineFlowResult> {
        self.flows.values().filter(|flow| flow.overloaded)
    }

    /// Keys of lines that belong to islands without a solution.
    pub fn unsolved_lines(&self) -> impl Iterator<Item = &str> {
        self.islands
            .iter()
            .filter(|island| !island.status.is_solved())
            .flat_map(|island| island.line_keys.iter().map(String::as_str))
    }

    /// Flow through the HVDC link `hvdc_key`, read from its inbound ghost line.
    /// `None` when that line's island did not solve or the link does not exist.
    pub fn hvdc_flow(&self, hvdc_key: &str) -> Option<&LineFlowResult> {
        let (line_in, _) = ghost_line_keys(hvdc_key);
        self.flows.get(&line_in)
    }

    pub fn solved_island_count(&self) -> usize {
        self.islands
            .iter()
            .filter(|island| island.status.is_solved())
            .count()
    }
}

/// Fluent builder for a DC power flow over an editable grid.
pub struct PowerFlowAnalysis<'a> {
    grid: &'a GridConfig,
    solver: SolverKind,
    parallel: bool,
}

impl<'a> PowerFlowAnalysis<'a> {
    pub fn new(grid: &'a GridConfig) -> Self {
        Self {
            grid,
            solver: SolverKind::default(),
            parallel: false,
        }
    }

    /// Select the linear system backend
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Solve islands concurrently (needs the `parallel` feature; ignored otherwise)
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs prepare → split → per-island solve → merge.
    ///
    /// Only a [`ConfigurationError`] fails the call. Islands that cannot be solved
    /// are logged, recorded in [`PowerFlowOutcome::islands`] and left out of
    /// [`PowerFlowOutcome::flows`].
    pub fn solve(self) -> Result<PowerFlowOutcome, ConfigurationError> {
        let graph = prepare(self.grid)?;
        let islands = split_islands(&graph);
        let backend = self.solver.build_solver();
        let results = solve_all(&islands, backend.as_ref(), self.parallel);

        let mut outcome = PowerFlowOutcome::default();
        for (island_id, (island, result)) in islands.iter().zip(results).enumerate() {
            let status = match result {
                Ok(IslandSolution { flows, .. }) => {
                    outcome.flows.extend(flows);
                    IslandStatus::Solved
                }
                Err(condition) => {
                    warn!(
                        island = island_id,
                        nodes = island.node_count(),
                        lines = island.line_count(),
                        "skipping island: {condition}"
                    );
                    IslandStatus::from(&condition)
                }
            };
            outcome.islands.push(IslandReport {
                island_id,
                node_keys: island.nodes.iter().map(|n| n.full_key.clone()).collect(),
                line_keys: island.lines.iter().map(|l| l.key.clone()).collect(),
                net_injection_mw: island.net_injection_mw(),
                status,
            });
        }

        info!(
            solver = %self.solver,
            islands = outcome.islands.len(),
            solved = outcome.solved_island_count(),
            lines = outcome.flows.len(),
            overloaded = outcome.overloaded_lines().count(),
            "DC power flow complete"
        );
        Ok(outcome)
    }
}

type IslandResult = Result<IslandSolution, IslandCondition>;

#[cfg(feature = "parallel")]
fn solve_all(
    islands: &[SolverGridConfig],
    backend: &dyn LinearSystemBackend,
    parallel: bool,
) -> Vec<IslandResult> {
    use rayon::prelude::*;

    if parallel {
        islands
            .par_iter()
            .map(|island| solve_island(island, backend))
            .collect()
    } else {
        islands
            .iter()
            .map(|island| solve_island(island, backend))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn solve_all(
    islands: &[SolverGridConfig],
    backend: &dyn LinearSystemBackend,
    _parallel: bool,
) -> Vec<IslandResult> {
    islands
        .iter()
        .map(|island| solve_island(island, backend))
        .collect()
}
