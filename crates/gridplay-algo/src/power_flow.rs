//! Linearized (DC) power flow on a single island.
//!
//! With lossless lines, flat voltage magnitudes and small angle differences, the
//! active power on a line reduces to
//!
//! ```text
//! P_ij = (θ_i − θ_j − φ_ij) / X_ij
//! ```
//!
//! where `φ_ij` is the phase shift of the line in radians. Collecting these for
//! every node gives `B θ = P + s` with the susceptance matrix `B`, per-unit
//! injections `P`, and the phase-shift correction `s`. `B` is singular by
//! construction (angles are relative), so the reference node's row and column are
//! dropped and its angle is fixed at zero.

use std::collections::BTreeMap;

use gridplay_core::{
    Degrees, LinearSystemBackend, LinearSystemError, Megawatts, PerUnit, SolverGridConfig,
    SolverLine,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

/// System power base (MVA) used for per-unit conversion.
pub const S_BASE_MVA: f64 = 100.0;

/// Island-local index of the angle reference node.
pub const REFERENCE_INDEX: usize = 0;

/// Reasons an island produces no flows. None of these abort a whole solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IslandCondition {
    #[error("island is unbalanced: net injection {net_mw} MW")]
    Imbalance { net_mw: f64 },

    #[error("reduced susceptance matrix is singular: {source}")]
    Singular {
        #[source]
        source: LinearSystemError,
    },

    #[error("island has no nodes")]
    Empty,

    #[error("line '{line}' references node {node_id}, but the island has {nodes} nodes")]
    NodeOutOfRange {
        line: String,
        node_id: usize,
        nodes: usize,
    },
}

/// Solved flow on one line.
///
/// Carries every field of the solver line it was computed for. Node ids inside
/// [`SolverLine`] are local to the island the line was solved in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineFlowResult {
    #[serde(flatten)]
    pub line: SolverLine,
    /// `θ_from − θ_to` in radians.
    pub d_theta: f64,
    /// Phase shift in radians.
    pub phi: f64,
    pub flow_pu: f64,
    pub flow_mw: f64,
    pub overloaded: bool,
}

impl LineFlowResult {
    /// `|flow| / limit` as a percentage; `None` when the line has no positive limit.
    pub fn loading_pct(&self) -> Option<f64> {
        (self.line.limit > 0.0).then(|| self.flow_mw.abs() / self.line.limit * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IslandSolution {
    /// Voltage angle per island node in radians, indexed by local id.
    pub angles: Vec<f64>,
    pub flows: BTreeMap<String, LineFlowResult>,
}

/// Solves the DC power flow of one connected island.
///
/// The island must balance exactly: its MW injections, summed in node order,
/// have to equal `0.0`. The check happens before per-unit conversion so a network
/// that balances in MW is never rejected because of rounding in per-unit values.
///
/// Node [`REFERENCE_INDEX`] is the angle reference. A singleton island with zero
/// injection solves trivially with no flows. Line endpoints must be island-local
/// ids, as produced by [`gridplay_core::split_islands`].
pub fn solve_island(
    island: &SolverGridConfig,
    backend: &dyn LinearSystemBackend,
) -> Result<IslandSolution, IslandCondition> {
    let node_count = island.nodes.len();
    if node_count == 0 {
        return Err(IslandCondition::Empty);
    }
    if let Some((line, node_id)) = island.lines.iter().find_map(|line| {
        [line.node_from_id, line.node_to_id]
            .into_iter()
            .find(|&id| id >= node_count)
            .map(|id| (line, id))
    }) {
        return Err(IslandCondition::NodeOutOfRange {
            line: line.key.clone(),
            node_id,
            nodes: node_count,
        });
    }

    let net_mw = island.net_injection_mw();
    if net_mw != 0.0 {
        return Err(IslandCondition::Imbalance { net_mw });
    }

    let injections: Vec<f64> = island
        .nodes
        .iter()
        .map(|node| Megawatts(node.power).to_per_unit(S_BASE_MVA).value())
        .collect();

    let (susceptance, shift) = build_island_susceptance(island);
    let rhs: Vec<f64> = injections.iter().zip(&shift).map(|(p, s)| p + s).collect();
    let (reduced, reduced_rhs) = reduce(&susceptance, &rhs, REFERENCE_INDEX);

    let reduced_angles = backend
        .solve(&reduced, &reduced_rhs)
        .map_err(|source| IslandCondition::Singular { source })?;
    let angles = expand_angles(&reduced_angles, REFERENCE_INDEX);

    let flows: BTreeMap<String, LineFlowResult> = island
        .lines
        .iter()
        .map(|line| (line.key.clone(), line_flow(line, &angles)))
        .collect();

    debug!(
        nodes = node_count,
        lines = flows.len(),
        overloaded = flows.values().filter(|f| f.overloaded).count(),
        "solved island"
    );
    Ok(IslandSolution { angles, flows })
}

/// Builds the nodal susceptance matrix and the phase-shift correction vector.
///
/// A line with reactance `X` adds `b = 1/X` to both diagonal entries and subtracts
/// it from both off-diagonal entries. A phase shift `φ` moves `b·φ` into the
/// right-hand side: `+` at the sending node, `−` at the receiving node.
fn build_island_susceptance(island: &SolverGridConfig) -> (Vec<Vec<f64>>, Vec<f64>) {
    let n = island.nodes.len();
    let mut susceptance = vec![vec![0.0; n]; n];
    let mut shift = vec![0.0; n];

    for line in &island.lines {
        let (i, j) = (line.node_from_id, line.node_to_id);
        let b = 1.0 / line.reactance;
        susceptance[i][i] += b;
        susceptance[j][j] += b;
        susceptance[i][j] -= b;
        susceptance[j][i] -= b;

        let phi = Degrees(line.phase_deg).to_radians().value();
        if phi != 0.0 {
            trace!(line = %line.key, phi, "phase-shift correction");
            shift[i] += b * phi;
            shift[j] -= b * phi;
        }
    }
    (susceptance, shift)
}

/// Drops the reference row and column so the remaining system is non-singular.
fn reduce(matrix: &[Vec<f64>], rhs: &[f64], reference: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
    let size = rhs.len().saturating_sub(1);
    let mut reduced = Vec::with_capacity(size);
    let mut reduced_rhs = Vec::with_capacity(size);
    for (i, row) in matrix.iter().enumerate() {
        if i == reference {
            continue;
        }
        let mut reduced_row = Vec::with_capacity(size);
        for (j, value) in row.iter().enumerate() {
            if j != reference {
                reduced_row.push(*value);
            }
        }
        reduced.push(reduced_row);
        reduced_rhs.push(rhs[i]);
    }
    (reduced, reduced_rhs)
}

fn expand_angles(reduced: &[f64], reference: usize) -> Vec<f64> {
    let mut angles = Vec::with_capacity(reduced.len() + 1);
    angles.extend_from_slice(&reduced[..reference]);
    angles.push(0.0);
    angles.extend_from_slice(&reduced[reference..]);
    angles
}

fn line_flow(line: &SolverLine, angles: &[f64]) -> LineFlowResult {
    let d_theta = angles[line.node_from_id] - angles[line.node_to_id];
    let phi = Degrees(line.phase_deg).to_radians().value();
    let flow_pu = PerUnit((d_theta - phi) / line.reactance);
    let flow_mw = flow_pu.to_megawatts(S_BASE_MVA).value();
    LineFlowResult {
        line: line.clone(),
        d_theta,
        phi,
        flow_pu: flow_pu.value(),
        flow_mw,
        overloaded: flow_mw.abs() > line.limit,
    }
}
