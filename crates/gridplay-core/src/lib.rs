//! # gridplay-core: Grid Model and Network Preparation
//!
//! Provides the data structures shared by the gridplay DC power-flow pipeline, plus the
//! graph-level stages that run before any numerics:
//!
//! - **Editable model**: [`GridConfig`] with generator, load and substation nodes and
//!   regular, phase-shifting (PST) and HVDC lines, exactly as a level author writes them.
//! - **Solver model**: [`SolverGridConfig`], a flattened graph whose node ids are dense
//!   `0..n` array positions and whose lines reference those ids directly.
//! - [`prepare`] turns the former into the latter (substation bus splitting, HVDC expansion).
//! - [`graph_utils::split_islands`] decomposes a prepared graph into independently
//!   solvable connected components.
//! - [`solver`] hosts the dense linear system backends used by the flow solver.
//!
//! ## Node identity
//!
//! Every solver node carries a `full_key`:
//! - generators and loads use their bare key (they are always addressed with bus `0`),
//! - a substation bus uses `<key>_bus<N>`,
//! - HVDC ghost terminals use `<hvdc key>_node_in` / `<hvdc key>_node_out`.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridplay_core::*;
//!
//! let config = GridConfig {
//!     nodes: GridNodes {
//!         generators: vec![GeneratorNode::new("gen1", 50.0)],
//!         loads: vec![LoadNode::new("load1", 50.0)],
//!         substations: vec![SubstationNode::new("sub1", 2)],
//!     },
//!     lines: GridLines {
//!         regular: vec![
//!             RegularLine::new("l1", LineEnds::new("gen1", 0, "sub1", 1), 0.1, 100.0),
//!             RegularLine::new("l2", LineEnds::new("sub1", 1, "load1", 0), 0.1, 100.0),
//!         ],
//!         ..GridLines::default()
//!     },
//! };
//!
//! let prepared = prepare(&config).unwrap();
//! // bus 2 of sub1 is never referenced, so only three nodes are materialized
//! assert_eq!(prepared.nodes.len(), 3);
//! assert_eq!(split_islands(&prepared).len(), 1);
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub mod graph_utils;
pub mod prepare;
pub mod solver;
pub mod units;

pub use error::ConfigurationError;
pub use graph_utils::{graph_stats, island_summaries, split_islands, GraphStats, IslandSummary};
pub use prepare::{full_key, ghost_line_keys, prepare, GHOST_LINE_LIMIT_MW, GHOST_LINE_REACTANCE};
pub use solver::*;
pub use units::{Degrees, Megawatts, PerUnit, Radians};

// =============================================================================
// Editable nodes
// =============================================================================

/// Redispatch permissions shared by generators and loads.
///
/// Bounds are only consulted by the scenario layer when validating a submitted
/// action; the preparer ignores them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedispatchBounds {
    #[serde(default)]
    pub allow_redispatch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redispatch_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redispatch_max: Option<f64>,
}

impl RedispatchBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            allow_redispatch: true,
            redispatch_min: Some(min),
            redispatch_max: Some(max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Scheduled output in MW (non-negative).
    pub generation: f64,
    #[serde(flatten)]
    pub redispatch: RedispatchBounds,
}

impl GeneratorNode {
    pub fn new(key: impl Into<String>, generation: f64) -> Self {
        Self {
            key: key.into(),
            name: None,
            x: 0.0,
            y: 0.0,
            generation,
            redispatch: RedispatchBounds::default(),
        }
    }

    pub fn with_redispatch(mut self, min: f64, max: f64) -> Self {
        self.redispatch = RedispatchBounds::new(min, max);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Consumption in MW (non-negative).
    pub load: f64,
    #[serde(flatten)]
    pub redispatch: RedispatchBounds,
}

impl LoadNode {
    pub fn new(key: impl Into<String>, load: f64) -> Self {
        Self {
            key: key.into(),
            name: None,
            x: 0.0,
            y: 0.0,
            load,
            redispatch: RedispatchBounds::default(),
        }
    }

    pub fn with_redispatch(mut self, min: f64, max: f64) -> Self {
        self.redispatch = RedispatchBounds::new(min, max);
        self
    }
}

/// A substation whose busbar can be split into `bus_count` independent buses (numbered from 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstationNode {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(rename = "buses", alias = "busCount")]
    pub bus_count: u32,
}

impl SubstationNode {
    pub fn new(key: impl Into<String>, bus_count: u32) -> Self {
        Self {
            key: key.into(),
            name: None,
            x: 0.0,
            y: 0.0,
            bus_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridNodes {
    #[serde(default)]
    pub generators: Vec<GeneratorNode>,
    #[serde(default)]
    pub loads: Vec<LoadNode>,
    #[serde(default)]
    pub substations: Vec<SubstationNode>,
}

// =============================================================================
// Editable lines
// =============================================================================

/// Both endpoints of a line. Generators and loads are addressed with bus `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEnds {
    pub node_from_key: String,
    pub bus_from: u32,
    pub node_to_key: String,
    pub bus_to: u32,
}

impl LineEnds {
    pub fn new(
        node_from_key: impl Into<String>,
        bus_from: u32,
        node_to_key: impl Into<String>,
        bus_to: u32,
    ) -> Self {
        Self {
            node_from_key: node_from_key.into(),
            bus_from,
            node_to_key: node_to_key.into(),
            bus_to,
        }
    }

    pub fn from_full_key(&self) -> String {
        full_key(&self.node_from_key, self.bus_from)
    }

    pub fn to_full_key(&self) -> String {
        full_key(&self.node_to_key, self.bus_to)
    }

    /// True when either endpoint sits on `substation`.
    pub fn touches(&self, substation: &str) -> bool {
        self.node_from_key == substation || self.node_to_key == substation
    }

    /// Moves every endpoint attached to `substation` onto `bus`.
    ///
    /// Returns false when neither endpoint names the substation.
    pub fn move_to_bus(&mut self, substation: &str, bus: u32) -> bool {
        let mut moved = false;
        if self.node_from_key == substation {
            self.bus_from = bus;
            moved = true;
        }
        if self.node_to_key == substation {
            self.bus_to = bus;
            moved = true;
        }
        moved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularLine {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub ends: LineEnds,
    /// Series reactance in per-unit (must be positive).
    pub reactance: f64,
    /// Thermal limit in MW.
    pub limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_deg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_max: Option<f64>,
}

impl RegularLine {
    pub fn new(key: impl Into<String>, ends: LineEnds, reactance: f64, limit: f64) -> Self {
        Self {
            key: key.into(),
            name: None,
            ends,
            reactance,
            limit,
            phase_deg: None,
            shift_min: None,
            shift_max: None,
        }
    }
}

/// Phase-shifting transformer: a regular line whose angle offset is mandatory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PstLine {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub ends: LineEnds,
    pub reactance: f64,
    pub limit: f64,
    pub phase_deg: f64,
    pub shift_min: f64,
    pub shift_max: f64,
}

impl PstLine {
    pub fn new(
        key: impl Into<String>,
        ends: LineEnds,
        reactance: f64,
        limit: f64,
        phase_deg: f64,
    ) -> Self {
        Self {
            key: key.into(),
            name: None,
            ends,
            reactance,
            limit,
            phase_deg,
            shift_min: phase_deg,
            shift_max: phase_deg,
        }
    }

    pub fn with_shift_range(mut self, min: f64, max: f64) -> Self {
        self.shift_min = min;
        self.shift_max = max;
        self
    }
}

/// A controllable DC link. `set_flow` is in MW, positive from `node_from` to `node_to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HvdcLine {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub ends: LineEnds,
    pub set_flow: f64,
    pub flow_min: f64,
    pub flow_max: f64,
}

impl HvdcLine {
    pub fn new(key: impl Into<String>, ends: LineEnds, set_flow: f64) -> Self {
        Self {
            key: key.into(),
            name: None,
            ends,
            set_flow,
            flow_min: -set_flow.abs(),
            flow_max: set_flow.abs(),
        }
    }

    pub fn with_flow_range(mut self, min: f64, max: f64) -> Self {
        self.flow_min = min;
        self.flow_max = max;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLines {
    #[serde(default)]
    pub regular: Vec<RegularLine>,
    #[serde(default)]
    pub pst: Vec<PstLine>,
    #[serde(default)]
    pub hvdc: Vec<HvdcLine>,
}

/// Editable network description, as authored by a level or produced by applying actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default)]
    pub nodes: GridNodes,
    #[serde(default)]
    pub lines: GridLines,
}

// =============================================================================
// Flattened solver graph
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Generator,
    Load,
    Substation,
}

impl NodeKind {
    /// Classifies a synthetic injection by its sign; withdrawals act as loads.
    pub fn for_injection(power_mw: f64) -> Self {
        if power_mw < 0.0 {
            NodeKind::Load
        } else {
            NodeKind::Generator
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverNode {
    /// Dense 0-based id, equal to the node's position in [`SolverGridConfig::nodes`].
    pub id: usize,
    pub full_key: String,
    /// Key of the editable element this node was derived from.
    pub key: String,
    pub kind: NodeKind,
    /// Net injection in MW: positive for generation, negative for load, zero for substations.
    pub power: f64,
}

/// Where a solver line came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum LineOrigin {
    Regular,
    Pst,
    HvdcGhost { hvdc_key: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverLine {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ends: LineEnds,
    pub reactance: f64,
    pub limit: f64,
    pub phase_deg: f64,
    pub shift_min: f64,
    pub shift_max: f64,
    pub node_from_id: usize,
    pub node_to_id: usize,
    pub origin: LineOrigin,
}

/// Solver-ready graph with dense node ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverGridConfig {
    pub nodes: Vec<SolverNode>,
    pub lines: Vec<SolverLine>,
}

impl SolverGridConfig {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Net MW injection, accumulated in node order.
    pub fn net_injection_mw(&self) -> f64 {
        self.nodes
            .iter()
            .map(|node| Megawatts(node.power))
            .sum::<Megawatts>()
            .value()
    }

    pub fn node_by_full_key(&self, full_key: &str) -> Option<&SolverNode> {
        self.nodes.iter().find(|node| node.full_key == full_key)
    }

    pub fn line_by_key(&self, key: &str) -> Option<&SolverLine> {
        self.lines.iter().find(|line| line.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_ends_move_every_matching_endpoint() {
        let mut ends = LineEnds::new("sub1", 1, "sub1", 2);
        assert!(ends.move_to_bus("sub1", 3));
        assert_eq!((ends.bus_from, ends.bus_to), (3, 3));

        let mut other = LineEnds::new("gen1", 0, "sub2", 1);
        assert!(!other.move_to_bus("sub1", 2));
        assert_eq!(other, LineEnds::new("gen1", 0, "sub2", 1));
    }

    #[test]
    fn injection_sign_selects_kind() {
        assert_eq!(NodeKind::for_injection(10.0), NodeKind::Generator);
        assert_eq!(NodeKind::for_injection(-10.0), NodeKind::Load);
        assert_eq!(NodeKind::for_injection(-0.0), NodeKind::Generator);
    }

    #[test]
    fn editable_config_uses_camel_case_wire_names() {
        let json = r#"{
            "nodes": {
                "generators": [{ "key": "gen1", "x": 1, "y": 2, "generation": 90,
                                 "allowRedispatch": true, "redispatchMin": 50, "redispatchMax": 120 }],
                "loads": [{ "key": "load1", "x": 0, "y": 0, "load": 90 }],
                "substations": [{ "key": "sub1", "buses": 3, "x": 0, "y": 0 }]
            },
            "lines": {
                "regular": [{ "key": "line1", "nodeFromKey": "gen1", "busFrom": 0,
                              "nodeToKey": "sub1", "busTo": 1, "reactance": 0.1, "limit": 100 }],
                "pst": []
            }
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();

        let gen = &config.nodes.generators[0];
        assert!(gen.redispatch.allow_redispatch);
        assert_eq!(gen.redispatch.redispatch_max, Some(120.0));
        assert_eq!(config.nodes.substations[0].bus_count, 3);
        assert_eq!(config.lines.regular[0].ends.node_to_key, "sub1");
        assert_eq!(config.lines.regular[0].phase_deg, None);
        assert!(config.lines.hvdc.is_empty());
    }

    #[test]
    fn yaml_accepts_bus_count_alias_and_pst_fields() {
        let yaml = r#"
nodes:
  substations:
    - { key: sub1, busCount: 2 }
lines:
  pst:
    - key: pst1
      nodeFromKey: sub1
      busFrom: 1
      nodeToKey: sub1
      busTo: 2
      reactance: 0.05
      limit: 80
      phaseDeg: -3
      shiftMin: -10
      shiftMax: 10
"#;
        let config: GridConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.nodes.substations[0].bus_count, 2);
        let pst = &config.lines.pst[0];
        assert_eq!(pst.phase_deg, -3.0);
        assert_eq!((pst.shift_min, pst.shift_max), (-10.0, 10.0));
        assert_eq!(pst.ends.bus_to, 2);
    }
}
