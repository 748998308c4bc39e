//! # gridplay-algo: DC power flow for gridplay networks
//!
//! The solver works island by island on graphs produced by
//! [`gridplay_core::prepare`] and [`gridplay_core::split_islands`]:
//!
//! | Step | Function | Output |
//! |------|----------|--------|
//! | Balance check | [`solve_island`] | [`IslandCondition::Imbalance`] unless injections sum to zero |
//! | Assemble `B θ = P + s` | [`solve_island`] | susceptance matrix plus phase-shift correction |
//! | Reduce and solve | [`solve_island`] | angles, reference node fixed at zero |
//! | Line flows | [`solve_island`] | one [`LineFlowResult`] per line |
//!
//! [`PowerFlowAnalysis`] chains preparation, island splitting and per-island solving
//! and merges everything into a [`PowerFlowOutcome`].
//!
//! ## Example
//!
//! ```
//! use gridplay_algo::PowerFlowAnalysis;
//! use gridplay_core::{GeneratorNode, GridConfig, LineEnds, LoadNode, RegularLine};
//!
//! let mut grid = GridConfig::default();
//! grid.nodes.generators.push(GeneratorNode::new("gen1", 50.0));
//! grid.nodes.loads.push(LoadNode::new("load1", 50.0));
//! grid.lines.regular.push(RegularLine::new(
//!     "line1",
//!     LineEnds::new("gen1", 0, "load1", 0),
//!     0.1,
//!     100.0,
//! ));
//!
//! let outcome = PowerFlowAnalysis::new(&grid).solve().unwrap();
//! let flow = &outcome.flows["line1"];
//! assert!((flow.flow_mw - 50.0).abs() < 1e-9);
//! assert!(!flow.overloaded);
//! ```

pub mod power_flow;
pub mod workflows;

pub use power_flow::{
    solve_island, IslandCondition, IslandSolution, LineFlowResult, REFERENCE_INDEX, S_BASE_MVA,
};
pub use workflows::{IslandReport, IslandStatus, PowerFlowAnalysis, PowerFlowOutcome};
