//! High-level entry points that chain preparation, island splitting and solving.

pub mod power_flow;

pub use power_flow::{IslandReport, IslandStatus, PowerFlowAnalysis, PowerFlowOutcome};
