//! Error types for the gridplay core.
//!
//! Two families are kept apart:
//!
//! - [`ConfigurationError`] is fatal. A malformed network description aborts the whole
//!   computation and no partial result is produced.
//! - Per-island conditions (imbalance, singular system) are not errors at this level;
//!   the flow solver reports them per island and the workflow omits those lines.

use thiserror::Error;

/// Structural problems found while preparing a network.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("line '{line}': endpoint '{node}' bus {bus} does not match any node")]
    EndpointNotFound { line: String, node: String, bus: u32 },

    #[error("line '{line}': endpoint '{node}' bus {bus} matches {matches} nodes")]
    EndpointAmbiguous {
        line: String,
        node: String,
        bus: u32,
        matches: usize,
    },

    #[error("node key '{full_key}' is used by more than one node")]
    DuplicateNodeKey { full_key: String },

    #[error("line key '{key}' is used by more than one line")]
    DuplicateLineKey { key: String },

    #[error("substation '{substation}' declares {buses} buses; at least one is required")]
    InvalidBusCount { substation: String, buses: u32 },

    #[error("line '{line}' has reactance {reactance}; it must be finite and positive")]
    InvalidReactance { line: String, reactance: f64 },
}
