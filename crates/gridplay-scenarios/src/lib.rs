//! Scenarios, player actions and built-in levels for gridplay.
//!
//! A [`Scenario`] pairs a base [`gridplay_core::GridConfig`] with an ordered action
//! list. Solver input is always rebuilt from those two pieces by [`apply_actions`];
//! the base grid is never edited in place.

pub mod action_log;
pub mod apply;
pub mod balance;
pub mod builtin;
pub mod spec;

pub use action_log::{validate_action, ActionError, ActionLog};
pub use apply::{apply_actions, effective_actions, ActionTarget};
pub use balance::{grid_balance, GridBalance};
pub use builtin::{preset, preset_names};
pub use spec::{load_actions_from_path, load_scenario_from_path, GridAction, Scenario};
