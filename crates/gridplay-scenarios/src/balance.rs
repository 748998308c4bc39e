use gridplay_core::{GridConfig, Megawatts};
use serde::Serialize;

/// Headline supply/demand figures of a grid, in MW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridBalance {
    pub generation_mw: f64,
    pub load_mw: f64,
    /// Generation minus load. Positive means oversupply.
    pub net_mw: f64,
}

impl GridBalance {
    pub fn is_balanced(&self) -> bool {
        self.net_mw == 0.0
    }
}

/// Total generation minus total load over the whole grid, ignoring HVDC links
/// (their two terminals cancel out).
pub fn grid_balance(grid: &GridConfig) -> GridBalance {
    let generation_mw = grid
        .nodes
        .generators
        .iter()
        .map(|g| Megawatts(g.generation))
        .sum::<Megawatts>()
        .value();
    let load_mw = grid
        .nodes
        .loads
        .iter()
        .map(|l| Megawatts(l.load))
        .sum::<Megawatts>()
        .value();
    GridBalance {
        generation_mw,
        load_mw,
        net_mw: generation_mw - load_mw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::sample_grid;
    use crate::GridAction;

    #[test]
    fn sample_grid_is_balanced() {
        let balance = grid_balance(&sample_grid());
        assert_eq!(balance.generation_mw, 200.0);
        assert_eq!(balance.load_mw, 200.0);
        assert!(balance.is_balanced());
    }

    #[test]
    fn redispatch_shows_up_in_the_balance() {
        let grid = crate::apply_actions(&sample_grid(), &[GridAction::redispatch("gen1", 80.0)]);
        let balance = grid_balance(&grid);
        assert_eq!(balance.net_mw, -10.0);
        assert!(!balance.is_balanced());
    }
}
