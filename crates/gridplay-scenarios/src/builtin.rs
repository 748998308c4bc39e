//! Levels that ship with the game.

use gridplay_core::{
    GeneratorNode, GridConfig, GridLines, GridNodes, HvdcLine, LineEnds, LoadNode, RegularLine,
    SubstationNode,
};

use crate::spec::{GridAction, Scenario};

const PRESETS: &[&str] = &["sample", "sample-redispatched", "hvdc-tutorial", "hvdc-corridor"];

pub fn preset_names() -> &'static [&'static str] {
    PRESETS
}

pub fn preset(name: &str) -> Option<Scenario> {
    let scenario = match name {
        "sample" => Scenario {
            name: Some(name.to_string()),
            description: Some("Four generators, four loads and four substations on 12 lines".into()),
            grid: sample_grid(),
            actions: Vec::new(),
        },
        "sample-redispatched" => Scenario {
            name: Some(name.to_string()),
            description: Some("The sample grid with gen1 and load1 redispatched by 10 MW".into()),
            grid: sample_grid(),
            actions: sample_actions(),
        },
        "hvdc-tutorial" => Scenario {
            name: Some(name.to_string()),
            description: Some("Two three-bus substations bridged by a 10 MW DC link".into()),
            grid: hvdc_tutorial_grid(),
            actions: Vec::new(),
        },
        "hvdc-corridor" => Scenario {
            name: Some(name.to_string()),
            description: Some(
                "Fifteen substations; the DC link shares its key with the cenl-n AC tie".into(),
            ),
            grid: hvdc_corridor_grid(),
            actions: Vec::new(),
        },
        _ => return None,
    };
    Some(scenario)
}

fn line(key: &str, from: (&str, u32), to: (&str, u32), reactance: f64, limit: f64) -> RegularLine {
    RegularLine::new(key, LineEnds::new(from.0, from.1, to.0, to.1), reactance, limit)
}

fn at(mut node: GeneratorNode, x: f64, y: f64) -> GeneratorNode {
    node.x = x;
    node.y = y;
    node
}

fn load_at(mut node: LoadNode, x: f64, y: f64) -> LoadNode {
    node.x = x;
    node.y = y;
    node
}

fn substation_at(key: &str, buses: u32, x: f64, y: f64) -> SubstationNode {
    let mut node = SubstationNode::new(key, buses);
    node.x = x;
    node.y = y;
    node
}

/// Balanced at 200 MW. `gen4`/`load4` form a separate two-node island.
pub fn sample_grid() -> GridConfig {
    GridConfig {
        nodes: GridNodes {
            generators: vec![
                at(GeneratorNode::new("gen1", 90.0).with_redispatch(50.0, 120.0), 100.0, 200.0),
                at(GeneratorNode::new("gen2", 90.0), 200.0, 100.0),
                at(GeneratorNode::new("gen3", 10.0).with_redispatch(10.0, 50.0), 500.0, 200.0),
                at(GeneratorNode::new("gen4", 10.0), 100.0, 400.0),
            ],
            loads: vec![
                load_at(LoadNode::new("load1", 170.0).with_redispatch(100.0, 250.0), 700.0, 600.0),
                load_at(LoadNode::new("load2", 10.0), 600.0, 700.0),
                load_at(LoadNode::new("load3", 10.0), 600.0, 300.0),
                load_at(LoadNode::new("load4", 10.0), 100.0, 500.0),
            ],
            substations: vec![
                substation_at("sub1", 1, 250.0, 250.0),
                substation_at("sub2", 1, 300.0, 500.0),
                substation_at("sub3", 1, 500.0, 300.0),
                substation_at("sub4", 1, 550.0, 550.0),
            ],
        },
        lines: GridLines {
            regular: vec![
                line("line1", ("gen1", 0), ("sub1", 1), 0.1, 100.0),
                line("line2", ("gen2", 0), ("sub1", 1), 0.1, 100.0),
                line("line3", ("sub2", 1), ("sub1", 1), 0.1, 100.0),
                line("line4", ("sub3", 1), ("sub1", 1), 0.2, 100.0),
                line("line5", ("sub2", 1), ("sub3", 1), 0.1, 100.0),
                line("line6", ("sub2", 1), ("sub4", 1), 0.1, 100.0),
                line("line7", ("sub3", 1), ("sub4", 1), 0.1, 100.0),
                line("line8", ("sub4", 1), ("load1", 0), 0.1, 200.0),
                line("line9", ("sub4", 1), ("load2", 0), 0.1, 50.0),
                line("line10", ("sub3", 1), ("gen3", 0), 0.1, 50.0),
                line("line11", ("sub3", 1), ("load3", 0), 0.1, 20.0),
                line("line12", ("gen4", 0), ("load4", 0), 0.1, 15.0),
            ],
            ..GridLines::default()
        },
    }
}

pub fn sample_actions() -> Vec<GridAction> {
    vec![
        GridAction::redispatch("gen1", 80.0),
        GridAction::redispatch("load1", 160.0),
    ]
}

pub fn hvdc_tutorial_grid() -> GridConfig {
    GridConfig {
        nodes: GridNodes {
            generators: vec![at(GeneratorNode::new("gen1", 50.0), 100.0, 100.0)],
            loads: vec![load_at(LoadNode::new("load1", 50.0), 700.0, 700.0)],
            substations: vec![
                substation_at("sub1", 3, 700.0, 100.0),
                substation_at("sub2", 3, 100.0, 700.0),
            ],
        },
        lines: GridLines {
            regular: vec![
                line("line1", ("gen1", 0), ("sub1", 1), 0.1, 100.0),
                line("line2", ("gen1", 0), ("sub2", 2), 0.1, 100.0),
                line("line3", ("sub1", 1), ("load1", 0), 0.1, 100.0),
                line("line4", ("sub2", 2), ("load1", 0), 0.1, 100.0),
            ],
            pst: Vec::new(),
            hvdc: vec![HvdcLine::new("hvdc1", LineEnds::new("sub1", 1, "sub2", 2), 10.0)
                .with_flow_range(-100.0, 100.0)],
        },
    }
}

/// Three corridors (east-west, north-south, central ring) balanced at 180 MW.
///
/// The DC link and the AC tie between the central ring and the east-west corridor
/// are both keyed `cenl-n`; the link reports under `cenl-n_line_in`/`_line_out`.
pub fn hvdc_corridor_grid() -> GridConfig {
    let sub = |key: &str, x: f64, y: f64| substation_at(key, 3, x, y);
    let tie = |key: &str, from: &str, to: &str, limit: f64| line(key, (from, 1), (to, 1), 0.1, limit);
    let feeder = |key: &str, node: &str, to: &str, limit: f64| line(key, (node, 0), (to, 1), 0.1, limit);

    GridConfig {
        nodes: GridNodes {
            generators: vec![
                at(GeneratorNode::new("w-wind-1", 25.0), 200.0, 100.0),
                at(GeneratorNode::new("w-wind-2", 35.0), 180.0, 190.0),
                at(GeneratorNode::new("nsl-coal-1", 120.0), 420.0, 440.0),
            ],
            loads: vec![
                load_at(LoadNode::new("e-town-1", 60.0), 1400.0, 250.0),
                load_at(LoadNode::new("n-town-1", 60.0), 550.0, 80.0),
                load_at(LoadNode::new("s-town-1", 60.0), 650.0, 800.0),
            ],
            substations: vec![
                sub("ewl-sub-1", 300.0, 200.0),
                sub("ewl-sub-2", 500.0, 210.0),
                sub("ewl-sub-3", 700.0, 200.0),
                sub("ewl-sub-4", 900.0, 190.0),
                sub("ewl-sub-5", 1100.0, 200.0),
                sub("ewl-sub-6", 1300.0, 220.0),
                sub("nsl-sub-1", 420.0, 100.0),
                sub("nsl-sub-2", 550.0, 400.0),
                sub("nsl-sub-3", 620.0, 600.0),
                sub("nsl-sub-3-bis", 670.0, 550.0),
                sub("nsl-sub-4", 750.0, 770.0),
                sub("cen-sub-1", 1050.0, 450.0),
                sub("cen-sub-2", 1200.0, 550.0),
                sub("cen-sub-3", 1150.0, 720.0),
                sub("cen-sub-4", 870.0, 620.0),
            ],
        },
        lines: GridLines {
            regular: vec![
                tie("ewl-1", "ewl-sub-1", "ewl-sub-2", 100.0),
                tie("ewl-2", "ewl-sub-2", "ewl-sub-3", 100.0),
                tie("ewl-3", "ewl-sub-3", "ewl-sub-4", 100.0),
                tie("ewl-4", "ewl-sub-4", "ewl-sub-5", 100.0),
                tie("ewl-5", "ewl-sub-5", "ewl-sub-6", 100.0),
                tie("nsl-1", "nsl-sub-1", "ewl-sub-2", 100.0),
                tie("nsl-2", "ewl-sub-2", "nsl-sub-2", 100.0),
                tie("nsl-3", "nsl-sub-2", "nsl-sub-3", 100.0),
                tie("nsl-4", "nsl-sub-3", "nsl-sub-4", 100.0),
                tie("nsl-3-b-1", "nsl-sub-2", "nsl-sub-3-bis", 50.0),
                tie("nsl-3-b-2", "nsl-sub-3-bis", "cen-sub-4", 50.0),
                tie("cenl-1", "cen-sub-1", "cen-sub-2", 60.0),
                tie("cenl-2", "cen-sub-2", "cen-sub-3", 60.0),
                tie("cenl-3", "cen-sub-3", "cen-sub-4", 60.0),
                tie("cenl-4", "cen-sub-4", "cen-sub-1", 60.0),
                tie("cenl-n", "cen-sub-1", "ewl-sub-5", 60.0),
                feeder("w-wind-1-l", "w-wind-1", "ewl-sub-1", 50.0),
                feeder("w-wind-2-l", "w-wind-2", "ewl-sub-1", 50.0),
                feeder("nsl-coal-1-l", "nsl-coal-1", "nsl-sub-2", 150.0),
                feeder("e-town-1-l", "e-town-1", "ewl-sub-6", 80.0),
                feeder("n-town-1-l", "n-town-1", "nsl-sub-1", 80.0),
                feeder("s-town-1-l", "s-town-1", "nsl-sub-4", 80.0),
            ],
            pst: Vec::new(),
            hvdc: vec![
                HvdcLine::new("cenl-n", LineEnds::new("nsl-sub-3", 1, "cen-sub-4", 1), 10.0)
                    .with_flow_range(-100.0, 100.0),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_preset_resolves() {
        for name in preset_names() {
            let scenario = preset(name).unwrap();
            assert_eq!(scenario.name.as_deref(), Some(*name));
        }
        assert!(preset("missing").is_none());
    }

    #[test]
    fn sample_presets_share_the_grid() {
        let plain = preset("sample").unwrap();
        let redispatched = preset("sample-redispatched").unwrap();
        assert_eq!(plain.grid, redispatched.grid);
        assert_eq!(redispatched.actions.len(), 2);
        assert_eq!(plain.grid.lines.regular.len(), 12);
    }

    #[test]
    fn corridor_link_reuses_an_ac_key() {
        let grid = hvdc_corridor_grid();
        assert_eq!(grid.nodes.substations.len(), 15);
        assert!(grid.lines.regular.iter().any(|l| l.key == "cenl-n"));
        assert_eq!(grid.lines.hvdc[0].key, "cenl-n");
    }
}
