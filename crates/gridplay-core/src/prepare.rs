//! Network preparation: editable [`GridConfig`] → flattened [`SolverGridConfig`].
//!
//! Preparation runs in a fixed order so node ids are reproducible:
//!
//! 1. Scan every line endpoint to learn which `(substation, bus)` pairs are in use.
//! 2. One node per generator (`+generation`) and per load (`-load`).
//! 3. Two ghost terminals per HVDC link: `<key>_node_in` withdraws the set flow on the
//!    sending side and `<key>_node_out` injects it on the receiving side.
//! 4. One node per substation bus that appeared in step 1.
//! 5. Lines in the order regular, PST, HVDC ghost; both endpoints resolved to exactly one node.
//!
//! Modelling a DC link as two fixed injections decouples the AC sides it connects: no
//! angle difference ever drives power across it. A negative set flow simply flips the
//! signs of the two injections, so nothing downstream special-cases direction.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::ConfigurationError;
use crate::{
    GridConfig, HvdcLine, LineEnds, LineOrigin, NodeKind, SolverGridConfig, SolverLine,
    SolverNode,
};

/// Reactance (pu) of the ideal lines wiring HVDC ghost terminals to their AC endpoints.
pub const GHOST_LINE_REACTANCE: f64 = 1e-4;

/// Thermal limit (MW) of HVDC ghost lines; large enough never to flag an overload.
pub const GHOST_LINE_LIMIT_MW: f64 = 1e9;

/// Identity of a node as referenced by line endpoints.
///
/// Bus `0` addresses a generator or load by its bare key; any other bus addresses
/// `<key>_bus<N>` on a substation.
pub fn full_key(node_key: &str, bus: u32) -> String {
    if bus == 0 {
        node_key.to_string()
    } else {
        format!("{node_key}_bus{bus}")
    }
}

fn ghost_node_keys(hvdc_key: &str) -> (String, String) {
    (format!("{hvdc_key}_node_in"), format!("{hvdc_key}_node_out"))
}

/// Keys of the inbound and outbound ghost lines an HVDC link expands into.
pub fn ghost_line_keys(hvdc_key: &str) -> (String, String) {
    (format!("{hvdc_key}_line_in"), format!("{hvdc_key}_line_out"))
}

/// Flattens an editable network into a solver-ready graph.
///
/// Pure function of `config`; every structural problem is returned as a
/// [`ConfigurationError`] and no partial graph escapes.
pub fn prepare(config: &GridConfig) -> Result<SolverGridConfig, ConfigurationError> {
    let connected = connected_buses(config);
    let mut builder = GraphBuilder::with_capacity(
        config.nodes.generators.len() + config.nodes.loads.len() + connected.len(),
    );

    for gen in &config.nodes.generators {
        builder.add_node(gen.key.clone(), gen.key.clone(), NodeKind::Generator, gen.generation);
    }
    for load in &config.nodes.loads {
        builder.add_node(load.key.clone(), load.key.clone(), NodeKind::Load, -load.load);
    }
    for hvdc in &config.lines.hvdc {
        let (node_in, node_out) = ghost_node_keys(&hvdc.key);
        let withdrawn = -hvdc.set_flow;
        let injected = hvdc.set_flow;
        builder.add_node(node_in, hvdc.key.clone(), NodeKind::for_injection(withdrawn), withdrawn);
        builder.add_node(node_out, hvdc.key.clone(), NodeKind::for_injection(injected), injected);
    }
    for sub in &config.nodes.substations {
        if sub.bus_count == 0 {
            return Err(ConfigurationError::InvalidBusCount {
                substation: sub.key.clone(),
                buses: sub.bus_count,
            });
        }
        for bus in 1..=sub.bus_count {
            let key = full_key(&sub.key, bus);
            if connected.contains(&key) {
                builder.add_node(key, sub.key.clone(), NodeKind::Substation, 0.0);
            }
        }
    }

    for line in &config.lines.regular {
        check_reactance(&line.key, line.reactance)?;
        let (from, to) = builder.resolve_ends(&line.key, &line.ends)?;
        builder.lines.push(SolverLine {
            key: line.key.clone(),
            name: line.name.clone(),
            ends: line.ends.clone(),
            reactance: line.reactance,
            limit: line.limit,
            phase_deg: line.phase_deg.unwrap_or(0.0),
            shift_min: line.shift_min.unwrap_or(0.0),
            shift_max: line.shift_max.unwrap_or(0.0),
            node_from_id: from,
            node_to_id: to,
            origin: LineOrigin::Regular,
        });
    }
    for line in &config.lines.pst {
        check_reactance(&line.key, line.reactance)?;
        let (from, to) = builder.resolve_ends(&line.key, &line.ends)?;
        builder.lines.push(SolverLine {
            key: line.key.clone(),
            name: line.name.clone(),
            ends: line.ends.clone(),
            reactance: line.reactance,
            limit: line.limit,
            phase_deg: line.phase_deg,
            shift_min: line.shift_min,
            shift_max: line.shift_max,
            node_from_id: from,
            node_to_id: to,
            origin: LineOrigin::Pst,
        });
    }
    for hvdc in &config.lines.hvdc {
        builder.add_ghost_lines(hvdc)?;
    }

    let graph = builder.finish()?;
    debug!(
        nodes = graph.nodes.len(),
        lines = graph.lines.len(),
        hvdc_links = config.lines.hvdc.len(),
        "prepared solver graph"
    );
    Ok(graph)
}

/// Full keys of every substation bus referenced by at least one line endpoint.
///
/// HVDC endpoints count too: a bus used only by a DC link still needs a node for
/// its ghost line to attach to.
fn connected_buses(config: &GridConfig) -> HashSet<String> {
    let lines = &config.lines;
    lines
        .regular
        .iter()
        .map(|line| &line.ends)
        .chain(lines.pst.iter().map(|line| &line.ends))
        .chain(lines.hvdc.iter().map(|line| &line.ends))
        .flat_map(|ends| [ends.from_full_key(), ends.to_full_key()])
        .collect()
}

fn check_reactance(line: &str, reactance: f64) -> Result<(), ConfigurationError> {
    if reactance.is_finite() && reactance > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidReactance {
            line: line.to_string(),
            reactance,
        })
    }
}

struct GraphBuilder {
    nodes: Vec<SolverNode>,
    lines: Vec<SolverLine>,
    by_full_key: HashMap<String, Vec<usize>>,
}

impl GraphBuilder {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            lines: Vec::new(),
            by_full_key: HashMap::with_capacity(capacity),
        }
    }

    fn add_node(&mut self, full_key: String, key: String, kind: NodeKind, power: f64) -> usize {
        let id = self.nodes.len();
        self.by_full_key.entry(full_key.clone()).or_default().push(id);
        self.nodes.push(SolverNode {
            id,
            full_key,
            key,
            kind,
            power,
        });
        id
    }

    fn resolve(&self, line: &str, node: &str, bus: u32) -> Result<usize, ConfigurationError> {
        let key = full_key(node, bus);
        match self.by_full_key.get(&key).map(Vec::as_slice) {
            Some([id]) => Ok(*id),
            None | Some([]) => Err(ConfigurationError::EndpointNotFound {
                line: line.to_string(),
                node: node.to_string(),
                bus,
            }),
            Some(ids) => Err(ConfigurationError::EndpointAmbiguous {
                line: line.to_string(),
                node: node.to_string(),
                bus,
                matches: ids.len(),
            }),
        }
    }

    fn resolve_ends(
        &self,
        line: &str,
        ends: &LineEnds,
    ) -> Result<(usize, usize), ConfigurationError> {
        let from = self.resolve(line, &ends.node_from_key, ends.bus_from)?;
        let to = self.resolve(line, &ends.node_to_key, ends.bus_to)?;
        Ok((from, to))
    }

    /// Wires `<key>_line_in` from the sending endpoint into the inbound ghost and
    /// `<key>_line_out` from the outbound ghost to the receiving endpoint, so both
    /// ghost lines carry the set flow in their from → to direction.
    fn add_ghost_lines(&mut self, hvdc: &HvdcLine) -> Result<(), ConfigurationError> {
        let (node_in, node_out) = ghost_node_keys(&hvdc.key);
        let (line_in, line_out) = ghost_line_keys(&hvdc.key);

        let sending = self.resolve(&line_in, &hvdc.ends.node_from_key, hvdc.ends.bus_from)?;
        let ghost_in = self.resolve(&line_in, &node_in, 0)?;
        let ghost_out = self.resolve(&line_out, &node_out, 0)?;
        let receiving = self.resolve(&line_out, &hvdc.ends.node_to_key, hvdc.ends.bus_to)?;

        let origin = LineOrigin::HvdcGhost {
            hvdc_key: hvdc.key.clone(),
        };
        self.lines.push(ghost_line(
            line_in,
            LineEnds::new(&hvdc.ends.node_from_key, hvdc.ends.bus_from, node_in, 0),
            sending,
            ghost_in,
            origin.clone(),
        ));
        self.lines.push(ghost_line(
            line_out,
            LineEnds::new(node_out, 0, &hvdc.ends.node_to_key, hvdc.ends.bus_to),
            ghost_out,
            receiving,
            origin,
        ));
        Ok(())
    }

    fn finish(self) -> Result<SolverGridConfig, ConfigurationError> {
        if let Some(node) = self
            .nodes
            .iter()
            .find(|node| self.by_full_key.get(&node.full_key).map_or(0, Vec::len) > 1)
        {
            return Err(ConfigurationError::DuplicateNodeKey {
                full_key: node.full_key.clone(),
            });
        }
        let mut line_keys = HashSet::with_capacity(self.lines.len());
        if let Some(line) = self.lines.iter().find(|line| !line_keys.insert(line.key.as_str())) {
            return Err(ConfigurationError::DuplicateLineKey {
                key: line.key.clone(),
            });
        }
        Ok(SolverGridConfig {
            nodes: self.nodes,
            lines: self.lines,
        })
    }
}

fn ghost_line(
    key: String,
    ends: LineEnds,
    from: usize,
    to: usize,
    origin: LineOrigin,
) -> SolverLine {
    SolverLine {
        key,
        name: None,
        ends,
        reactance: GHOST_LINE_REACTANCE,
        limit: GHOST_LINE_LIMIT_MW,
        phase_deg: 0.0,
        shift_min: 0.0,
        shift_max: 0.0,
        node_from_id: from,
        node_to_id: to,
        origin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        GeneratorNode, GridLines, GridNodes, LoadNode, PstLine, RegularLine, SubstationNode,
    };

    fn line(key: &str, from: (&str, u32), to: (&str, u32)) -> RegularLine {
        RegularLine::new(key, LineEnds::new(from.0, from.1, to.0, to.1), 0.1, 100.0)
    }

    fn radial_config() -> GridConfig {
        GridConfig {
            nodes: GridNodes {
                generators: vec![GeneratorNode::new("gen1", 50.0)],
                loads: vec![LoadNode::new("load1", 50.0)],
                substations: vec![SubstationNode::new("sub1", 3)],
            },
            lines: GridLines {
                regular: vec![
                    line("l1", ("gen1", 0), ("sub1", 1)),
                    line("l2", ("sub1", 1), ("load1", 0)),
                ],
                ..GridLines::default()
            },
        }
    }

    fn assert_dense_ids(graph: &SolverGridConfig) {
        for (position, node) in graph.nodes.iter().enumerate() {
            assert_eq!(node.id, position);
        }
    }

    #[test]
    fn full_key_uses_bare_key_for_bus_zero() {
        assert_eq!(full_key("gen1", 0), "gen1");
        assert_eq!(full_key("sub1", 2), "sub1_bus2");
    }

    #[test]
    fn only_referenced_substation_buses_are_materialized() {
        let graph = prepare(&radial_config()).unwrap();

        assert_dense_ids(&graph);
        let keys: Vec<&str> = graph.nodes.iter().map(|n| n.full_key.as_str()).collect();
        assert_eq!(keys, vec!["gen1", "load1", "sub1_bus1"]);
        assert_eq!(graph.nodes[0].power, 50.0);
        assert_eq!(graph.nodes[1].power, -50.0);
        assert_eq!(graph.nodes[2].kind, NodeKind::Substation);
        assert_eq!(graph.nodes[2].power, 0.0);
    }

    #[test]
    fn lines_reference_resolved_ids_and_default_phase() {
        let mut config = radial_config();
        config.lines.pst.push(PstLine::new(
            "pst1",
            LineEnds::new("gen1", 0, "load1", 0),
            0.2,
            80.0,
            5.0,
        ));
        let graph = prepare(&config).unwrap();

        let l2 = graph.line_by_key("l2").unwrap();
        assert_eq!((l2.node_from_id, l2.node_to_id), (2, 1));
        assert_eq!(l2.phase_deg, 0.0);
        assert_eq!(l2.origin, LineOrigin::Regular);

        let pst = graph.line_by_key("pst1").unwrap();
        assert_eq!(pst.phase_deg, 5.0);
        assert_eq!(pst.origin, LineOrigin::Pst);
        assert_eq!(graph.lines.last().unwrap().key, "pst1");
    }

    #[test]
    fn hvdc_link_expands_into_balanced_ghost_pair() {
        for set_flow in [30.0, -12.5, 0.0] {
            let mut config = radial_config();
            config.nodes.substations.push(SubstationNode::new("sub2", 1));
            config.lines.hvdc.push(HvdcLine::new(
                "dc1",
                LineEnds::new("sub1", 1, "sub2", 1),
                set_flow,
            ));
            let graph = prepare(&config).unwrap();
            assert_dense_ids(&graph);

            let node_in = graph.node_by_full_key("dc1_node_in").unwrap();
            let node_out = graph.node_by_full_key("dc1_node_out").unwrap();
            assert_eq!(node_in.power + node_out.power, 0.0);
            assert_eq!(node_out.power, set_flow);
            assert_eq!(node_in.key, "dc1");

            // sub2 bus1 is only reached by the DC link
            let sub2 = graph.node_by_full_key("sub2_bus1").unwrap();
            let line_in = graph.line_by_key("dc1_line_in").unwrap();
            let line_out = graph.line_by_key("dc1_line_out").unwrap();
            assert_eq!(line_in.node_to_id, node_in.id);
            assert_eq!(line_out.node_from_id, node_out.id);
            assert_eq!(line_out.node_to_id, sub2.id);
            assert_eq!(line_in.reactance, GHOST_LINE_REACTANCE);
            assert_eq!(line_out.limit, GHOST_LINE_LIMIT_MW);
        }
    }

    #[test]
    fn negative_set_flow_flips_ghost_roles() {
        let mut config = radial_config();
        config.lines.hvdc.push(HvdcLine::new(
            "dc1",
            LineEnds::new("gen1", 0, "load1", 0),
            -20.0,
        ));
        let graph = prepare(&config).unwrap();

        assert_eq!(graph.node_by_full_key("dc1_node_in").unwrap().kind, NodeKind::Generator);
        assert_eq!(graph.node_by_full_key("dc1_node_out").unwrap().kind, NodeKind::Load);
    }

    #[test]
    fn unknown_endpoint_is_fatal() {
        let mut config = radial_config();
        config.lines.regular.push(line("l3", ("sub1", 4), ("load1", 0)));

        let err = prepare(&config).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::EndpointNotFound {
                line: "l3".into(),
                node: "sub1".into(),
                bus: 4,
            }
        );
    }

    #[test]
    fn generator_addressed_with_a_bus_is_not_found() {
        let mut config = radial_config();
        config.lines.regular.push(line("l3", ("gen1", 1), ("load1", 0)));
        assert!(matches!(
            prepare(&config),
            Err(ConfigurationError::EndpointNotFound { .. })
        ));
    }

    #[test]
    fn shared_key_between_generator_and_load_is_ambiguous() {
        let mut config = radial_config();
        config.nodes.loads.push(LoadNode::new("gen1", 10.0));

        let err = prepare(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::EndpointAmbiguous { ref line, matches: 2, .. } if line == "l1"
        ));
    }

    #[test]
    fn unreferenced_duplicate_key_is_still_rejected() {
        let mut config = radial_config();
        config.nodes.generators.push(GeneratorNode::new("spare", 0.0));
        config.nodes.loads.push(LoadNode::new("spare", 0.0));

        assert_eq!(
            prepare(&config).unwrap_err(),
            ConfigurationError::DuplicateNodeKey {
                full_key: "spare".into()
            }
        );
    }

    #[test]
    fn repeated_line_key_is_rejected() {
        let mut config = radial_config();
        config.lines.regular.push(line("l1", ("sub1", 1), ("load1", 0)));
        assert_eq!(
            prepare(&config).unwrap_err(),
            ConfigurationError::DuplicateLineKey { key: "l1".into() }
        );
    }

    #[test]
    fn dc_link_may_share_a_key_with_an_ac_line() {
        let mut config = radial_config();
        config
            .lines
            .hvdc
            .push(HvdcLine::new("l1", LineEnds::new("gen1", 0, "load1", 0), 5.0));
        let graph = prepare(&config).unwrap();
        assert!(graph.line_by_key("l1_line_in").is_some());
        assert_eq!(graph.line_by_key("l1").unwrap().origin, LineOrigin::Regular);
    }

    #[test]
    fn zero_bus_substation_is_rejected() {
        let mut config = radial_config();
        config.nodes.substations.push(SubstationNode::new("empty", 0));
        assert!(matches!(
            prepare(&config),
            Err(ConfigurationError::InvalidBusCount { buses: 0, .. })
        ));
    }

    #[test]
    fn non_positive_reactance_is_rejected() {
        let mut config = radial_config();
        config.lines.regular[0].reactance = 0.0;
        assert!(matches!(
            prepare(&config),
            Err(ConfigurationError::InvalidReactance { .. })
        ));
    }
}
