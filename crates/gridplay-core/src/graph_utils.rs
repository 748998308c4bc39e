use std::collections::BTreeMap;

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, warn};

use crate::{SolverGridConfig, SolverLine, SolverNode};

/// Summary statistics for a prepared graph (degree spread and component count).
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub line_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
}

/// Per-island digest used for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
    pub line_count: usize,
    /// Net injection in MW, accumulated in node order.
    pub net_injection_mw: f64,
    pub node_keys: Vec<String>,
}

/// Splits a prepared graph into its maximal connected components.
///
/// Each island is a self-contained [`SolverGridConfig`]: node ids are remapped to a
/// fresh dense `0..k` sequence that preserves the original relative order, and every
/// line endpoint is rewritten through that remap. Islands come out ordered by their
/// smallest original node id. A node without lines becomes a singleton island.
///
/// Components are found with a union-find that always links to the smaller root, so
/// every root is the lowest id of its component.
pub fn split_islands(graph: &SolverGridConfig) -> Vec<SolverGridConfig> {
    let node_count = graph.nodes.len();
    let mut parent: Vec<usize> = (0..node_count).collect();

    for line in &graph.lines {
        let (from, to) = (line.node_from_id, line.node_to_id);
        if from >= node_count || to >= node_count {
            warn!(line = %line.key, from, to, "line endpoint outside graph; ignored");
            continue;
        }
        let root_from = find_root(&mut parent, from);
        let root_to = find_root(&mut parent, to);
        let root = root_from.min(root_to);
        parent[root_from] = root;
        parent[root_to] = root;
    }

    let roots: Vec<usize> = (0..node_count)
        .map(|node| find_root(&mut parent, node))
        .collect();

    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut local_id = vec![0usize; node_count];
    for (node, &root) in roots.iter().enumerate() {
        let island = members.entry(root).or_default();
        local_id[node] = island.len();
        island.push(node);
    }

    let mut lines_by_root: BTreeMap<usize, Vec<&SolverLine>> = BTreeMap::new();
    for line in &graph.lines {
        if line.node_from_id < node_count && line.node_to_id < node_count {
            lines_by_root
                .entry(roots[line.node_from_id])
                .or_default()
                .push(line);
        }
    }

    let islands: Vec<SolverGridConfig> = members
        .into_iter()
        .map(|(root, nodes)| SolverGridConfig {
            nodes: nodes
                .iter()
                .map(|&node| SolverNode {
                    id: local_id[node],
                    ..graph.nodes[node].clone()
                })
                .collect(),
            lines: lines_by_root
                .remove(&root)
                .unwrap_or_default()
                .into_iter()
                .map(|line| SolverLine {
                    node_from_id: local_id[line.node_from_id],
                    node_to_id: local_id[line.node_to_id],
                    ..line.clone()
                })
                .collect(),
        })
        .collect();

    debug!(islands = islands.len(), nodes = node_count, "split graph into islands");
    islands
}

/// Root lookup with path halving. Parents never point to a larger id.
fn find_root(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}

pub fn island_summaries(islands: &[SolverGridConfig]) -> Vec<IslandSummary> {
    islands
        .iter()
        .enumerate()
        .map(|(island_id, island)| IslandSummary {
            island_id,
            node_count: island.node_count(),
            line_count: island.line_count(),
            net_injection_mw: island.net_injection_mw(),
            node_keys: island.nodes.iter().map(|n| n.full_key.clone()).collect(),
        })
        .collect()
}

/// Degree and connectivity statistics computed on a petgraph view of the graph.
pub fn graph_stats(graph: &SolverGridConfig) -> GraphStats {
    let view = to_petgraph(graph);
    let degrees: Vec<usize> = view
        .node_indices()
        .map(|node| view.neighbors(node).count())
        .collect();
    let node_count = degrees.len();
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    GraphStats {
        node_count,
        line_count: view.edge_count(),
        connected_components: connected_components(&view),
        min_degree: degrees.iter().copied().min().unwrap_or(0),
        avg_degree,
        max_degree: degrees.iter().copied().max().unwrap_or(0),
    }
}

fn to_petgraph(graph: &SolverGridConfig) -> UnGraph<(), ()> {
    let node_count = graph.nodes.len();
    let mut view = UnGraph::with_capacity(node_count, graph.lines.len());
    for _ in 0..node_count {
        view.add_node(());
    }
    for line in &graph.lines {
        if line.node_from_id < node_count && line.node_to_id < node_count {
            view.add_edge(
                NodeIndex::new(line.node_from_id),
                NodeIndex::new(line.node_to_id),
                (),
            );
        }
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineEnds, LineOrigin, NodeKind};

    fn node(id: usize, key: &str, power: f64) -> SolverNode {
        SolverNode {
            id,
            full_key: key.to_string(),
            key: key.to_string(),
            kind: NodeKind::for_injection(power),
            power,
        }
    }

    fn line(key: &str, from: usize, to: usize) -> SolverLine {
        SolverLine {
            key: key.to_string(),
            name: None,
            ends: LineEnds::new("a", 0, "b", 0),
            reactance: 0.1,
            limit: 100.0,
            phase_deg: 0.0,
            shift_min: 0.0,
            shift_max: 0.0,
            node_from_id: from,
            node_to_id: to,
            origin: LineOrigin::Regular,
        }
    }

    /// 0-3 and 1-4 chains, node 2 isolated, 5-1 joins the second chain late.
    fn three_island_graph() -> SolverGridConfig {
        SolverGridConfig {
            nodes: vec![
                node(0, "g0", 10.0),
                node(1, "g1", 20.0),
                node(2, "lonely", 0.0),
                node(3, "l3", -10.0),
                node(4, "l4", -15.0),
                node(5, "l5", -5.0),
            ],
            lines: vec![line("a", 3, 0), line("b", 4, 1), line("c", 5, 4)],
        }
    }

    #[test]
    fn islands_are_ordered_and_densely_renumbered() {
        let islands = split_islands(&three_island_graph());
        assert_eq!(islands.len(), 3);

        let keys: Vec<Vec<&str>> = islands
            .iter()
            .map(|island| island.nodes.iter().map(|n| n.full_key.as_str()).collect())
            .collect();
        assert_eq!(
            keys,
            vec![vec!["g0", "l3"], vec!["g1", "l4", "l5"], vec!["lonely"]]
        );

        for island in &islands {
            for (position, node) in island.nodes.iter().enumerate() {
                assert_eq!(node.id, position);
            }
        }
    }

    #[test]
    fn lines_follow_their_endpoints_into_the_island() {
        let islands = split_islands(&three_island_graph());

        let second = &islands[1];
        let keys: Vec<&str> = second.lines.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "c"]);
        let c = second.line_by_key("c").unwrap();
        assert_eq!((c.node_from_id, c.node_to_id), (2, 1));
        assert!(islands[2].lines.is_empty());
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let graph = three_island_graph();
        let islands = split_islands(&graph);

        let mut node_keys: Vec<String> = islands
            .iter()
            .flat_map(|i| i.nodes.iter().map(|n| n.full_key.clone()))
            .collect();
        node_keys.sort();
        let mut expected: Vec<String> = graph.nodes.iter().map(|n| n.full_key.clone()).collect();
        expected.sort();
        assert_eq!(node_keys, expected);

        let line_total: usize = islands.iter().map(|i| i.lines.len()).sum();
        assert_eq!(line_total, graph.lines.len());
        for island in &islands {
            for line in &island.lines {
                assert!(line.node_from_id < island.nodes.len());
                assert!(line.node_to_id < island.nodes.len());
            }
        }
    }

    #[test]
    fn late_union_merges_under_smallest_root() {
        // 2-3, then 0-1, then 3-1: everything ends up rooted at 0
        let graph = SolverGridConfig {
            nodes: (0..4).map(|i| node(i, &format!("n{i}"), 0.0)).collect(),
            lines: vec![line("x", 2, 3), line("y", 1, 0), line("z", 3, 1)],
        };
        let islands = split_islands(&graph);
        assert_eq!(islands.len(), 1);
        assert_eq!(islands[0].nodes[0].full_key, "n0");
        assert_eq!(islands[0].lines.len(), 3);
    }

    #[test]
    fn empty_graph_yields_no_islands() {
        assert!(split_islands(&SolverGridConfig::default()).is_empty());
    }

    #[test]
    fn summaries_report_net_injection() {
        let summaries = island_summaries(&split_islands(&three_island_graph()));
        assert_eq!(summaries[0].net_injection_mw, 0.0);
        assert_eq!(summaries[1].net_injection_mw, 0.0);
        assert_eq!(summaries[1].line_count, 2);
        assert_eq!(summaries[2].node_keys, vec!["lonely".to_string()]);
    }

    #[test]
    fn stats_agree_with_island_count() {
        let graph = three_island_graph();
        let stats = graph_stats(&graph);
        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.line_count, 3);
        assert_eq!(stats.connected_components, split_islands(&graph).len());
        assert_eq!(stats.min_degree, 0);
        assert_eq!(stats.max_degree, 2);
    }
}
