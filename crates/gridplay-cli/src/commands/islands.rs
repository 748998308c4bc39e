use anyhow::{Context, Result};
use gridplay_cli::cli::ScenarioSource;
use gridplay_core::{graph_stats, island_summaries, prepare, split_islands};

use crate::common::{load_source, scenario_label};

pub fn handle(source: &ScenarioSource) -> Result<()> {
    let scenario = load_source(source)?;
    let grid = scenario.resolve();
    let graph = prepare(&grid).context("preparing network")?;
    let stats = graph_stats(&graph);
    let islands = split_islands(&graph);

    println!("Graph statistics for {}:", scenario_label(source, &scenario));
    println!("  Nodes         : {}", stats.node_count);
    println!("  Lines         : {}", stats.line_count);
    println!("  Components    : {}", stats.connected_components);
    println!(
        "  Degree [min/avg/max]: {}/{:.2}/{}",
        stats.min_degree, stats.avg_degree, stats.max_degree
    );

    for summary in island_summaries(&islands) {
        println!(
            "Island {}: {} node(s), {} line(s), net {:.2} MW",
            summary.island_id, summary.node_count, summary.line_count, summary.net_injection_mw
        );
        println!("  {}", summary.node_keys.join(", "));
    }
    Ok(())
}
