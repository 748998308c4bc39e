use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use gridplay_algo::{LineFlowResult, PowerFlowAnalysis, PowerFlowOutcome};
use gridplay_cli::cli::{OutputFormat, ScenarioSource};
use gridplay_core::SolverKind;
use gridplay_scenarios::load_actions_from_path;
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::info;

use crate::common::{load_source, scenario_label, write_json};

#[derive(Serialize)]
struct SolveReport<'a> {
    scenario: String,
    solver: &'static str,
    #[serde(flatten)]
    outcome: &'a PowerFlowOutcome,
}

pub fn handle(
    source: &ScenarioSource,
    solver: SolverKind,
    format: OutputFormat,
    action_file: Option<&Path>,
    parallel: bool,
) -> Result<()> {
    let scenario = load_source(source)?;
    let extra = match action_file {
        Some(path) => load_actions_from_path(path)?,
        None => Vec::new(),
    };
    let grid = scenario.resolve_with(&extra);
    info!(
        actions = scenario.actions.len() + extra.len(),
        "resolved scenario"
    );

    let outcome = PowerFlowAnalysis::new(&grid)
        .with_solver(solver)
        .with_parallel(parallel)
        .solve()
        .context("preparing network")?;

    let label = scenario_label(source, &scenario);
    match format {
        OutputFormat::Json => write_json(&SolveReport {
            scenario: label,
            solver: solver.as_str(),
            outcome: &outcome,
        }),
        OutputFormat::Table => print_table(&label, &outcome),
    }
}

fn print_table(label: &str, outcome: &PowerFlowOutcome) -> Result<()> {
    let mut rows: BTreeMap<&str, Option<&LineFlowResult>> = outcome
        .flows
        .iter()
        .map(|(key, flow)| (key.as_str(), Some(flow)))
        .collect();
    for key in outcome.unsolved_lines() {
        rows.entry(key).or_insert(None);
    }

    println!("DC power flow for {label}:");
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "LINE\tFROM\tTO\tFLOW MW\tLIMIT MW\tLOADING\tSTATUS")?;
    for (key, row) in &rows {
        match row {
            Some(flow) => {
                let ends = &flow.line.ends;
                let loading = flow
                    .loading_pct()
                    .map(|pct| format!("{pct:.1}%"))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{:.2}\t{:.0}\t{}\t{}",
                    key,
                    ends.from_full_key(),
                    ends.to_full_key(),
                    flow.flow_mw,
                    flow.line.limit,
                    loading,
                    if flow.overloaded { "OVERLOAD" } else { "ok" }
                )?;
            }
            None => writeln!(writer, "{key}\t-\t-\t-\t-\t-\tunsolved")?,
        }
    }
    writer.flush()?;

    let overloaded = outcome.overloaded_lines().count();
    println!(
        "{} of {} island(s) solved, {} line(s) overloaded",
        outcome.solved_island_count(),
        outcome.islands.len(),
        overloaded
    );
    for island in outcome.islands.iter().filter(|i| !i.status.is_solved()) {
        println!(
            "  island {} unsolved ({:?}), net injection {:.2} MW",
            island.island_id, island.status, island.net_injection_mw
        );
    }
    Ok(())
}
