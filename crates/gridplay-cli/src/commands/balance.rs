use anyhow::Result;
use gridplay_cli::cli::ScenarioSource;
use gridplay_scenarios::grid_balance;

use crate::common::{load_source, scenario_label};

pub fn handle(source: &ScenarioSource) -> Result<()> {
    let scenario = load_source(source)?;
    let balance = grid_balance(&scenario.resolve());

    println!("Balance for {}:", scenario_label(source, &scenario));
    println!("  Generation : {:.2} MW", balance.generation_mw);
    println!("  Load       : {:.2} MW", balance.load_mw);
    println!("  Net        : {:+.2} MW", balance.net_mw);
    if !balance.is_balanced() {
        println!("  Grid is unbalanced; its islands will not solve until net is zero");
    }
    Ok(())
}
