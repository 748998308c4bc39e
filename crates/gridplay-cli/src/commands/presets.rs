use std::io::{self, Write};

use anyhow::Result;
use gridplay_scenarios::{preset, preset_names};
use tabwriter::TabWriter;

pub fn handle() -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "NAME\tLINES\tACTIONS\tDESCRIPTION")?;
    for name in preset_names() {
        let Some(scenario) = preset(name) else {
            continue;
        };
        let lines = &scenario.grid.lines;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            name,
            lines.regular.len() + lines.pst.len() + lines.hvdc.len(),
            scenario.actions.len(),
            scenario.description.as_deref().unwrap_or("")
        )?;
    }
    writer.flush()?;
    Ok(())
}
