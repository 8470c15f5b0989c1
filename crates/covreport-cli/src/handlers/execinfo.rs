//! Execinfo command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::ExecinfoArgs;
use chrono::{Local, TimeZone};
use console::style;
use covreport::ExecFileLoader;
use std::fmt::Write as _;

/// Execute the execinfo command
pub fn execute_execinfo(config: &CliConfig, args: &ExecinfoArgs) -> CliResult<()> {
    let use_color = config.color.should_color();
    for path in &args.files {
        let mut loader = ExecFileLoader::new();
        loader.load(path)?;
        if use_color {
            println!("{}", style(format!("[INFO] {}", path.display())).cyan().bold());
        } else {
            println!("[INFO] {}", path.display());
        }
        print!("{}", render_execinfo(&loader));
    }
    Ok(())
}

/// Sessions and per-class probe hits of one loaded file
#[must_use]
pub fn render_execinfo(loader: &ExecFileLoader) -> String {
    let mut out = String::new();
    for info in loader.session_info_store().infos() {
        let _ = writeln!(
            out,
            "Session \"{}\": {} - {}",
            info.id,
            format_time(info.start),
            format_time(info.dump)
        );
    }
    let _ = writeln!(out, "{:<16}  {:>6}  {:>6}  NAME", "CLASS ID", "HITS", "PROBES");
    for data in loader.execution_data_store().contents() {
        let _ = writeln!(
            out,
            "{:016x}  {:>6}  {:>6}  {}",
            data.id().as_u64(),
            data.hit_count(),
            data.probes().len(),
            data.name()
        );
    }
    out
}

fn format_time(epoch_millis: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_millis)
        .single()
        .map_or_else(
            || epoch_millis.to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}
