//! `ibci check`: compile an entry file and report diagnostics.

use super::scheduler_for;
use crate::report;
use std::path::PathBuf;
use std::process;

pub fn execute(entry: PathBuf, root: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let mut scheduler = scheduler_for(&entry, root)?;

    match scheduler.compile(&entry) {
        Ok(summary) => {
            let stats = scheduler.cache_stats();
            println!(
                "Compiled {} module(s), skipped {} ({} cached, {:.0}% hit rate)",
                summary.compiled,
                summary.skipped,
                stats.entries,
                stats.hit_ratio() * 100.0
            );
            Ok(())
        }
        Err(err) => {
            if json {
                report::emit_json(&err)?;
            } else {
                report::emit_human(&err)?;
            }
            process::exit(1);
        }
    }
}
