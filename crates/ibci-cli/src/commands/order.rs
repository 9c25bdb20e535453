//! `ibci order`: print the topological compilation order.

use super::scheduler_for;
use crate::report;
use std::path::PathBuf;
use std::process;

pub fn execute(entry: PathBuf, root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut scheduler = scheduler_for(&entry, root)?;

    match scheduler.compilation_order(&entry) {
        Ok(order) => {
            for path in order {
                println!("{}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            report::emit_human(&err)?;
            process::exit(1);
        }
    }
}
