//! CLI subcommands.

pub mod check;
pub mod order;

use anyhow::Context;
use ibci_engine::compiler::Scheduler;
use std::path::{Path, PathBuf};

/// Build a scheduler rooted at `root`, or at the entry file's directory
/// when no root was given.
fn scheduler_for(entry: &Path, root: Option<PathBuf>) -> anyhow::Result<Scheduler> {
    let root = root.unwrap_or_else(|| {
        let parent = entry.parent().unwrap_or(Path::new(""));
        if parent.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            parent.to_path_buf()
        }
    });
    Scheduler::with_root(&root)
        .with_context(|| format!("invalid project root '{}'", root.display()))
}
