//! `lec delete`: remove an item together with everything below it.

use crate::cmd::store_failure;
use crate::output::{CliError, OutputMode, fail, render_mode};
use crate::project::Project;
use clap::Args;
use lectern_core::{DeleteReport, Level};
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteOutput {
    level: Level,
    id: String,
    removed: DeleteReport,
    total: usize,
}

fn confirm_delete(level: Level, name: &str, descendants: usize) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("Delete {level} '{name}' and {descendants} item(s) below it? [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub fn run_delete(args: &DeleteArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    if !args.force {
        let Some(item) = store.get(args.level, &args.id) else {
            return Err(store_failure(
                output,
                &lectern_core::StoreError::NotFound {
                    level: args.level,
                    id: args.id.clone(),
                },
            ));
        };
        let descendants = store.graph().subtree(args.level, &args.id).len() - 1;
        if !confirm_delete(args.level, item.name(), descendants)? {
            return Err(fail(
                output,
                &CliError::new(format!("deletion of '{}' cancelled", args.id)),
            ));
        }
    }

    let removed = store
        .delete(args.level, &args.id)
        .map_err(|err| store_failure(output, &err))?;
    tracing::info!(level = %args.level, id = %args.id, total = removed.total(), "deleted");

    let result = DeleteOutput {
        level: args.level,
        id: args.id.clone(),
        removed,
        total: removed.total(),
    };
    render_mode(
        output,
        &result,
        |r, w| {
            for level in Level::ALL {
                writeln!(w, "{}\t{}", level.collection(), r.removed.count(level))?;
            }
            Ok(())
        },
        |r, w| {
            writeln!(w, "✓ Deleted {} {} ({} item(s) total)", r.level, r.id, r.total)?;
            for level in Level::ALL {
                let count = r.removed.count(level);
                if count > 0 {
                    writeln!(w, "  {:<10} {count}", level.collection())?;
                }
            }
            Ok(())
        },
    )
}
