//! `lec status`: move an item to another status column.

use crate::cmd::{store_failure, write_item_row};
use crate::output::{OutputMode, render_mode};
use crate::project::Project;
use clap::Args;
use lectern_core::{Level, Status};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,

    /// New status: backlog, draft, ready, or published.
    pub status: Status,
}

pub fn run_status(args: &StatusArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    let item = store
        .set_status(args.level, &args.id, args.status)
        .map_err(|err| store_failure(output, &err))?;

    render_mode(
        output,
        &item,
        |item, w| write_item_row(w, item),
        |item, w| writeln!(w, "✓ {} {} is now {}", item.level(), item.name(), item.status()),
    )
}
