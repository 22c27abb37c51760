//! `lec list`: items of one level, optionally filtered.

use crate::cmd::{short_id, write_item_row};
use crate::output::{OutputMode, pretty_rule, render_mode};
use crate::project::Project;
use clap::Args;
use lectern_core::view::{ListQuery, ancestry, list};
use lectern_core::{Item, Level, Status};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Hierarchy level to list.
    pub level: Level,

    /// Only children of this parent id.
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Case-insensitive match against name and description.
    #[arg(long)]
    pub search: Option<String>,

    /// Only items with this status.
    #[arg(short, long)]
    pub status: Option<Status>,
}

impl ListArgs {
    fn query(&self) -> ListQuery {
        let mut query = ListQuery::new(self.level);
        if let Some(parent) = &self.parent {
            query = query.under(parent.as_str());
        }
        if let Some(search) = &self.search {
            query = query.matching(search.as_str());
        }
        if let Some(status) = self.status {
            query = query.with_status(status);
        }
        query
    }
}

pub fn run_list(args: &ListArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();
    let graph = store.graph();

    let items = list(graph, &args.query());
    tracing::debug!(level = %args.level, count = items.len(), "list");

    render_mode(
        output,
        &items,
        |items, w| {
            for item in items {
                write_item_row(w, item)?;
            }
            Ok(())
        },
        |items: &Vec<Item>, w| {
            if items.is_empty() {
                return writeln!(w, "No {} found.", args.level.collection());
            }
            writeln!(w, "{:<8}  {:<9}  {:<32}  PARENT", "ID", "STATUS", "NAME")?;
            pretty_rule(w)?;
            for item in items {
                let parent = ancestry(graph, item.level(), item.id()).unwrap_or_default();
                writeln!(
                    w,
                    "{:<8}  {:<9}  {:<32}  {parent}",
                    short_id(item.id()),
                    item.status(),
                    item.name()
                )?;
            }
            Ok(())
        },
    )
}
