//! `lec update`: merge-patch an existing item.

use crate::cmd::create::FieldArgs;
use crate::cmd::{store_failure, write_item_row};
use crate::output::{CliError, OutputMode, fail, render_mode};
use crate::project::Project;
use crate::validate;
use clap::Args;
use lectern_core::Level;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,

    /// New display name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Remove every URL from the item.
    #[arg(long, conflicts_with = "urls")]
    pub clear_urls: bool,

    #[command(flatten)]
    pub fields: FieldArgs,
}

pub fn run_update(args: &UpdateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    if let Some(name) = &args.name
        && let Err(e) = validate::validate_name(name)
    {
        return Err(fail(output, &e.to_cli_error()));
    }

    let mut patch = args.fields.to_patch(args.name.as_deref());
    if args.clear_urls {
        patch.urls = Some(Vec::new());
    }
    if patch.is_empty() {
        return Err(fail(
            output,
            &CliError::with_details(
                "nothing to update",
                "pass at least one field, e.g. --name or --status",
                "empty_update",
            ),
        ));
    }

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    let item = store
        .update(args.level, &args.id, patch)
        .map_err(|err| store_failure(output, &err))?;

    render_mode(
        output,
        &item,
        |item, w| write_item_row(w, item),
        |item, w| writeln!(w, "✓ Updated {} {}: {}", item.level(), item.id(), item.name()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: UpdateArgs,
    }

    #[test]
    fn clear_urls_conflicts_with_url() {
        assert!(
            Wrapper::try_parse_from(["test", "topic", "t-1", "--clear-urls", "--url", "x"])
                .is_err()
        );
        let w = Wrapper::parse_from(["test", "topic", "t-1", "--clear-urls"]);
        assert!(w.args.clear_urls);
    }

    #[test]
    fn parent_change_lands_in_patch() {
        let w = Wrapper::parse_from(["test", "training", "t-1", "--parent", "s-2"]);
        let patch = w.args.fields.to_patch(w.args.name.as_deref());
        assert_eq!(patch.parent_id.as_deref(), Some("s-2"));
        assert!(patch.name.is_none());
    }
}
