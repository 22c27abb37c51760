//! `lec export`: render items as JSON, Markdown, or plain text.
//!
//! The rendered document goes to stdout unchanged (no output-mode framing),
//! or to `--output PATH`, in which case a success message is printed instead.

use crate::cmd::store_failure;
use crate::output::{OutputMode, render_success};
use crate::project::Project;
use anyhow::Context as _;
use clap::Args;
use lectern_core::view::{ExportFormat, ExportOptions, ListQuery, export, list};
use lectern_core::{Item, Level, StoreError};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Hierarchy level to export.
    pub level: Level,

    /// Export only this item.
    #[arg(long, conflicts_with = "parent")]
    pub id: Option<String>,

    /// Export only children of this parent.
    #[arg(short, long)]
    pub parent: Option<String>,

    /// json, markdown, or text (default from project config).
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// Write to a file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

fn select(store: &lectern_core::Store, args: &ExportArgs) -> Result<Vec<Item>, StoreError> {
    if let Some(id) = &args.id {
        return store
            .get(args.level, id)
            .map(|item| vec![item])
            .ok_or_else(|| StoreError::NotFound {
                level: args.level,
                id: id.clone(),
            });
    }
    let mut query = ListQuery::new(args.level);
    if let Some(parent) = &args.parent {
        query = query.under(parent.as_str());
    }
    Ok(list(store.graph(), &query))
}

pub fn run_export(args: &ExportArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();

    let items = select(&store, args).map_err(|err| store_failure(output, &err))?;
    let format = args.format.unwrap_or(project.config.export.default_format);
    let options = ExportOptions {
        speech_heading: project.config.export.speech_heading.clone(),
    };
    let document = export(&items, format, &options).context("failed to render export")?;
    tracing::debug!(level = %args.level, %format, count = items.len(), "export");

    match &args.output {
        Some(path) => {
            std::fs::write(path, &document)
                .with_context(|| format!("failed to write export to {}", path.display()))?;
            render_success(
                output,
                &format!(
                    "Exported {} {} as {format} to {}",
                    items.len(),
                    args.level.collection(),
                    path.display()
                ),
            )
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(document.as_bytes())?;
            if !document.ends_with('\n') {
                writeln!(out)?;
            }
            Ok(())
        }
    }
}
