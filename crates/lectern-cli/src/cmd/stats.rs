//! `lec stats`: dashboard totals, status breakdown, and recent activity.

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};
use crate::project::Project;
use clap::Args;
use lectern_core::Status;
use lectern_core::view::{Dashboard, dashboard};
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Number of recently updated items to show (default from project config).
    #[arg(long)]
    pub recent: Option<usize>,
}

fn write_text(d: &Dashboard, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "subjects\t{}", d.totals.subjects)?;
    writeln!(w, "trainings\t{}", d.totals.trainings)?;
    writeln!(w, "topics\t{}", d.totals.topics)?;
    writeln!(w, "units\t{}", d.totals.units)?;
    for status in Status::ALL {
        writeln!(w, "{status}\t{}", d.status.get(status))?;
    }
    for item in &d.recent {
        writeln!(
            w,
            "recent\t{}\t{}\t{}\t{}",
            item.updated_at.to_rfc3339(),
            item.level,
            item.id,
            item.name
        )?;
    }
    Ok(())
}

fn write_pretty(d: &Dashboard, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Totals")?;
    pretty_kv(w, "subjects", d.totals.subjects.to_string())?;
    pretty_kv(w, "trainings", d.totals.trainings.to_string())?;
    pretty_kv(w, "topics", d.totals.topics.to_string())?;
    pretty_kv(w, "units", d.totals.units.to_string())?;

    writeln!(w)?;
    pretty_section(w, "By status")?;
    for status in Status::ALL {
        pretty_kv(w, &status.to_string(), d.status.get(status).to_string())?;
    }

    writeln!(w)?;
    pretty_section(w, "Recently updated")?;
    if d.recent.is_empty() {
        return writeln!(w, "Nothing yet.");
    }
    for item in &d.recent {
        writeln!(
            w,
            "{}  {:<8}  {:<9}  {}",
            item.updated_at.format("%Y-%m-%d %H:%M"),
            item.level,
            item.status,
            item.name
        )?;
    }
    Ok(())
}

pub fn run_stats(args: &StatsArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();

    let recent = args.recent.unwrap_or(project.config.dashboard.recent_limit);
    let summary = dashboard(store.graph(), recent);
    render_mode(output, &summary, write_text, write_pretty)
}
