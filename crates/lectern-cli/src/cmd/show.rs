//! `lec show`: one item with its breadcrumb trail and direct children.

use crate::cmd::{short_id, store_failure, write_item_row};
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};
use crate::project::Project;
use chrono::{DateTime, Local, Utc};
use clap::Args;
use lectern_core::view::{Crumb, breadcrumbs, flatten_markdown};
use lectern_core::{Item, Level, StoreError};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    level: Level,
    item: Item,
    breadcrumbs: Vec<Crumb>,
    children: Vec<Item>,
}

fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn write_text(out: &ShowOutput, w: &mut dyn Write) -> io::Result<()> {
    write_item_row(w, &out.item)?;
    for child in &out.children {
        write!(w, "  ")?;
        write_item_row(w, child)?;
    }
    Ok(())
}

fn write_pretty(out: &ShowOutput, w: &mut dyn Write) -> io::Result<()> {
    let item = &out.item;
    let fields = item.fields();

    if out.breadcrumbs.len() > 1 {
        let trail: Vec<&str> = out.breadcrumbs.iter().map(|c| c.name.as_str()).collect();
        writeln!(w, "{}", trail.join(" > "))?;
    }
    pretty_section(w, &format!("{} {}", out.level, item.name()))?;
    pretty_kv(w, "id", item.id())?;
    pretty_kv(w, "status", item.status().to_string())?;
    if let Some(description) = &fields.description {
        pretty_kv(w, "description", description)?;
    }
    if let Some(image) = &fields.image {
        pretty_kv(w, "image", image)?;
    }
    for url in &fields.urls {
        pretty_kv(w, "url", url)?;
    }
    pretty_kv(w, "created", local_time(fields.created_at))?;
    pretty_kv(w, "updated", local_time(fields.updated_at))?;

    if let Some(notes) = &fields.notes {
        writeln!(w)?;
        pretty_section(w, "Notes")?;
        writeln!(w, "{notes}")?;
    }

    if let Some(unit) = item.as_unit() {
        if !unit.explanation_text.trim().is_empty() {
            writeln!(w)?;
            pretty_section(w, "Explanation")?;
            writeln!(w, "{}", flatten_markdown(&unit.explanation_text))?;
        }
        writeln!(w)?;
        pretty_section(w, &format!("Speech texts ({})", unit.speech_texts.len()))?;
        for (n, speech) in unit.speech_texts.iter().enumerate() {
            writeln!(w, "{:>3}. {}", n + 1, speech.text)?;
            if let Some(image) = &speech.image {
                writeln!(w, "     [image] {image}")?;
            }
        }
    }

    if !fields.comments.is_empty() {
        writeln!(w)?;
        pretty_section(w, &format!("Comments ({})", fields.comments.len()))?;
        for comment in &fields.comments {
            writeln!(
                w,
                "{} · {} · {}/5",
                comment.author,
                local_time(comment.created_at),
                comment.rating.get()
            )?;
            writeln!(w, "  {}", comment.text)?;
        }
    }

    if let Some(child_level) = out.level.child() {
        writeln!(w)?;
        pretty_section(
            w,
            &format!("{} ({})", child_level.collection(), out.children.len()),
        )?;
        for child in &out.children {
            writeln!(
                w,
                "{:<8}  {:<9}  {}",
                short_id(child.id()),
                child.status(),
                child.name()
            )?;
        }
    }
    pretty_rule(w)
}

pub fn run_show(args: &ShowArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();

    let Some(item) = store.get(args.level, &args.id) else {
        return Err(store_failure(
            output,
            &StoreError::NotFound {
                level: args.level,
                id: args.id.clone(),
            },
        ));
    };

    let children = args
        .level
        .child()
        .map(|child| store.children_of(child, &args.id))
        .unwrap_or_default();

    let result = ShowOutput {
        level: args.level,
        breadcrumbs: breadcrumbs(store.graph(), args.level, &args.id),
        item,
        children,
    };
    render_mode(output, &result, write_text, write_pretty)
}
