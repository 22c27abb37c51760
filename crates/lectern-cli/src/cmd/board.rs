//! `lec board`: kanban view with one column per status.

use crate::cmd::short_id;
use crate::output::{OutputMode, pretty_rule, render_mode};
use crate::project::Project;
use clap::Args;
use lectern_core::Level;
use lectern_core::view::{Board, board};
use std::io::{self, Write};
use std::path::Path;

#[derive(Args, Debug)]
pub struct BoardArgs {
    /// Only show items of this level.
    #[arg(short, long)]
    pub level: Option<Level>,
}

fn write_text(board: &Board, w: &mut dyn Write) -> io::Result<()> {
    for column in &board.columns {
        for card in &column.cards {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                column.status,
                card.level,
                card.id,
                card.name,
                card.parent.as_deref().unwrap_or("")
            )?;
        }
    }
    Ok(())
}

fn write_pretty(board: &Board, w: &mut dyn Write) -> io::Result<()> {
    for (i, column) in board.columns.iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(
            w,
            "{} ({})",
            column.status.to_string().to_uppercase(),
            column.cards.len()
        )?;
        pretty_rule(w)?;
        for card in &column.cards {
            writeln!(
                w,
                "  [{}] {:<8}  {}",
                card.level,
                short_id(&card.id),
                card.name
            )?;
            if let Some(parent) = &card.parent {
                writeln!(w, "      {parent}")?;
            }
        }
    }
    Ok(())
}

pub fn run_board(args: &BoardArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root, output)?;
    let store = project.open_store();

    let board = board(store.graph(), args.level);
    tracing::debug!(cards = board.card_count(), "board");
    render_mode(output, &board, write_text, write_pretty)
}
