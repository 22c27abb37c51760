//! `lec comment`: add and read item comments.

use crate::cmd::{Actor, identity_failure, store_failure};
use crate::identity;
use crate::output::{OutputMode, fail, pretty_section, render, render_mode};
use crate::project::Project;
use crate::validate;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use lectern_core::model::{Comment, NewComment, Rating};
use lectern_core::{Level, StoreError};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct CommentArgs {
    #[command(subcommand)]
    pub command: CommentCommand,
}

#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    #[command(
        about = "Add a comment to an item",
        after_help = "EXAMPLES:\n    # Leave a note on a unit\n    lec comment add unit <id> \"Tighten the intro\"\n\n    # Rate it while commenting, as a specific user\n    lec --as demo@example.com comment add topic <id> \"Solid\" --rating 4"
    )]
    Add(CommentAddArgs),

    #[command(
        about = "List an item's comments, oldest first",
        after_help = "EXAMPLES:\n    lec comment list unit <id>\n\n    # Machine-readable\n    lec comment list unit <id> --json"
    )]
    List(CommentListArgs),
}

#[derive(Args, Debug)]
pub struct CommentAddArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,

    /// Comment text.
    pub text: String,

    /// Rating from 0 (unrated) to 5.
    #[arg(short, long, default_value_t = 0)]
    pub rating: u8,
}

#[derive(Args, Debug)]
pub struct CommentListArgs {
    /// Hierarchy level of the item.
    pub level: Level,

    /// Item id.
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CommentAddOutput {
    level: Level,
    item_id: String,
    comment: Comment,
}

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub fn run_comment(
    args: &CommentArgs,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    match &args.command {
        CommentCommand::Add(add) => run_comment_add(add, actor, output, project_root),
        CommentCommand::List(list) => run_comment_list(list, output, project_root),
    }
}

fn run_comment_add(
    args: &CommentAddArgs,
    actor: Actor<'_>,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_comment(&args.text) {
        return Err(fail(output, &e.to_cli_error()));
    }
    let rating = Rating::new(args.rating).map_err(|err| store_failure(output, &err))?;

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    let user = identity::require_user(&store, actor.flag, actor.config_user)
        .map_err(|err| identity_failure(output, &err))?;

    let comment = store
        .add_comment(
            args.level,
            &args.id,
            NewComment {
                text: args.text.clone(),
                author: user.name.clone(),
                rating,
            },
        )
        .map_err(|err| store_failure(output, &err))?;
    tracing::info!(level = %args.level, id = %args.id, author = %user.email, "comment added");

    let result = CommentAddOutput {
        level: args.level,
        item_id: args.id.clone(),
        comment,
    };
    render(output, &result, |r, w| {
        writeln!(
            w,
            "✓ {} commented on {} {}",
            r.comment.author, r.level, r.item_id
        )
    })
}

fn run_comment_list(
    args: &CommentListArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
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
    let comments = item.fields().comments.clone();

    render_mode(
        output,
        &comments,
        |comments, w| {
            for c in comments {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    rfc3339(c.created_at),
                    c.author,
                    c.rating.get(),
                    c.text
                )?;
            }
            Ok(())
        },
        |comments, w| {
            pretty_section(
                w,
                &format!("Comments on {} ({})", item.name(), comments.len()),
            )?;
            if comments.is_empty() {
                return writeln!(w, "No comments yet.");
            }
            for c in comments {
                let stars = "★".repeat(usize::from(c.rating.get()));
                writeln!(w, "{}  {}  {stars}", c.author, rfc3339(c.created_at))?;
                writeln!(w, "  {}", c.text)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: CommentCommand,
    }

    #[test]
    fn add_defaults_rating_to_zero() {
        let w = Wrapper::parse_from(["test", "add", "unit", "u-1", "Nice flow"]);
        let CommentCommand::Add(add) = w.command else {
            panic!("expected add");
        };
        assert_eq!(add.rating, 0);
        assert_eq!(add.text, "Nice flow");
    }

    #[test]
    fn add_accepts_rating_flag() {
        let w = Wrapper::parse_from(["test", "add", "topic", "t-1", "ok", "-r", "4"]);
        let CommentCommand::Add(add) = w.command else {
            panic!("expected add");
        };
        assert_eq!(add.level, Level::Topic);
        assert_eq!(add.rating, 4);
    }

    #[test]
    fn list_takes_level_and_id() {
        let w = Wrapper::parse_from(["test", "list", "subjects", "s-1"]);
        assert!(matches!(w.command, CommentCommand::List(ref l) if l.level == Level::Subject));
    }
}
