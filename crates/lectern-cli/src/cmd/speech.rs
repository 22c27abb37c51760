//! `lec speech`: edit a unit's ordered speech texts.
//!
//! Positions on the command line are 1-based, matching the numbering in
//! `lec show` and in Markdown/text exports.

use crate::cmd::store_failure;
use crate::output::{CliError, OutputMode, fail, render_mode};
use crate::project::Project;
use clap::{Args, Subcommand};
use lectern_core::model::{SpeechEdit, SpeechText, Unit};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct SpeechArgs {
    #[command(subcommand)]
    pub command: SpeechCommand,
}

#[derive(Subcommand, Debug)]
pub enum SpeechCommand {
    /// Append a paragraph.
    Add {
        /// Unit id.
        unit: String,
        /// Paragraph text.
        text: String,
        /// Optional image URL for the paragraph.
        #[arg(long)]
        image: Option<String>,
    },
    /// Replace the text at a position.
    Set {
        unit: String,
        position: usize,
        text: String,
    },
    /// Set or clear (empty string) the image at a position.
    Image {
        unit: String,
        position: usize,
        image: String,
    },
    /// Remove the paragraph at a position.
    Remove { unit: String, position: usize },
    /// Move a paragraph to another position.
    Move {
        unit: String,
        from: usize,
        to: usize,
    },
}

/// Convert a 1-based position to an index. Zero has no index.
fn index(position: usize) -> Option<usize> {
    position.checked_sub(1)
}

impl SpeechCommand {
    fn unit_id(&self) -> &str {
        match self {
            Self::Add { unit, .. }
            | Self::Set { unit, .. }
            | Self::Image { unit, .. }
            | Self::Remove { unit, .. }
            | Self::Move { unit, .. } => unit,
        }
    }

    fn to_edit(&self) -> Option<SpeechEdit> {
        Some(match self {
            Self::Add { text, image, .. } => SpeechEdit::Push(SpeechText {
                text: text.clone(),
                image: image.clone().filter(|i| !i.trim().is_empty()),
            }),
            Self::Set { position, text, .. } => SpeechEdit::Set {
                index: index(*position)?,
                text: text.clone(),
            },
            Self::Image {
                position, image, ..
            } => SpeechEdit::SetImage {
                index: index(*position)?,
                image: Some(image.clone()),
            },
            Self::Remove { position, .. } => SpeechEdit::Remove {
                index: index(*position)?,
            },
            Self::Move { from, to, .. } => SpeechEdit::Move {
                from: index(*from)?,
                to: index(*to)?,
            },
        })
    }
}

pub fn run_speech(args: &SpeechArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    let Some(edit) = args.command.to_edit() else {
        return Err(fail(
            output,
            &CliError::with_details(
                "speech positions start at 1",
                "use the numbers shown by `lec show unit <id>`",
                "invalid_position",
            ),
        ));
    };

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    let unit = store
        .edit_speech(args.command.unit_id(), edit)
        .map_err(|err| store_failure(output, &err))?;

    render_mode(
        output,
        &unit,
        |unit: &Unit, w| {
            for (n, speech) in unit.speech_texts.iter().enumerate() {
                writeln!(w, "{}\t{}", n + 1, speech.text)?;
            }
            Ok(())
        },
        |unit: &Unit, w| {
            writeln!(
                w,
                "✓ {} now has {} speech text(s)",
                unit.fields.name,
                unit.speech_texts.len()
            )?;
            for (n, speech) in unit.speech_texts.iter().enumerate() {
                writeln!(w, "{:>3}. {}", n + 1, speech.text)?;
            }
            Ok(())
        },
    )
}
