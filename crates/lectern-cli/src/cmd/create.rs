//! `lec create`: add a subject, training, topic, or unit.

use crate::cmd::{store_failure, write_item_row};
use crate::output::{OutputMode, fail, render_mode};
use crate::project::Project;
use crate::validate;
use clap::Args;
use lectern_core::model::SpeechText;
use lectern_core::{ItemPatch, Level, Status};
use std::io::Write;
use std::path::Path;

/// Optional item fields shared by `create` and `update`.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Parent id one level up (required below subject on create).
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Short description. An empty string clears it.
    #[arg(short, long)]
    pub description: Option<String>,

    /// Free-form notes. An empty string clears them.
    #[arg(long)]
    pub notes: Option<String>,

    /// Reference URL (repeatable, at most five).
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Image URL. An empty string clears it.
    #[arg(long)]
    pub image: Option<String>,

    /// Status: backlog, draft, ready, or published.
    #[arg(short, long)]
    pub status: Option<Status>,

    /// Markdown explanation (units only).
    #[arg(long)]
    pub explanation: Option<String>,

    /// Speech text paragraph (units only, repeatable, replaces the list).
    #[arg(long = "speech", value_name = "TEXT")]
    pub speech: Vec<String>,
}

impl FieldArgs {
    pub fn to_patch(&self, name: Option<&str>) -> ItemPatch {
        ItemPatch {
            name: name.map(str::to_string),
            description: self.description.clone(),
            notes: self.notes.clone(),
            urls: (!self.urls.is_empty()).then(|| self.urls.clone()),
            image: self.image.clone(),
            status: self.status,
            parent_id: self.parent.clone(),
            speech_texts: (!self.speech.is_empty())
                .then(|| self.speech.iter().map(SpeechText::new).collect()),
            explanation_text: self.explanation.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Hierarchy level: subject, training, topic, or unit.
    pub level: Level,

    /// Display name.
    #[arg(short, long)]
    pub name: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

pub fn run_create(args: &CreateArgs, output: OutputMode, project_root: &Path) -> anyhow::Result<()> {
    if let Err(e) = validate::validate_name(&args.name) {
        return Err(fail(output, &e.to_cli_error()));
    }

    let project = Project::discover(project_root, output)?;
    let _lock = project.lock(output)?;
    let mut store = project.open_store();

    let item = store
        .create(args.level, args.fields.to_patch(Some(&args.name)))
        .map_err(|err| store_failure(output, &err))?;

    tracing::info!(level = %item.level(), id = item.id(), "item created");
    render_mode(
        output,
        &item,
        |item, w| write_item_row(w, item),
        |item, w| {
            writeln!(
                w,
                "✓ Created {} {}: {}",
                item.level(),
                item.id(),
                item.name()
            )
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CreateArgs,
    }

    #[test]
    fn create_args_parse_level_and_fields() {
        let w = Wrapper::parse_from([
            "test",
            "units",
            "--name",
            "Intro",
            "--parent",
            "p-1",
            "--url",
            "https://a",
            "--url",
            "https://b",
            "--speech",
            "Hi",
            "--status",
            "draft",
        ]);
        assert_eq!(w.args.level, Level::Unit);
        let patch = w.args.fields.to_patch(Some(&w.args.name));
        assert_eq!(patch.name.as_deref(), Some("Intro"));
        assert_eq!(patch.parent_id.as_deref(), Some("p-1"));
        assert_eq!(patch.urls.as_ref().map(Vec::len), Some(2));
        assert_eq!(patch.speech_texts.unwrap()[0].text, "Hi");
        assert_eq!(patch.status, Some(Status::Draft));
    }

    #[test]
    fn unset_fields_stay_out_of_the_patch() {
        let w = Wrapper::parse_from(["test", "subject", "--name", "S"]);
        let patch = w.args.fields.to_patch(None);
        assert!(patch.is_empty());
    }

    #[test]
    fn bad_level_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "chapter", "--name", "x"]).is_err());
    }
}
