//! Export renderers: pretty JSON, Markdown, and plain text.
//!
//! Markdown and text render each item as a block and join the blocks with a
//! format-specific separator. Units additionally carry their explanation and
//! numbered speech texts.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::model::Item;
use crate::model::item::ParseEnumError;

const MARKDOWN_SEPARATOR: &str = "\n---\n\n";
const TEXT_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Markdown,
    Text,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Text => "text",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "markdown" | "md" => Ok(Self::Markdown),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(ParseEnumError {
                expected: "export format",
                got: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Heading above a unit's numbered speech texts in Markdown.
    pub speech_heading: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            speech_heading: "Sprechtexte".to_string(),
        }
    }
}

/// Render `items` in `format`.
///
/// # Errors
///
/// Only the JSON renderer can fail, when an item does not serialize.
pub fn export(
    items: &[Item],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<String, serde_json::Error> {
    match format {
        ExportFormat::Json => serde_json::to_string_pretty(items),
        ExportFormat::Markdown => Ok(items
            .iter()
            .map(|item| markdown_block(item, options))
            .collect::<Vec<_>>()
            .join(MARKDOWN_SEPARATOR)),
        ExportFormat::Text => Ok(items
            .iter()
            .map(text_block)
            .collect::<Vec<_>>()
            .join(TEXT_SEPARATOR)),
    }
}

fn markdown_block(item: &Item, options: &ExportOptions) -> String {
    let fields = item.fields();
    let mut md = format!("# {}\n\n", fields.name);
    if let Some(description) = fields.description.as_deref().filter(|d| !d.is_empty()) {
        md.push_str(description);
        md.push_str("\n\n");
    }
    if let Some(unit) = item.as_unit() {
        if !unit.explanation_text.is_empty() {
            md.push_str(&unit.explanation_text);
            md.push_str("\n\n");
        }
        md.push_str(&format!("## {}\n\n", options.speech_heading));
        for (index, speech) in unit.speech_texts.iter().enumerate() {
            md.push_str(&format!("{}. {}\n", index + 1, speech.text));
        }
    }
    md
}

fn text_block(item: &Item) -> String {
    let fields = item.fields();
    let mut text = format!("{}\n", fields.name);
    if let Some(description) = fields.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(description);
        text.push('\n');
    }
    if let Some(unit) = item.as_unit() {
        let explanation = flatten_markdown(&unit.explanation_text);
        if !explanation.is_empty() {
            text.push_str(&explanation);
            text.push('\n');
        }
        for (index, speech) in unit.speech_texts.iter().enumerate() {
            text.push_str(&format!("{}. {}\n", index + 1, speech.text));
        }
    }
    text
}

/// Strip Markdown syntax, keeping text content and block line breaks.
#[must_use]
pub fn flatten_markdown(source: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(source) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::CodeBlock,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim_end().to_string()
}
