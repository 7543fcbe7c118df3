//! Article body transform
//!
//! Turns the lightweight markup used in article bodies into an ordered
//! sequence of [`ContentBlock`]s. Paragraphs are separated by blank lines;
//! each paragraph is classified by a fixed, ordered rule table:
//!
//! | Rule      | Matches                          | Block                 |
//! |-----------|----------------------------------|-----------------------|
//! | image     | `![alt](src)`                    | `Image`               |
//! | heading 2 | `## ` prefix (preview only)      | `Heading { level: 2 }`|
//! | heading 3 | `### ` prefix (preview only)     | `Heading { level: 3 }`|
//! | quote     | `> ` prefix                      | `Quote`               |
//! | otherwise |                                  | `Paragraph`           |
//!
//! The transform is pure: the same input always yields the same blocks.

mod body;
mod inline;

pub use body::{interleave, BodyItem, ALSO_READ_AFTER, ALSO_READ_PER_BOX};
pub use inline::{format_inline, plain_text, Inline};

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::Lines;
use tracing::debug;

static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[(.*?)\]\(([^)\s]+)\)$").expect("valid image pattern"));

/// One structurally classified unit of an article body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    Paragraph(Vec<Inline>),
    Image { src: String, alt: String },
    Quote(Vec<Inline>),
    Heading { level: u8, text: String },
}

impl ContentBlock {
    /// Visible text of the block, without markup
    pub fn plain_text(&self) -> String {
        match self {
            ContentBlock::Paragraph(spans) | ContentBlock::Quote(spans) => plain_text(spans),
            ContentBlock::Image { alt, .. } => alt.clone(),
            ContentBlock::Heading { text, .. } => text.clone(),
        }
    }
}

/// Switches for the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformOptions {
    /// Recognise `## ` and `### ` headings
    pub headings: bool,
}

impl TransformOptions {
    /// The public article reader: no heading support
    pub fn reader() -> Self {
        Self { headings: false }
    }

    /// The dashboard preview: headings enabled
    pub fn preview() -> Self {
        Self { headings: true }
    }
}

/// A classification rule: when `applies` holds, `build` produces the block.
/// `build` returning `None` falls through to the next rule.
struct Rule {
    name: &'static str,
    applies: fn(&str, TransformOptions) -> bool,
    build: fn(&str) -> Option<ContentBlock>,
}

const RULES: &[Rule] = &[
    Rule {
        name: "image",
        applies: is_image,
        build: image_block,
    },
    Rule {
        name: "heading2",
        applies: is_heading2,
        build: heading2_block,
    },
    Rule {
        name: "heading3",
        applies: is_heading3,
        build: heading3_block,
    },
    Rule {
        name: "quote",
        applies: is_quote,
        build: quote_block,
    },
];

fn is_image(text: &str, _: TransformOptions) -> bool {
    text.starts_with("![") && text.ends_with(')')
}

fn image_block(text: &str) -> Option<ContentBlock> {
    let caps = IMAGE.captures(text)?;
    Some(ContentBlock::Image {
        alt: caps[1].to_string(),
        src: caps[2].to_string(),
    })
}

fn is_heading2(text: &str, options: TransformOptions) -> bool {
    options.headings && text.starts_with("## ")
}

fn heading2_block(text: &str) -> Option<ContentBlock> {
    Some(ContentBlock::Heading {
        level: 2,
        text: text[3..].trim().to_string(),
    })
}

fn is_heading3(text: &str, options: TransformOptions) -> bool {
    options.headings && text.starts_with("### ")
}

fn heading3_block(text: &str) -> Option<ContentBlock> {
    Some(ContentBlock::Heading {
        level: 3,
        text: text[4..].trim().to_string(),
    })
}

fn is_quote(text: &str, _: TransformOptions) -> bool {
    text.starts_with("> ")
}

fn quote_block(text: &str) -> Option<ContentBlock> {
    Some(ContentBlock::Quote(format_inline(text[2..].trim())))
}

/// Classifies one trimmed, non-empty paragraph
pub fn classify(text: &str, options: TransformOptions) -> ContentBlock {
    for rule in RULES {
        if !(rule.applies)(text, options) {
            continue;
        }
        match (rule.build)(text) {
            Some(block) => return block,
            None => debug!(rule = rule.name, "markup did not parse, treating as text"),
        }
    }
    ContentBlock::Paragraph(format_inline(text))
}

/// Lazily transforms `input` into content blocks
///
/// The iterator is `Clone`; cloning it restarts from the same position.
pub fn blocks(input: &str, options: TransformOptions) -> Blocks<'_> {
    Blocks {
        lines: input.lines(),
        options,
    }
}

/// Iterator returned by [`blocks`]
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: Lines<'a>,
    options: TransformOptions,
}

impl Iterator for Blocks<'_> {
    type Item = ContentBlock;

    fn next(&mut self) -> Option<ContentBlock> {
        let mut paragraph: Vec<&str> = Vec::new();
        for line in self.lines.by_ref() {
            if line.trim().is_empty() {
                if paragraph.is_empty() {
                    continue;
                }
                break;
            }
            paragraph.push(line);
        }
        if paragraph.is_empty() {
            return None;
        }

        let text = paragraph.join("\n");
        Some(classify(text.trim(), self.options))
    }
}
