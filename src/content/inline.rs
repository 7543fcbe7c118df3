//! Inline markup: `**bold**`, `_italic_`, `[text](url)`

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"));
// Underscores inside words, URLs and identifiers are not emphasis.
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b_([^_]+?)_\b").expect("valid italic pattern"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link pattern"));

/// A run of inline text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Strong(String),
    Emphasis(String),
    /// A hyperlink meant to open outside the reader
    Link { text: String, url: String },
}

impl Inline {
    /// The visible text of the span
    pub fn plain(&self) -> &str {
        match self {
            Inline::Text(text) | Inline::Strong(text) | Inline::Emphasis(text) => text,
            Inline::Link { text, .. } => text,
        }
    }
}

/// Splits text into inline spans
///
/// Bold is matched first, then italic, then links. Each pass only looks at
/// text the earlier passes left plain, so nothing is matched twice. Nested or
/// overlapping markup is not supported and comes out as literal text.
pub fn format_inline(text: &str) -> Vec<Inline> {
    let mut spans = Vec::new();
    if !text.is_empty() {
        spans.push(Inline::Text(text.to_string()));
    }
    let spans = substitute(spans, &BOLD, |caps| Inline::Strong(caps[1].to_string()));
    let spans = substitute(spans, &ITALIC, |caps| Inline::Emphasis(caps[1].to_string()));
    substitute(spans, &LINK, |caps| Inline::Link {
        text: caps[1].to_string(),
        url: caps[2].to_string(),
    })
}

/// Concatenated visible text of `spans`
pub fn plain_text(spans: &[Inline]) -> String {
    spans.iter().map(Inline::plain).collect()
}

fn substitute(spans: Vec<Inline>, pattern: &Regex, build: impl Fn(&Captures) -> Inline) -> Vec<Inline> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let Inline::Text(text) = span else {
            out.push(span);
            continue;
        };

        let mut last = 0;
        for caps in pattern.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            if whole.start() > last {
                out.push(Inline::Text(text[last..whole.start()].to_string()));
            }
            out.push(build(&caps));
            last = whole.end();
        }
        if last < text.len() {
            out.push(Inline::Text(text[last..].to_string()));
        }
    }
    out
}
