//! Article reader rendering
//!
//! Renders the article body block by block, with "Also Read" boxes between
//! paragraphs and a numbered list of related stories at the end.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{colors, render_not_found};
use crate::app::App;
use crate::content::{blocks, interleave, BodyItem, ContentBlock, Inline, TransformOptions};
use crate::data::Article;
use crate::screens::{ArticleModel, ScreenState};

/// Converts formatted inline spans into styled terminal spans
pub fn inline_spans(spans: &[Inline], base: Style) -> Vec<Span<'static>> {
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        match span {
            Inline::Text(text) => out.push(Span::styled(text.clone(), base)),
            Inline::Strong(text) => {
                out.push(Span::styled(text.clone(), base.add_modifier(Modifier::BOLD)))
            }
            Inline::Emphasis(text) => {
                out.push(Span::styled(text.clone(), base.add_modifier(Modifier::ITALIC)))
            }
            Inline::Link { text, url } => {
                out.push(Span::styled(
                    text.clone(),
                    base.fg(colors::LINK).add_modifier(Modifier::UNDERLINED),
                ));
                out.push(Span::styled(
                    format!(" <{}>", url),
                    Style::default().fg(colors::MUTED),
                ));
            }
        }
    }
    out
}

fn related_line(number: usize, article: &Article) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  [{}] ", number), Style::default().fg(colors::ACCENT)),
        Span::styled(article.title.clone(), Style::default().fg(colors::PRIMARY)),
    ])
}

/// Breaks spans into one line per source line, each starting with `prefix`
///
/// A span never carries a newline into a `Line`; the terminal would drop it.
fn split_lines(spans: Vec<Span<'static>>, prefix: Option<Span<'static>>) -> Vec<Line<'static>> {
    let start = || prefix.iter().cloned().collect::<Vec<_>>();
    let mut lines = Vec::new();
    let mut current = start();

    for span in spans {
        let mut pieces = span.content.split('\n');
        if let Some(first) = pieces.next() {
            if !first.is_empty() {
                current.push(Span::styled(first.to_string(), span.style));
            }
        }
        for piece in pieces {
            lines.push(Line::from(std::mem::replace(&mut current, start())));
            if !piece.is_empty() {
                current.push(Span::styled(piece.to_string(), span.style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn block_lines(block: ContentBlock) -> Vec<Line<'static>> {
    let text = Style::default().fg(colors::PRIMARY);
    match block {
        ContentBlock::Paragraph(spans) => split_lines(inline_spans(&spans, text), None),
        ContentBlock::Quote(spans) => split_lines(
            inline_spans(&spans, text.add_modifier(Modifier::ITALIC)),
            Some(Span::styled("\u{2502} ", Style::default().fg(colors::ACCENT))), // │
        ),
        ContentBlock::Image { src, alt } => {
            let caption = if alt.is_empty() { "Image".to_string() } else { alt };
            vec![
                Line::from(Span::styled(
                    format!("[{}]", caption),
                    Style::default().fg(colors::SECONDARY),
                )),
                Line::from(Span::styled(src, Style::default().fg(colors::MUTED))),
            ]
        }
        ContentBlock::Heading { level, text } => {
            let style = if level <= 2 {
                Style::default()
                    .fg(colors::HEADER)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD)
            };
            vec![Line::from(Span::styled(text, style))]
        }
    }
}

/// Lines of the article body, "Also Read" boxes and related list included
pub fn body_lines(model: &ArticleModel) -> Vec<Line<'static>> {
    let article = &model.article;
    let mut lines = Vec::new();

    if article.content.trim().is_empty() {
        let fallback = if article.excerpt.is_empty() {
            "No content available."
        } else {
            article.excerpt.as_str()
        };
        lines.push(Line::from(Span::styled(
            fallback.to_string(),
            Style::default().fg(colors::SECONDARY),
        )));
        lines.push(Line::from(""));
    }

    let mut numbered = 0;
    for item in interleave(blocks(&article.content, TransformOptions::reader()), &model.related) {
        match item {
            BodyItem::Block(block) => lines.extend(block_lines(block)),
            BodyItem::AlsoRead(related) => {
                lines.push(Line::from(Span::styled(
                    "Also Read",
                    Style::default()
                        .fg(colors::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
                for article in related {
                    numbered += 1;
                    lines.push(related_line(numbered, article));
                }
            }
        }
        lines.push(Line::from(""));
    }

    if !model.related.is_empty() {
        lines.push(Line::from(Span::styled(
            "Related Stories",
            Style::default()
                .fg(colors::HEADER)
                .add_modifier(Modifier::BOLD),
        )));
        for (index, article) in model.related.iter().enumerate() {
            lines.push(related_line(index + 1, article));
        }
    }

    lines
}

fn byline(article: &Article) -> Line<'static> {
    let mut parts = Vec::new();
    if !article.author.is_empty() {
        parts.push(format!("By {}", article.author));
    }
    parts.push(article.date.clone());
    parts.push(article.read_time.clone());
    if let Some(category) = &article.category {
        parts.push(category.clone());
    }
    Line::from(Span::styled(
        parts.join(" \u{00B7} "),
        Style::default().fg(colors::SECONDARY),
    ))
}

/// Renders the article reader
pub fn render(frame: &mut Frame, app: &App, state: &ScreenState<ArticleModel>, area: Rect) {
    let Some(model) = state.model.as_ref() else {
        if state.not_found {
            render_not_found(frame, area, "Article");
        } else {
            let message = state
                .last_error
                .clone()
                .unwrap_or_else(|| "Nothing to show yet".to_string());
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::default().fg(colors::WARNING))),
                area,
            );
        }
        return;
    };
    let article = &model.article;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", article.title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    frame.render_widget(Paragraph::new(vec![byline(article), Line::from("")]), chunks[0]);
    frame.render_widget(
        Paragraph::new(body_lines(model))
            .wrap(Wrap { trim: false })
            .scroll((app.scroll_offset, 0)),
        chunks[1],
    );
}
