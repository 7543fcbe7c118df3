//! Home and category feed rendering
//!
//! Renders the article lists, the headline and sponsored side panels, and the
//! category picker overlay.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::{centered_rect, colors, render_not_found};
use crate::app::App;
use crate::data::{Article, Campaign};
use crate::screens::{CategoryModel, HomeModel, ScreenState};

/// Builds one list row for an article
///
/// The selected row carries a cursor; headlines get a star and prime
/// articles a diamond.
pub fn article_line(article: &Article, selected: bool) -> Line<'static> {
    let cursor = if selected { "\u{25B8} " } else { "  " }; // ▸
    let title_style = if selected {
        Style::default()
            .fg(colors::ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors::PRIMARY)
    };

    let mut spans = vec![Span::styled(cursor, Style::default().fg(colors::ACCENT))];
    if article.is_headline {
        spans.push(Span::styled("\u{2605} ", Style::default().fg(colors::ACCENT))); // ★
    }
    if article.is_prime {
        spans.push(Span::styled("\u{25C6} ", Style::default().fg(colors::PRIME))); // ◆
    }
    spans.push(Span::styled(article.title.clone(), title_style));

    let mut meta = Vec::new();
    if let Some(category) = &article.category {
        meta.push(category.clone());
    }
    meta.push(article.date.clone());
    meta.push(article.read_time.clone());
    spans.push(Span::styled(
        format!("  {}", meta.join(" \u{00B7} ")), // ·
        Style::default().fg(colors::MUTED),
    ));

    Line::from(spans)
}

/// Rows for a list of articles, windowed so the selection stays visible
fn list_lines(articles: &[Article], selected: usize, height: u16) -> Vec<Line<'static>> {
    let height = height.max(1) as usize;
    let first = selected.saturating_sub(height - 1);
    articles
        .iter()
        .enumerate()
        .skip(first)
        .take(height)
        .map(|(index, article)| article_line(article, index == selected))
        .collect()
}

fn masthead(subtitle: String) -> Paragraph<'static> {
    let date = Local::now().format("%A, %B %-d, %Y").to_string();
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                "THE BOLD EAST AFRICA",
                Style::default()
                    .fg(colors::HEADER)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(date, Style::default().fg(colors::SECONDARY)),
        ]),
        Line::from(Span::styled(subtitle, Style::default().fg(colors::SECONDARY))),
    ])
}

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::HEADER))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_list(frame: &mut Frame, articles: &[Article], selected: usize, title: &str, area: Rect) {
    let block = titled_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if articles.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No stories yet",
                Style::default().fg(colors::MUTED),
            )),
            inner,
        );
        return;
    }
    frame.render_widget(
        Paragraph::new(list_lines(articles, selected, inner.height)),
        inner,
    );
}

/// Renders the home feed
pub fn render_home(frame: &mut Frame, app: &App, state: &ScreenState<HomeModel>, area: Rect) {
    let empty = HomeModel::default();
    let model = state.model.as_ref().unwrap_or(&empty);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);
    frame.render_widget(masthead("Latest news from East Africa".to_string()), chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    let latest: Vec<Article> = model.latest().into_iter().cloned().collect();
    render_list(frame, &latest, app.selected_index, "Latest", columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(columns[1]);

    let headlines: Vec<Line> = model
        .headlines()
        .into_iter()
        .map(|article| {
            Line::from(vec![
                Span::styled("\u{2605} ", Style::default().fg(colors::ACCENT)),
                Span::styled(article.title.clone(), Style::default().fg(colors::PRIMARY)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(headlines)
            .block(titled_block("Headlines"))
            .wrap(Wrap { trim: true }),
        side[0],
    );

    let campaigns = model.active_campaigns();
    render_sponsored(frame, app.sponsored(&campaigns), side[1]);
}

fn render_sponsored(frame: &mut Frame, campaign: Option<&Campaign>, area: Rect) {
    let lines = match campaign {
        Some(campaign) => {
            let mut lines = vec![Line::from(Span::styled(
                campaign.title.clone(),
                Style::default()
                    .fg(colors::PRIMARY)
                    .add_modifier(Modifier::BOLD),
            ))];
            if let Some(link) = &campaign.link {
                lines.push(Line::from(Span::styled(
                    link.clone(),
                    Style::default()
                        .fg(colors::LINK)
                        .add_modifier(Modifier::UNDERLINED),
                )));
            }
            lines
        }
        None => vec![Line::from(Span::styled(
            "Advertise with us",
            Style::default().fg(colors::MUTED),
        ))],
    };

    frame.render_widget(
        Paragraph::new(lines)
            .block(titled_block("Sponsored"))
            .wrap(Wrap { trim: true }),
        area,
    );
}

/// Renders a category feed
pub fn render_category(frame: &mut Frame, app: &App, state: &ScreenState<CategoryModel>, area: Rect) {
    let Some(model) = state.model.as_ref() else {
        if state.not_found {
            render_not_found(frame, area, "Category");
        } else {
            render_list(frame, &[], 0, "Category", area);
        }
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(area);

    let subtitle = model
        .category
        .description
        .clone()
        .unwrap_or_else(|| format!("{} stories", model.articles.len()));
    frame.render_widget(masthead(subtitle), chunks[0]);
    render_list(
        frame,
        &model.articles,
        app.selected_index,
        &model.category.name,
        chunks[1],
    );
}

/// Renders the category picker overlay
pub fn render_picker(frame: &mut Frame, app: &App) {
    let Some(picker) = app.picker.as_ref() else {
        return;
    };

    let height = (picker.categories.len() as u16 + 4).clamp(5, 20);
    let area = centered_rect(40, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = picker
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let selected = index == picker.selected;
            let style = if selected {
                Style::default()
                    .fg(colors::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors::PRIMARY)
            };
            let cursor = if selected { "\u{25B8} " } else { "  " };
            Line::from(Span::styled(format!("{}{}", cursor, category.name), style))
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "No categories cached yet",
            Style::default().fg(colors::MUTED),
        )));
    }

    let visible = area.height.saturating_sub(2) as usize;
    let skip = picker.selected.saturating_sub(visible.saturating_sub(1));
    let lines: Vec<Line> = lines.into_iter().skip(skip).collect();

    frame.render_widget(Paragraph::new(lines).block(titled_block("Categories")), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fixtures::loaded_app;
    use crate::app::Route;
    use crate::data::ArticleStatus;
    use crate::ui::buffer_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn article(id: u64, title: &str) -> Article {
        Article {
            id,
            slug: None,
            title: title.to_string(),
            excerpt: String::new(),
            content: String::new(),
            image: None,
            category: Some("News".to_string()),
            category_id: None,
            categories: vec!["News".to_string()],
            author: "Staff".to_string(),
            created_at: None,
            date: "March 2, 2024".to_string(),
            read_time: "1 min read".to_string(),
            is_prime: false,
            is_headline: false,
            status: ArticleStatus::Published,
            views: 0,
            clicks: 0,
        }
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn test_article_line_markers() {
        let mut story = article(1, "Rains Hit Nairobi");
        story.is_headline = true;
        story.is_prime = true;

        let text = line_text(&article_line(&story, true));

        assert!(text.starts_with("\u{25B8} \u{2605} \u{25C6} Rains Hit Nairobi"));
        assert!(text.contains("News \u{00B7} March 2, 2024 \u{00B7} 1 min read"));
    }

    #[test]
    fn test_list_window_follows_selection() {
        let articles: Vec<Article> = (1..=10).map(|n| article(n, &format!("Story {}", n))).collect();

        let lines = list_lines(&articles, 7, 3);

        assert_eq!(lines.len(), 3);
        assert!(line_text(&lines[0]).contains("Story 6"));
        assert!(line_text(&lines[2]).starts_with("\u{25B8} Story 8"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_home_renders_feed_and_sponsor() {
        let (app, _dir) = loaded_app(Route::Home).await;
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();

        terminal.draw(|frame| crate::ui::render(frame, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("THE BOLD EAST AFRICA"));
        assert!(content.contains("Markets Rally"));
        assert!(content.contains("Headlines"));
        assert!(content.contains("Safari Deals"));
        assert!(!content.contains("Unpublished"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_category_renders_not_found() {
        let (app, _dir) = loaded_app(Route::Category("sports".to_string())).await;
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        terminal.draw(|frame| crate::ui::render(frame, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Category not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_picker_overlay_lists_categories() {
        let (mut app, _dir) = loaded_app(Route::Home).await;
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE));
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        terminal.draw(|frame| crate::ui::render(frame, &app)).unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Categories"));
        assert!(content.contains("Business"));
    }
}
