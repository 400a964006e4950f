//! Search overlay: query box, result list, recent and suggested searches.

use crate::app::App;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the search overlay on top of the current view.
pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 70, f.area());
    if overlay.width < 20 || overlay.height < 8 {
        return;
    }

    f.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(" Search ");
    let inner = block.inner(overlay);
    f.render_widget(block, overlay);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let input = Line::from(vec![
        Span::styled("> ", app.style("search_hint")),
        Span::styled(format!("{}_", app.search.query()), app.style("search_input")),
    ]);
    f.render_widget(Paragraph::new(input), chunks[0]);
    f.render_widget(
        Paragraph::new(summary_line(app)).style(app.style("search_hint")),
        chunks[1],
    );

    if app.search.query().is_empty() {
        render_suggestions(f, app, chunks[2]);
    } else {
        render_results(f, app, chunks[2]);
    }
}

/// Progress or result count under the query box.
fn summary_line(app: &App) -> String {
    let search = &app.search;
    if search.query().is_empty() {
        return "Start typing, or pick a search below".to_string();
    }
    if !search.is_searchable() {
        return format!("Type at least {} characters", app.config.min_query_chars);
    }
    if search.is_loading() || search.is_pending() {
        return "Searching...".to_string();
    }
    match search.total_results() {
        0 => format!("No results for \"{}\"", sanitize_line(search.query())),
        1 => "1 result".to_string(),
        n => format!("{n} results"),
    }
}

fn render_results(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let selected = app.search.selected_index();

    let items: Vec<ListItem> = app
        .search
        .results()
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let style = if Some(i) == selected {
                app.style("search_selected")
            } else {
                app.style("article_title")
            };
            let title = sanitize_line(&article.title);
            let title = truncate_to_width(&title, width).into_owned();
            let source = sanitize_line(&article.source);
            let meta = if article.category.is_empty() {
                source.into_owned()
            } else {
                format!("{source} · {}", sanitize_line(&article.category))
            };
            ListItem::new(vec![
                Line::styled(title, style),
                Line::styled(
                    truncate_to_width(&format!("  {meta}"), width).into_owned(),
                    app.style("article_meta"),
                ),
            ])
        })
        .collect();

    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(
        List::new(items).highlight_style(Style::default()),
        area,
        &mut state,
    );
}

/// Recent searches then suggested ones, each under a heading.
fn render_suggestions(f: &mut Frame, app: &App, area: Rect) {
    let suggestions = app.suggestions();
    let recent = app.search.history().len();
    let selected = app.suggestion_selected;

    let mut items: Vec<ListItem> = Vec::with_capacity(suggestions.len() + 2);
    let mut selected_row = None;
    for (i, query) in suggestions.iter().enumerate() {
        if i == 0 && recent > 0 {
            items.push(ListItem::new(Line::styled(
                "Recent searches",
                app.style("search_heading"),
            )));
        }
        if i == recent {
            items.push(ListItem::new(Line::styled(
                "Suggested",
                app.style("search_heading"),
            )));
        }
        let style = if Some(i) == selected {
            selected_row = Some(items.len());
            app.style("search_selected")
        } else {
            app.style("article_title")
        };
        items.push(ListItem::new(Line::styled(format!("  {query}"), style)));
    }

    if recent > 0 {
        items.push(ListItem::new(Line::styled(
            "Ctrl+x clears recent searches",
            app.style("search_hint"),
        )));
    }

    let mut state = ListState::default().with_selected(selected_row);
    f.render_stateful_widget(
        List::new(items).highlight_style(Style::default()),
        area,
        &mut state,
    );
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::clock::FixedClock;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn test_app() -> App {
        let config = Config::default();
        let api = ApiClient::new(&config.api_base_url).unwrap();
        App::new(
            config,
            api,
            MemoryStore::shared(),
            Arc::new(FixedClock::at(10, 0)),
            None,
        )
    }

    #[tokio::test]
    async fn test_summary_line_follows_query_state() {
        let mut app = test_app();
        assert_eq!(summary_line(&app), "Start typing, or pick a search below");

        app.search.set_query("r", Instant::now());
        assert_eq!(summary_line(&app), "Type at least 2 characters");

        app.search.set_query("ru", Instant::now());
        assert_eq!(summary_line(&app), "Searching...");
    }

    #[test]
    fn test_centered_rect() {
        let rect = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(rect, Rect::new(25, 10, 50, 20));
    }
}
