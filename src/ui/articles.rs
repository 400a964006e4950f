use crate::api::Article;
use crate::app::{App, View};
use crate::util::{display_width, format_relative, sanitize_line, truncate_to_width};
use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Width of the bookmark column.
const MARK_WIDTH: usize = 2;

/// Render the article list for the active view, with the load-more footer
/// under the feed.
///
/// Records the number of visible rows on `app` so the scroll sentinel can
/// tell how close the window is to the end of the list.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.style("panel_border_focused"))
        .title(title(app));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let footer = match app.view {
        View::Feed => app.feed.footer_text(),
        View::Saved => None,
    };
    let (list_area, footer_area) = if footer.is_some() && inner.height > 1 {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);
        (chunks[0], Some(chunks[1]))
    } else {
        (inner, None)
    };

    if let (Some(text), Some(footer_area)) = (footer, footer_area) {
        f.render_widget(
            Paragraph::new(text)
                .style(app.style("list_footer"))
                .centered(),
            footer_area,
        );
    }

    if app.visible_articles().is_empty() {
        app.visible_rows = list_area.height as usize;
        f.render_widget(
            Paragraph::new(empty_text(app)).style(app.style("empty_state")),
            list_area,
        );
        return;
    }

    let rows = list_area.height as usize;
    let mut state = match app.view {
        View::Feed => {
            app.follow_selection(rows);
            ListState::default()
                .with_offset(app.scroll_offset)
                .with_selected(Some(app.selected_article))
        }
        View::Saved => ListState::default().with_selected(Some(app.selected_saved)),
    };

    let now = Utc::now();
    let width = list_area.width as usize;
    let selected = app.selected_index();
    let items: Vec<ListItem> = app
        .visible_articles()
        .iter()
        .enumerate()
        .map(|(i, article)| article_row(app, article, i == selected, width, now))
        .collect();

    let list = List::new(items).highlight_style(Style::default());
    f.render_stateful_widget(list, list_area, &mut state);
}

fn title(app: &App) -> String {
    match app.view {
        View::Feed => {
            let category = app.feed.category().unwrap_or(crate::app::ALL_CATEGORIES);
            format!(" {category} ")
        }
        View::Saved => format!(" Saved ({}) ", app.bookmarks.len()),
    }
}

fn empty_text(app: &App) -> String {
    match app.view {
        View::Feed if app.feed.loading() => "Loading articles...".to_string(),
        View::Feed => match app.feed.category() {
            Some(category) => format!("No articles in {category}"),
            None => "No articles".to_string(),
        },
        View::Saved => "No saved articles. Press s on an article to save it.".to_string(),
    }
}

/// One row: bookmark mark, title, then source and age right after it.
fn article_row(
    app: &App,
    article: &Article,
    is_selected: bool,
    width: usize,
    now: DateTime<Utc>,
) -> ListItem<'static> {
    let mark = if app.bookmarks.is_bookmarked(article.id) {
        Span::styled("★ ", app.style("bookmark_mark"))
    } else {
        Span::raw("  ")
    };

    let meta = meta_text(article, now);
    let meta_width = if meta.is_empty() {
        0
    } else {
        display_width(&meta) + 2
    };
    let title_width = width.saturating_sub(MARK_WIDTH + meta_width);
    let title = sanitize_line(&article.title);
    let title = truncate_to_width(&title, title_width).into_owned();

    let title_style = if is_selected {
        app.style("article_selected")
    } else {
        app.style("article_title")
    };

    let mut spans = vec![mark, Span::styled(title, title_style)];
    if !meta.is_empty() {
        spans.push(Span::styled(format!("  {meta}"), app.style("article_meta")));
    }
    ListItem::new(Line::from(spans))
}

/// "source · category · age", skipping empty parts.
fn meta_text(article: &Article, now: DateTime<Utc>) -> String {
    let age = article
        .published_at()
        .map(|published| format_relative(published, now))
        .unwrap_or_default();
    [
        sanitize_line(&article.source).into_owned(),
        sanitize_line(&article.category).into_owned(),
        age,
    ]
    .into_iter()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article() -> Article {
        Article {
            id: 1,
            title: "Rates hold steady".into(),
            summary: String::new(),
            content: None,
            url: "https://example.com/1".into(),
            image_url: None,
            category: "Business".into(),
            source: "Wire".into(),
            publish_date: Some("2026-03-01T09:00:00Z".into()),
            quality_score: None,
            feed_score: None,
        }
    }

    #[test]
    fn test_meta_text_joins_parts() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(meta_text(&article(), now), "Wire · Business · 3h");
    }

    #[test]
    fn test_meta_text_skips_missing_parts() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut a = article();
        a.source.clear();
        a.publish_date = None;
        assert_eq!(meta_text(&a, now), "Business");
    }
}
