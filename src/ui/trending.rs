use crate::app::App;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Columns taken by the trending pane beside the article list.
pub const PANE_WIDTH: u16 = 28;

/// Render the trending topics, each prefixed with the digit that selects it.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let text_width = area.width.saturating_sub(2) as usize;
    let active = app.current_category();

    let items: Vec<ListItem> = app
        .trending
        .iter()
        .enumerate()
        .map(|(rank, topic)| {
            let key = format!("{} ", (rank + 1) % 10);
            let count = format!(" {}", topic.article_count);
            let room = text_width.saturating_sub(key.len() + count.len());
            let is_active = active
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(&topic.topic));
            let name_style = if is_active {
                app.style("category_active")
            } else {
                app.style("article_title")
            };

            let name = sanitize_line(&topic.topic);
            let name = truncate_to_width(&name, room).into_owned();

            ListItem::new(Line::from(vec![
                Span::styled(key, app.style("article_category")),
                Span::styled(name, name_style),
                Span::styled(count, app.style("article_meta")),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.style("panel_border"))
            .title(" Trending [1-0] "),
    );

    f.render_widget(list, area);
}
