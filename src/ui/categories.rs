use crate::app::App;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Tabs},
    Frame,
};

/// Render the category bar, scrolled so the active tab stays on screen.
///
/// A trending topic outside the configured categories shows as a trailing
/// tab while it is the active filter.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let mut labels: Vec<&str> = app.category_labels().collect();
    let active = match app.topic_filter.as_deref() {
        Some(topic) => {
            labels.push(topic);
            labels.len() - 1
        }
        None => app.category_index,
    };
    let inner_width = area.width.saturating_sub(2) as usize;
    let first = first_visible(&labels, active, inner_width);

    let titles: Vec<Line> = labels[first..]
        .iter()
        .map(|label| Line::from(*label))
        .collect();

    let tabs = Tabs::new(titles)
        .select(active - first)
        .style(app.style("category_inactive"))
        .highlight_style(app.style("category_active"))
        .divider("|")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.style("panel_border"))
                .title(" Categories [Tab/Shift+Tab] "),
        );

    f.render_widget(tabs, area);
}

/// Index of the first tab to draw so that `active` fits in `width` columns.
///
/// Each tab takes its label plus one padding column on each side and a
/// divider.
fn first_visible(labels: &[&str], active: usize, width: usize) -> usize {
    let tab_width = |label: &str| crate::util::display_width(label) + 3;
    let mut first = 0;
    while first < active {
        let used: usize = labels[first..=active].iter().map(|l| tab_width(l)).sum();
        if used <= width {
            break;
        }
        first += 1;
    }
    first
}
