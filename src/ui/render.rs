//! Render dispatch for the TUI.

use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{articles, categories, search, status, trending};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Narrower terminals give the whole width to the article list.
const TRENDING_MIN_WIDTH: u16 = 80;

/// Draw the active view, the status bar and, when open, the search overlay.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match app.view {
        View::Feed => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(0),
                    Constraint::Length(1),
                ])
                .split(area);
            categories::render(f, app, chunks[0]);
            if app.trending.is_empty() || area.width < TRENDING_MIN_WIDTH {
                articles::render(f, app, chunks[1]);
            } else {
                let columns = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Min(0), Constraint::Length(trending::PANE_WIDTH)])
                    .split(chunks[1]);
                articles::render(f, app, columns[0]);
                trending::render(f, app, columns[1]);
            }
            status::render(f, app, chunks[2]);
        }
        View::Saved => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(area);
            articles::render(f, app, chunks[0]);
            status::render(f, app, chunks[1]);
        }
    }

    if app.search_open {
        search::render(f, app);
    }
}
