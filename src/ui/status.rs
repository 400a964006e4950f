use crate::app::{App, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: the current status message, or key hints for the
/// focused view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.search_open {
        Cow::Borrowed("Type to search | ↑/↓ select | Enter open | Ctrl+x clear history | Esc close")
    } else {
        match app.view {
            View::Feed => Cow::Borrowed(
                "[j/k]move [Tab]category [1-0]trending [/]search [s]ave [o]pen [b]saved [t]heme [T]mode [q]uit",
            ),
            View::Saved => Cow::Borrowed("[j/k]move [s]unsave [o]pen [b/Esc]back [/]search [q]uit"),
        }
    };

    let paragraph = Paragraph::new(text).style(app.style("status_bar"));
    f.render_widget(paragraph, area);
}
