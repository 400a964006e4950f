use super::FeedController;

/// Proximity trigger at the end of the rendered article list.
///
/// The list view reports the index one past its last visible row; once that
/// is within `margin` rows of the end the sentinel asks for the next page.
/// A detached sentinel never fires.
#[derive(Debug, Clone)]
pub struct ScrollSentinel {
    margin: usize,
    attached: bool,
}

impl ScrollSentinel {
    /// Create an attached sentinel.
    pub fn new(margin: usize) -> Self {
        Self {
            margin,
            attached: true,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Stop observing. Used when the feed view is torn down.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Whether `feed` should load its next page given the visible window.
    pub fn should_load(&self, visible_end: usize, feed: &FeedController) -> bool {
        if !self.attached || feed.loading() || !feed.has_more() {
            return false;
        }
        visible_end.saturating_add(self.margin) >= feed.items().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Article, ArticlePage};

    fn feed_with(count: i64, has_more: bool) -> FeedController {
        let articles = (0..count)
            .map(|id| Article {
                id,
                title: String::new(),
                summary: String::new(),
                content: None,
                url: String::new(),
                image_url: None,
                category: String::new(),
                source: String::new(),
                publish_date: None,
                quality_score: None,
                feed_score: None,
            })
            .collect();
        let mut feed = FeedController::new(None, 20);
        feed.reset(
            None,
            ArticlePage {
                articles,
                total: None,
                has_more,
            },
        );
        feed
    }

    #[test]
    fn test_fires_within_margin_only() {
        let feed = feed_with(20, true);
        let sentinel = ScrollSentinel::new(5);

        assert!(!sentinel.should_load(10, &feed));
        assert!(!sentinel.should_load(14, &feed));
        assert!(sentinel.should_load(15, &feed));
        assert!(sentinel.should_load(20, &feed));
    }

    #[test]
    fn test_silent_while_loading() {
        let mut feed = feed_with(20, true);
        let sentinel = ScrollSentinel::new(5);
        let _request = feed.begin_load();
        assert!(!sentinel.should_load(20, &feed));
    }

    #[test]
    fn test_silent_when_exhausted() {
        let feed = feed_with(5, false);
        let sentinel = ScrollSentinel::new(5);
        assert!(!sentinel.should_load(5, &feed));
    }

    #[test]
    fn test_detach_stops_firing() {
        let feed = feed_with(20, true);
        let mut sentinel = ScrollSentinel::new(5);
        sentinel.detach();
        assert!(!sentinel.should_load(20, &feed));

        sentinel.attach();
        assert!(sentinel.should_load(20, &feed));
    }
}
