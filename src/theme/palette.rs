//! Colour palettes for the two resolved themes.
//!
//! `ColorPalette` names every semantic UI role; `StyleMap` resolves role
//! names to concrete styles so render code can stay palette-agnostic.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// The shade actually on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeVariant {
    Dark,
    Light,
}

impl ThemeVariant {
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// The other shade.
    pub fn opposite(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

// ============================================================================
// Color Palette
// ============================================================================

#[derive(Debug, Clone)]
pub struct ColorPalette {
    // -- Article list --
    pub article_title: Style,
    pub article_selected: Style,
    pub article_summary: Style,
    pub article_meta: Style,
    pub article_category: Style,
    pub bookmark_mark: Style,

    // -- Category bar --
    pub category_active: Style,
    pub category_inactive: Style,

    // -- Search overlay --
    pub search_input: Style,
    pub search_selected: Style,
    pub search_hint: Style,
    pub search_heading: Style,

    // -- Chrome --
    pub list_footer: Style,
    pub empty_state: Style,
    pub status_bar: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub error: Style,
}

impl ColorPalette {
    fn dark() -> Self {
        Self {
            article_title: Style::default().add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            article_summary: Style::default().fg(Color::Gray),
            article_meta: Style::default().fg(Color::DarkGray),
            article_category: Style::default().fg(Color::Cyan),
            bookmark_mark: Style::default().fg(Color::Yellow),

            category_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            category_inactive: Style::default().fg(Color::Gray),

            search_input: Style::default().fg(Color::White),
            search_selected: Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            search_hint: Style::default().fg(Color::DarkGray),
            search_heading: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),

            list_footer: Style::default().fg(Color::DarkGray),
            empty_state: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            panel_border: Style::default(),
            panel_border_focused: Style::default().fg(Color::Cyan),
            error: Style::default().fg(Color::Red),
        }
    }

    fn light() -> Self {
        Self {
            article_title: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            article_selected: Style::default().bg(Color::Blue).fg(Color::White),
            article_summary: Style::default().fg(Color::Black),
            article_meta: Style::default().fg(Color::DarkGray),
            article_category: Style::default().fg(Color::Blue),
            bookmark_mark: Style::default().fg(Color::Magenta),

            category_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            category_inactive: Style::default().fg(Color::DarkGray),

            search_input: Style::default().fg(Color::Black),
            search_selected: Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            search_hint: Style::default().fg(Color::DarkGray),
            search_heading: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),

            list_footer: Style::default().fg(Color::DarkGray),
            empty_state: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
            status_bar: Style::default().bg(Color::White).fg(Color::Black),
            panel_border: Style::default().fg(Color::DarkGray),
            panel_border_focused: Style::default().fg(Color::Blue),
            error: Style::default().fg(Color::Red),
        }
    }
}

// ============================================================================
// Style Map
// ============================================================================

/// String-keyed style lookup built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

const ROLE_NAMES: [&str; 18] = [
    "article_title",
    "article_selected",
    "article_summary",
    "article_meta",
    "article_category",
    "bookmark_mark",
    "category_active",
    "category_inactive",
    "search_input",
    "search_selected",
    "search_hint",
    "search_heading",
    "list_footer",
    "empty_state",
    "status_bar",
    "panel_border",
    "panel_border_focused",
    "error",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 18] = [
            p.article_title,
            p.article_selected,
            p.article_summary,
            p.article_meta,
            p.article_category,
            p.bookmark_mark,
            p.category_active,
            p.category_inactive,
            p.search_input,
            p.search_selected,
            p.search_hint,
            p.search_heading,
            p.list_footer,
            p.empty_state,
            p.status_bar,
            p.panel_border,
            p.panel_border_focused,
            p.error,
        ];

        let map = ROLE_NAMES.into_iter().zip(styles).collect();
        Self { map }
    }

    /// Resolve a role name to its `Style`. Unknown roles get `Style::default()`.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

impl From<ThemeVariant> for StyleMap {
    fn from(variant: ThemeVariant) -> Self {
        Self::from_palette(&variant.palette())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_palette_differs_from_dark() {
        let dark = ThemeVariant::Dark.palette();
        let light = ThemeVariant::Light.palette();
        assert_ne!(dark.article_selected, light.article_selected);
        assert_ne!(dark.status_bar, light.status_bar);
    }

    #[test]
    fn opposite_flips() {
        assert_eq!(ThemeVariant::Dark.opposite(), ThemeVariant::Light);
        assert_eq!(ThemeVariant::Light.opposite(), ThemeVariant::Dark);
    }

    #[test]
    fn style_map_resolves_known_roles() {
        let palette = ThemeVariant::Light.palette();
        let sm = StyleMap::from_palette(&palette);
        assert_eq!(sm.resolve("article_selected"), palette.article_selected);
        assert_eq!(sm.resolve("bookmark_mark"), palette.bookmark_mark);
        assert_eq!(sm.resolve("nonexistent_role"), Style::default());
    }

    #[test]
    fn style_map_has_all_roles() {
        let sm = StyleMap::from(ThemeVariant::Dark);
        assert_eq!(sm.map.len(), ROLE_NAMES.len());
    }
}
