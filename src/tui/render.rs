//! # Menu Rendering
//!
//! Draws one page of a menu:
//!
//! ```text
//!
//!   Main > Settings > Colours          ← breadcrumb (cyan), ellipsed to fit
//!   Pick the palette used by the app   ← description (dark grey)
//!
//!   1» Presets                         ← "» " marks items that open a menu
//!   2  Invert
//!   3  Reset
//!   <  Previous
//!   >  Next
//! ```
//!
//! Option glyphs run `1..9, 0, A..Z`, as many as the window has rows for.

use std::io;

use crossterm::style::Color;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::page::Page;
use crate::menu::Item;
use crate::tui::terminal::{ColorScope, Terminal};

const GLYPHS: &str = "1234567890ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ELLIPSIS: &str = "…";
const PADDING: &str = "  ";

/// Glyphs for one page: one per row left after `reserved_rows`, at least
/// `min_options`, at most the whole alphabet.
pub fn option_glyphs(window_height: u16, reserved_rows: u16, min_options: usize) -> Vec<char> {
    let rows = (window_height.saturating_sub(reserved_rows) as usize).max(min_options);
    GLYPHS.chars().take(rows).collect()
}

/// The first of `A > B > C`, `A > … > C`, `… > C`, `C` that fits `max_width`.
pub fn breadcrumb(titles: &[&str], max_width: usize) -> Option<String> {
    ellipsed_variants(titles)
        .into_iter()
        .map(|segments| segments.join(" > "))
        .find(|line| line.width() <= max_width)
}

fn ellipsed_variants<'a>(titles: &[&'a str]) -> Vec<Vec<&'a str>> {
    let Some(&last) = titles.last() else {
        return Vec::new();
    };

    let mut variants = vec![titles.to_vec()];
    for skip in 2..titles.len() {
        let mut segments = vec![titles[0], ELLIPSIS];
        segments.extend_from_slice(&titles[skip..]);
        variants.push(segments);
    }
    variants.push(vec![ELLIPSIS, last]);
    variants.push(vec![last]);
    variants
}

/// Cuts `title` to `max_width` display columns, ending in ` …` when there is
/// room for it.
pub fn truncate_title(title: &str, max_width: usize) -> String {
    if title.width() <= max_width {
        return title.to_string();
    }

    let (budget, suffix) = if title.chars().count() > 3 && max_width >= 2 {
        (max_width - 2, " …")
    } else {
        (max_width, "")
    };

    let mut cut = String::new();
    let mut used = 0;
    for c in title.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        cut.push(c);
    }
    cut.push_str(suffix);
    cut
}

/// What to draw for one prompt cycle.
pub struct MenuView<'a> {
    /// Titles from the root menu down to the current one.
    pub titles: Vec<&'a str>,
    pub description: Option<&'a str>,
    pub page: &'a Page<Item>,
    pub glyphs: &'a [char],
    /// In-page index of the item about to run, drawn on a grey background.
    pub selected: Option<usize>,
}

pub fn render_menu(terminal: &dyn Terminal, view: &MenuView<'_>) -> io::Result<()> {
    terminal.apply_colors(Color::Grey, Color::Black)?;
    terminal.clear()?;

    let width = terminal.buffer_width() as usize;
    render_header(terminal, view, width)?;

    let mut max_len = "Previous".len();
    if let Some(longest) = view.page.iter().map(|item| item.title().width()).max() {
        max_len = max_len.max(longest);
    }
    let truncation = width.saturating_sub(7);

    for (index, item) in view.page.iter().enumerate() {
        let Some(glyph) = view.glyphs.get(index) else {
            break;
        };
        let background = if view.selected == Some(index) {
            Color::DarkGrey
        } else {
            Color::Black
        };

        terminal.write(" ")?;
        {
            let _colors = ColorScope::new(terminal, Color::Yellow, Some(background));
            terminal.write(&format!(" {glyph}"))?;
        }

        let foreground = if item.is_highlighted() {
            Color::White
        } else {
            Color::Grey
        };
        let _colors = ColorScope::new(terminal, foreground, Some(background));
        let marker = if item.opens_menu() { "» " } else { "  " };
        let title = truncate_title(item.title(), truncation);
        let padding = " ".repeat((max_len + 1).saturating_sub(title.width()));
        terminal.write(marker)?;
        terminal.write_line(&format!("{title}{padding}"))?;
    }

    let _colors = ColorScope::new(terminal, Color::DarkGrey, None);
    if !view.page.is_first_page() {
        terminal.write_line(&format!("  <  {:<w$}", "Previous", w = max_len + 1))?;
    }
    if !view.page.is_last_page() {
        terminal.write_line(&format!("  >  {:<w$}", "Next", w = max_len + 1))?;
    }
    Ok(())
}

fn render_header(terminal: &dyn Terminal, view: &MenuView<'_>, width: usize) -> io::Result<()> {
    let _colors = ColorScope::new(terminal, Color::Cyan, None);
    terminal.write_line("")?;

    let inner = width.saturating_sub(PADDING.len() * 2);
    if let Some(line) = breadcrumb(&view.titles, inner) {
        terminal.write_line(&format!("{PADDING}{line}"))?;
    }

    if let Some(description) = view.description {
        let _colors = ColorScope::new(terminal, Color::DarkGrey, None);
        for paragraph in description.split('\n') {
            let paragraph = paragraph.trim_end_matches('\r');
            if paragraph.is_empty() || inner == 0 {
                terminal.write_line(&format!("{PADDING}{paragraph}"))?;
                continue;
            }
            for line in textwrap::wrap(paragraph, inner) {
                terminal.write_line(&format!("{PADDING}{line}"))?;
            }
        }
    }

    terminal.write_line("")
}
