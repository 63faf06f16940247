//! Terminal Cell
//!
//! Represents a single cell in the framebuffer grid: the character(s) it
//! shows, its display width and the rendition it is drawn with.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character(s) in this cell. Empty for blank cells and for the
    /// placeholder half of a wide character; holds several code points
    /// when combining marks are attached.
    pub content: String,
    /// Display width: 1 for ordinary cells, 2 for the leading half of a
    /// wide character, 0 for the placeholder that follows it.
    pub width: u8,
    /// Colors and style flags
    pub rendition: Rendition,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: String::new(),
            width: 1,
            rendition: Rendition::default(),
        }
    }
}

impl Cell {
    /// Create a new cell with a single character
    pub fn new(c: char) -> Self {
        Self {
            content: c.to_string(),
            ..Default::default()
        }
    }

    /// A blank cell carrying only a background color, as produced by erase
    /// operations on a back-color-erase terminal.
    pub fn blank(bg: Color) -> Self {
        Self {
            content: String::new(),
            width: 1,
            rendition: Rendition::with_background(bg),
        }
    }

    /// The trailing half of a wide character
    pub fn placeholder(rendition: Rendition) -> Self {
        Self {
            content: String::new(),
            width: 0,
            rendition,
        }
    }

    /// Check if this cell is empty (no content)
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_wide(&self) -> bool {
        self.width == 2
    }

    pub fn is_placeholder(&self) -> bool {
        self.width == 0
    }

    /// A cell that looks like nothing but its background: no glyph (or a
    /// plain space) and no style flag that would paint the empty area.
    pub fn is_blank(&self) -> bool {
        self.width == 1
            && (self.content.is_empty() || self.content == " ")
            && self.rendition.style == Style::default()
    }

    /// Compare what a viewer would see. Blank cells are equal when their
    /// backgrounds match, whatever their foreground or glyph (empty or space);
    /// otherwise an empty cell looks the same as one holding a space.
    pub fn visibly_equal(&self, other: &Cell) -> bool {
        if self.is_blank() && other.is_blank() {
            return self.rendition.bg == other.rendition.bg;
        }
        self.width == other.width
            && self.rendition == other.rendition
            && self.display_text() == other.display_text()
    }

    /// Reset to a blank cell with the given background
    pub fn erase(&mut self, bg: Color) {
        self.content.clear();
        self.width = 1;
        self.rendition = Rendition::with_background(bg);
    }

    /// Text used when dumping the grid: blanks become spaces, placeholders
    /// contribute nothing.
    pub fn display_text(&self) -> &str {
        if self.is_placeholder() {
            ""
        } else if self.content.is_empty() {
            " "
        } else {
            &self.content
        }
    }
}

/// Color representation supporting indexed and RGB colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Append the SGR parameters selecting this color. `base` is 30 for
    /// foreground and 40 for background.
    fn push_sgr(&self, base: u16, out: &mut String) {
        use std::fmt::Write;

        // Writing into a String cannot fail.
        let _ = match *self {
            Color::Default => write!(out, ";{}", base + 9),
            Color::Indexed(i) if i < 8 => write!(out, ";{}", base + i as u16),
            Color::Indexed(i) if i < 16 => write!(out, ";{}", base + 60 + (i - 8) as u16),
            Color::Indexed(i) => write!(out, ";{};5;{}", base + 8, i),
            Color::Rgb(r, g, b) => write!(out, ";{};2;{};{};{}", base + 8, r, g, b),
        };
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The complete set of visual attributes applied to a cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendition {
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Rendition {
    pub fn with_background(bg: Color) -> Self {
        Self {
            bg,
            ..Default::default()
        }
    }

    /// The absolute SGR sequence selecting this rendition, always starting
    /// from a reset so the result does not depend on the terminal's prior
    /// state.
    pub fn sgr(&self) -> String {
        let mut out = String::from("\x1b[0");
        let flags = [
            (self.style.bold, ";1"),
            (self.style.faint, ";2"),
            (self.style.italic, ";3"),
            (self.style.underline, ";4"),
            (self.style.blink, ";5"),
            (self.style.inverse, ";7"),
            (self.style.hidden, ";8"),
            (self.style.strikethrough, ";9"),
        ];
        for (on, code) in flags {
            if on {
                out.push_str(code);
            }
        }
        if self.fg != Color::Default {
            self.fg.push_sgr(30, &mut out);
        }
        if self.bg != Color::Default {
            self.bg.push_sgr(40, &mut out);
        }
        out.push('m');
        out
    }
}
