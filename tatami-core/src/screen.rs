//! The mutable screen state.
//!
//! Everything the command executor reads or writes between input bytes
//! lives here: cursor and saved cursor, the scroll region, mode flags,
//! current colors, and the cell/pixel metrics cached from the display at
//! reset. The record is plain data; all drawing goes through the
//! executor.

use serde::{Deserialize, Serialize};

use crate::color::Rgb565;

/// A cell position. `(0, 0)` is the top-left corner.
///
/// `col` may equal the column count: that is the right-margin sentinel the
/// cursor pins to when wrap mode is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pos {
    pub col: u16,
    pub row: u16,
}

/// The inclusive row band that participates in vertical scrolling. Rows
/// outside the band are static.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub start_row: u16,
    pub end_row: u16,
}

impl ScrollRegion {
    pub fn new(start_row: u16, end_row: u16) -> Self {
        ScrollRegion { start_row, end_row }
    }

    pub fn full(rows: u16) -> Self {
        ScrollRegion {
            start_row: 0,
            end_row: rows.saturating_sub(1),
        }
    }

    pub fn contains(&self, row: u16) -> bool {
        row >= self.start_row && row <= self.end_row
    }

    pub fn height(&self) -> u16 {
        self.end_row - self.start_row + 1
    }
}

/// Terminal mode flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modes {
    /// Writing past the right margin wraps to the next line. Off: the
    /// cursor pins to the right-margin sentinel instead.
    pub cursor_wrap: bool,
    /// Reserved; no command reads or writes it.
    pub scroll_mode: bool,
    /// Cursor addressing is relative to the top of the scroll region.
    pub origin_mode: bool,
}

/// Cell and pixel geometry cached from the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub char_width: u8,
    pub char_height: u8,
    pub screen_width: u16,
    pub screen_height: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Metrics {
    pub fn new(char_width: u8, char_height: u8, screen_width: u16, screen_height: u16) -> Self {
        let char_width = char_width.max(1);
        let char_height = char_height.max(1);
        Metrics {
            char_width,
            char_height,
            screen_width,
            screen_height,
            cols: screen_width / u16::from(char_width),
            rows: screen_height / u16::from(char_height),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    pub cursor: Pos,
    pub saved_cursor: Pos,
    pub region: ScrollRegion,
    pub modes: Modes,
    pub front: Rgb565,
    pub back: Rgb565,
    pub metrics: Metrics,
}

impl Screen {
    pub fn new(metrics: Metrics) -> Self {
        Screen {
            cursor: Pos::default(),
            saved_cursor: Pos::default(),
            region: ScrollRegion::full(metrics.rows),
            modes: Modes::default(),
            front: Rgb565::WHITE,
            back: Rgb565::BLACK,
            metrics,
        }
    }

    pub fn cols(&self) -> u16 {
        self.metrics.cols
    }

    pub fn rows(&self) -> u16 {
        self.metrics.rows
    }

    /// Pixel x of a column.
    pub fn px_x(&self, col: u16) -> u16 {
        col * u16::from(self.metrics.char_width)
    }

    /// Pixel y of a row.
    pub fn px_y(&self, row: u16) -> u16 {
        row * u16::from(self.metrics.char_height)
    }

    pub fn reset_region(&mut self) {
        self.region = ScrollRegion::full(self.metrics.rows);
    }
}
