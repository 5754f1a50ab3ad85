//! The terminal: parser, screen state, and capabilities glued together.
//!
//! A [`Terminal`] owns its display and response sink (lend `&mut`
//! borrows through the blanket trait impls to keep ownership outside).
//! Every entry point is synchronous: all draws and responses caused by the
//! injected bytes complete before the call returns.

use std::fmt;

use tatami_parser::Parser;

use crate::display::{Display, ResponseSink};
use crate::screen::{Metrics, Screen};

pub struct Terminal<D: Display, R: ResponseSink> {
    pub(crate) screen: Screen,
    pub(crate) parser: Parser,
    pub(crate) display: D,
    pub(crate) responses: R,
}

impl<D: Display, R: ResponseSink> Terminal<D, R> {
    /// Build a terminal over the given capabilities and reset it.
    pub fn new(display: D, responses: R) -> Self {
        let mut term = Terminal {
            screen: Screen::new(Metrics::default()),
            parser: Parser::new(),
            display,
            responses,
        };
        term.reset();
        term
    }

    /// Return to the power-on state: re-read the display metrics, restore
    /// default colors and modes, home the cursor, and drop any half-parsed
    /// sequence. The screen contents are left alone.
    pub fn reset(&mut self) {
        let metrics = Metrics::new(
            self.display.char_width(),
            self.display.char_height(),
            self.display.width(),
            self.display.height(),
        );
        self.screen = Screen::new(metrics);
        self.parser.reset();
        self.display.set_front_color(self.screen.front);
        self.display.set_back_color(self.screen.back);
    }

    /// Inject one byte `count` times.
    pub fn put(&mut self, ch: u8, count: usize) {
        for _ in 0..count {
            self.advance(ch);
        }
    }

    /// Inject every byte of `s` in order.
    pub fn put_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Inject a buffer of bytes in order; returns the number consumed
    /// (always the whole buffer).
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        for &byte in bytes {
            self.advance(byte);
        }
        bytes.len()
    }

    /// Format through a fixed 256-byte staging buffer and inject the
    /// result. Output past 255 bytes is truncated.
    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> usize {
        let mut staging = StagingBuffer::default();
        let _ = fmt::write(&mut staging, args);
        self.write(staging.as_bytes())
    }

    /// Out-of-band event: drop any half-parsed escape sequence.
    pub fn interrupt(&mut self) {
        self.parser.interrupt();
    }

    pub fn cols(&self) -> u16 {
        self.screen.cols()
    }

    pub fn rows(&self) -> u16 {
        self.screen.rows()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn responses(&self) -> &R {
        &self.responses
    }

    pub fn responses_mut(&mut self) -> &mut R {
        &mut self.responses
    }

    fn advance(&mut self, byte: u8) {
        // The parser borrows apart from the rest of the terminal so its
        // callback can mutate screen and display.
        let mut parser = std::mem::take(&mut self.parser);
        parser.feed(&[byte], |action| self.perform(action));
        self.parser = parser;
    }
}

impl<D: Display, R: ResponseSink> fmt::Write for Terminal<D, R> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

/// Fixed-capacity buffer backing [`Terminal::print_fmt`].
struct StagingBuffer {
    buf: [u8; 256],
    len: usize,
}

impl Default for StagingBuffer {
    fn default() -> Self {
        StagingBuffer {
            buf: [0; 256],
            len: 0,
        }
    }
}

impl StagingBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl fmt::Write for StagingBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for &byte in s.as_bytes() {
            if self.len >= self.buf.len() - 1 {
                break;
            }
            self.buf[self.len] = byte;
            self.len += 1;
        }
        Ok(())
    }
}
