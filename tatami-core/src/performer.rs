//! Command execution.
//!
//! Translates parser actions into screen-state changes and display calls.
//! This is where the terminal conventions live: margin clamping, the
//! right-margin sentinel, scroll-region arithmetic, and the partial clear
//! variants.

use log::{debug, trace};

use tatami_parser::{c0, Action, Args};

use crate::color::Rgb565;
use crate::display::{Display, ResponseSink};
use crate::screen::ScrollRegion;
use crate::terminal::Terminal;

/// Reply to `ESC Z` and `CSI c`: "VT100 with no options".
const DEVICE_ATTRIBUTES: &[u8] = b"\x1b[?1;0c";

/// Reply to ENQ.
const ANSWERBACK: &[u8] = b"X";

impl<D: Display, R: ResponseSink> Terminal<D, R> {
    pub(crate) fn perform(&mut self, action: Action) {
        match action {
            Action::Print(ch) => self.put_char(ch),
            Action::Execute(byte) => self.execute(byte),
            Action::Csi { args, final_byte } => self.csi_dispatch(args, final_byte),
            Action::DecMode { args, final_byte } => self.dec_mode(args, final_byte),
            Action::Esc(byte) => self.esc_dispatch(byte),
        }
    }

    /// C0 controls (and DEL) in the ground state.
    fn execute(&mut self, byte: u8) {
        match byte {
            c0::ENQ => self.responses.send_response(ANSWERBACK),
            c0::LF => {
                self.move_cursor(0, 1);
                self.screen.cursor.col = 0;
            }
            c0::CR => self.screen.cursor.col = 0,
            c0::BS => self.move_cursor(-1, 0),
            // DEL rubs out the cell under the cursor; nothing shifts.
            c0::DEL => {
                self.put_char(b' ');
                self.move_cursor(-1, 0);
            }
            c0::HT => {
                let fill = 4 - self.screen.cursor.col % 4;
                for _ in 0..fill {
                    self.put_char(b' ');
                }
            }
            c0::BEL => trace!("bell"),
            // Unknown controls render as hex so a bad stream stays visible.
            _ => self.put_char(byte),
        }
    }

    /// The writer: draw one printable byte at the cursor and advance.
    /// Anything outside `0x20..=0x7E` is expanded to its `0xHH` form.
    fn put_char(&mut self, ch: u8) {
        if !(0x20..=0x7E).contains(&ch) {
            const HEX: &[u8; 16] = b"0123456789ABCDEF";
            self.put_char(b'0');
            self.put_char(b'x');
            self.put_char(HEX[usize::from(ch >> 4)]);
            self.put_char(HEX[usize::from(ch & 0x0F)]);
            return;
        }

        let x = self.screen.px_x(self.screen.cursor.col);
        let y = self.screen.px_y(self.screen.cursor.row);
        self.display.set_front_color(self.screen.front);
        self.display.set_back_color(self.screen.back);
        self.display.draw_char(x, y, ch);

        self.move_cursor(1, 0);
    }

    /// Move the cursor relative to its position, wrapping and scrolling.
    ///
    /// Horizontal overflow converts to vertical movement when wrap mode is
    /// on; otherwise the cursor pins to the right-margin sentinel.
    /// Vertical movement beyond the scroll region pins to the margin and
    /// scrolls the region, clearing the exposed lines.
    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let cols = i32::from(self.screen.metrics.cols).max(1);
        let mut dy = dy;

        let new_col = i32::from(self.screen.cursor.col) + dx;
        if new_col >= cols {
            if self.screen.modes.cursor_wrap {
                dy += new_col / cols;
                self.screen.cursor.col = (new_col % cols) as u16;
            } else {
                self.screen.cursor.col = self.screen.metrics.cols;
            }
        } else if new_col < 0 {
            // Truncating division: a one-column step off the left edge
            // stays on this row and lands on the last column.
            dy += new_col / cols;
            self.screen.cursor.col = (cols - new_col.abs() % cols) as u16;
        } else {
            self.screen.cursor.col = new_col as u16;
        }

        if dy == 0 {
            return;
        }

        let start = i32::from(self.screen.region.start_row);
        let end = i32::from(self.screen.region.end_row);
        let new_row = i32::from(self.screen.cursor.row) + dy;
        if let Ok(row) = u16::try_from(new_row) {
            if self.screen.region.contains(row) {
                self.screen.cursor.row = row;
                return;
            }
        }
        self.screen.cursor.row = if new_row > end { end as u16 } else { start as u16 };

        // lines > 0 scrolls the region up, < 0 down
        let lines = new_row - i32::from(self.screen.cursor.row);
        let chh = i32::from(self.screen.metrics.char_height);
        let top = (start * chh) as u16;
        let bottom = ((end + 1) * chh - 1) as u16;
        let delta = (lines * chh).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
        self.display.scroll(top, bottom, delta);

        if lines > 0 {
            self.clear_rows((end + 1 - lines).max(start), end);
        } else {
            self.clear_rows(start, (start - lines - 1).min(end));
        }
    }

    /// Fill whole rows `first..=last` with black.
    fn clear_rows(&mut self, first: i32, last: i32) {
        let rows = i32::from(self.screen.metrics.rows);
        let first = first.max(0);
        let last = last.min(rows - 1);
        let chh = u16::from(self.screen.metrics.char_height);
        let width = self.screen.metrics.screen_width;
        for row in first..=last {
            self.display
                .fill_rect(0, (row as u16) * chh, width, chh, Rgb565::BLACK);
        }
    }

    fn csi_dispatch(&mut self, args: Args, final_byte: u8) {
        match final_byte {
            // CUU - cursor up, stops at the top margin
            b'A' => {
                let n = i32::from(args.first_or(1));
                let row = i32::from(self.screen.cursor.row) - n;
                self.screen.cursor.row = row.max(i32::from(self.screen.region.start_row)) as u16;
            }

            // CUD - cursor down, stops at the bottom margin
            b'B' => {
                let n = i32::from(args.first_or(1));
                let row = i32::from(self.screen.cursor.row) + n;
                self.screen.cursor.row = row.min(i32::from(self.screen.region.end_row)) as u16;
            }

            // CUF - cursor right, stops at the right-margin sentinel
            b'C' => {
                let n = i32::from(args.first_or(1));
                let col = i32::from(self.screen.cursor.col) + n;
                self.screen.cursor.col = col.min(i32::from(self.screen.metrics.cols)) as u16;
            }

            // CUB - cursor left, stops at column 0
            b'D' => {
                let n = i32::from(args.first_or(1));
                let col = i32::from(self.screen.cursor.col) - n;
                self.screen.cursor.col = col.max(0) as u16;
            }

            // CUP / HVP - absolute move, 1-based arguments
            b'H' | b'f' => {
                self.screen.cursor.col = args.get(1).saturating_sub(1);
                // only the two-argument form carries a row
                self.screen.cursor.row = if args.count() == 2 {
                    args.get(0).saturating_sub(1)
                } else {
                    0
                };

                if self.screen.modes.origin_mode {
                    self.screen.cursor.row = self
                        .screen
                        .cursor
                        .row
                        .saturating_add(self.screen.region.start_row)
                        .min(self.screen.region.end_row);
                }

                let last_col = self.screen.metrics.cols.saturating_sub(1);
                let last_row = self.screen.metrics.rows.saturating_sub(1);
                self.screen.cursor.col = self.screen.cursor.col.min(last_col);
                self.screen.cursor.row = self.screen.cursor.row.min(last_row);
            }

            // ED - erase in display
            b'J' => {
                let row = i32::from(self.screen.cursor.row);
                let rows = i32::from(self.screen.metrics.rows);
                match (args.count(), args.get(0)) {
                    (0, _) | (1, 0) => self.clear_rows(row, rows - 1),
                    (1, 1) => self.clear_rows(0, row),
                    (1, 2) => {
                        self.clear_rows(0, rows - 1);
                        self.screen.reset_region();
                    }
                    _ => {}
                }
            }

            // EL - erase in line, with the current back color
            b'K' => {
                let x = self.screen.px_x(self.screen.cursor.col);
                let y = self.screen.px_y(self.screen.cursor.row);
                let width = self.screen.metrics.screen_width;
                let cw = u16::from(self.screen.metrics.char_width);
                let chh = u16::from(self.screen.metrics.char_height);
                let back = self.screen.back;
                match (args.count(), args.get(0)) {
                    (0, _) | (1, 0) => self.display.fill_rect(x, y, width - x, chh, back),
                    (1, 1) => self.display.fill_rect(0, y, x + cw, chh, back),
                    (1, 2) => self.display.fill_rect(0, y, width, chh, back),
                    _ => {}
                }
            }

            // IL / DL - accepted, nothing moves
            b'L' | b'M' => trace!("insert/delete lines ignored"),

            // DCH - back up and rub out; the line tail does not shift
            b'P' => {
                let n = args.first_or(1);
                self.move_cursor(-i32::from(n), 0);
                for _ in 0..n {
                    self.put_char(b' ');
                }
            }

            // ICH - accepted, nothing moves
            b'@' => trace!("insert characters ignored"),

            // DA - device attributes query
            b'c' => self.responses.send_response(DEVICE_ATTRIBUTES),

            b's' => self.screen.saved_cursor = self.screen.cursor,
            b'u' => self.screen.cursor = self.screen.saved_cursor,

            // SM / RM - ANSI modes; only the DEC-private variants matter here
            b'h' | b'l' => trace!("ANSI mode {:?} ignored", args),

            // TBC, DECREQTPARM, MC, self-test, screen-mode prefix
            b'g' | b'x' | b'i' | b'y' | b'=' => {}

            b'm' => self.sgr(&args),

            // DECSTBM - set scroll region, 1-based inclusive margins
            b'r' => {
                if args.count() == 2 && args.get(0) < args.get(1) {
                    let last = self.screen.metrics.rows.saturating_sub(1);
                    self.screen.region = ScrollRegion::new(
                        args.get(0).saturating_sub(1).min(last),
                        args.get(1).saturating_sub(1).min(last),
                    );
                } else {
                    self.screen.reset_region();
                }
            }

            _ => debug!(
                "unhandled CSI: args={:?} final={:?}",
                args, final_byte as char
            ),
        }
    }

    /// SGR. Arguments are consumed back to front, so with repeated colors
    /// the leftmost one wins.
    fn sgr(&mut self, args: &Args) {
        if args.is_empty() {
            self.screen.front = Rgb565::WHITE;
            self.screen.back = Rgb565::BLACK;
            return;
        }

        let mut k = args.count();
        while k > 0 {
            k -= 1;
            match args.get(k) {
                0 => {
                    self.screen.front = Rgb565::WHITE;
                    self.screen.back = Rgb565::BLACK;
                }
                n @ 30..=37 => {
                    if let Some(color) = Rgb565::from_ansi_index(n - 30) {
                        self.screen.front = color;
                    }
                }
                n @ 40..=47 => {
                    if let Some(color) = Rgb565::from_ansi_index(n - 40) {
                        self.screen.back = color;
                    }
                }
                n => trace!("ignored SGR attribute {n}"),
            }
        }
    }

    /// DEC private modes (`CSI ? Pm h|l`). Only the first argument is
    /// inspected.
    fn dec_mode(&mut self, args: Args, final_byte: u8) {
        let set = match final_byte {
            b'h' => true,
            b'l' => false,
            _ => {
                trace!("DEC sequence {:?} ignored", final_byte as char);
                return;
            }
        };

        match args.get(0) {
            // DECOM - cursor addressing relative to the scroll region
            6 => {
                self.screen.modes.origin_mode = set;
                debug!("origin mode: {set}");
            }
            // DECAWM - wrap at the right margin
            7 => self.screen.modes.cursor_wrap = set,
            // cursor keys, vt52, columns, scroll style, reverse video,
            // auto-repeat, interlace: accepted without effect
            1..=5 | 8 | 9 => {}
            mode => debug!("unhandled DEC private mode {mode} (set={set})"),
        }
    }

    fn esc_dispatch(&mut self, byte: u8) {
        match byte {
            // IND - down one line, scrolling at the bottom margin
            b'D' => self.move_cursor(0, 1),
            // RI - up one line, scrolling at the top margin
            b'M' => self.move_cursor(0, -1),
            // NEL - next line
            b'E' => {
                self.move_cursor(0, 1);
                self.screen.cursor.col = 0;
            }
            b'7' | b's' => self.screen.saved_cursor = self.screen.cursor,
            b'8' | b'u' => self.screen.cursor = self.screen.saved_cursor,
            // DECID - identify terminal
            b'Z' => self.responses.send_response(DEVICE_ATTRIBUTES),
            // RIS - full reset
            b'c' => self.reset(),
            // keypad modes; no keyboard on this side of the wire
            b'=' | b'>' => {}
            // tab set, single shifts, vt52 exit: accepted without effect
            b'H' | b'N' | b'O' | b'<' => {}
            _ => debug!("unhandled ESC final {:?}", byte as char),
        }
    }
}
