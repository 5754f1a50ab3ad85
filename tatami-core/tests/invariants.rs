//! Property-based invariants over arbitrary input streams.
//!
//! Verifies:
//! 1. Cursor bounds: after every byte, `row` is on screen and `col` is at
//!    most the right-margin sentinel
//! 2. Scroll region ordering: `start_row <= end_row < rows` at all times
//! 3. Printable-only streams draw every byte in order
//! 4. Full reset returns the model to its post-construction state and is
//!    idempotent
//! 5. Unknown command sequences never change the model

use proptest::prelude::*;
use tatami_core::{HeadlessDisplay, ResponseBuffer, Terminal};

fn term() -> Terminal<HeadlessDisplay, ResponseBuffer> {
    Terminal::new(HeadlessDisplay::vt100(), ResponseBuffer::default())
}

proptest! {
    #[test]
    fn cursor_and_region_stay_in_bounds(bytes in proptest::collection::vec(any::<u8>(), 0..1024)) {
        let mut term = term();
        for &byte in &bytes {
            term.put(byte, 1);
            let screen = term.screen();
            prop_assert!(screen.cursor.row < 24);
            prop_assert!(screen.cursor.col <= 80);
            prop_assert!(screen.region.start_row <= screen.region.end_row);
            prop_assert!(screen.region.end_row < 24);
        }
    }

    #[test]
    fn printable_stream_draws_in_order(text in "[!-~]{1,79}") {
        let mut term = term();
        term.put_str(&text);
        prop_assert_eq!(term.screen().cursor.col as usize, text.len());
        prop_assert_eq!(term.screen().cursor.row, 0);
        prop_assert_eq!(term.display().row_text(0), text);
    }

    #[test]
    fn reset_is_idempotent(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let pristine = term().screen().clone();

        let mut term = term();
        term.write(&bytes);
        // the random prefix may end inside a sequence that would swallow
        // the ESC; drop it the way an embedder would between streams
        term.interrupt();
        term.put_str("\x1bc");
        prop_assert_eq!(term.screen(), &pristine);

        term.put_str("\x1bc");
        prop_assert_eq!(term.screen(), &pristine);
    }

    #[test]
    fn unknown_csi_finals_leave_the_model_unchanged(
        a in 0u16..10000,
        b in 0u16..10000,
        letter in proptest::sample::select(vec![b'Q', b'R', b'S', b'T', b'V', b'W', b'z', b'q', b'~']),
    ) {
        let mut term = term();
        term.put_str("\x1b[7;31H\x1b[34;47m");
        let before = term.screen().clone();

        term.write(format!("\x1b[{a};{b}").as_bytes());
        term.put(letter, 1);
        prop_assert_eq!(term.screen(), &before);
    }
}
