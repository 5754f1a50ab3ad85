//! The escape sequence state machine.
//!
//! One state per partially recognized introducer, one `advance` per input
//! byte. A byte either emits an action, extends the argument accumulator,
//! or moves the machine to a sub-state. Unknown sequences abort back to
//! ground without emitting anything, so a hostile stream can glitch the
//! screen but never wedge the parser.

use crate::action::{c0, Action};
use crate::args::Args;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Plain text and C0 controls.
    Ground,
    /// Just saw ESC.
    Escape,
    /// `ESC [`, collecting a command.
    Csi,
    /// `ESC [ ?`, collecting a private mode command.
    DecPrivate,
    /// `ESC #` screen alignment stub; swallows one byte.
    AlignTest,
    /// `ESC (` G0 designate stub; swallows one byte.
    DesignateG0,
    /// `ESC )` G1 designate stub; swallows one byte.
    DesignateG1,
    /// Accumulating a numeric argument for `ret_state`.
    Param,
}

#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Where `Param` returns once a non-digit arrives. Never `Param`.
    ret_state: State,
    args: Args,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            state: State::Ground,
            ret_state: State::Ground,
            args: Args::new(),
        }
    }

    /// Feed a chunk of input. Sequences may span chunk boundaries; the
    /// machine keeps its state between calls.
    pub fn feed<F>(&mut self, input: &[u8], mut callback: F)
    where
        F: FnMut(Action),
    {
        for &byte in input {
            self.advance(byte, &mut callback);
        }
    }

    /// Drop any half-parsed sequence and return to ground. This is the
    /// out-of-band event path: anything that is not a byte of terminal
    /// input (a device reset, a focus change in the embedder) lands here
    /// so a truncated sequence cannot swallow the next stream.
    pub fn interrupt(&mut self) {
        self.state = State::Ground;
        self.ret_state = State::Ground;
    }

    pub fn reset(&mut self) {
        self.interrupt();
        self.args.clear();
    }

    fn advance<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match self.state {
            State::Ground => self.ground(byte, callback),
            State::Escape => self.escape(byte, callback),
            State::Csi => self.csi(byte, callback),
            State::DecPrivate => self.dec_private(byte, callback),
            State::AlignTest | State::DesignateG0 | State::DesignateG1 => {
                // One-byte stubs: the designated charset / alignment test
                // byte is consumed without effect.
                self.state = State::Ground;
            }
            State::Param => self.param(byte, callback),
        }
    }

    fn ground<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            c0::ESC => self.state = State::Escape,
            0x20..=0x7E | 0x80..=0xFF => callback(Action::Print(byte)),
            _ => callback(Action::Execute(byte)),
        }
    }

    fn escape<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'[' => {
                self.args.clear();
                self.state = State::Csi;
            }
            b'(' => {
                self.args.clear();
                self.state = State::DesignateG0;
            }
            b')' => {
                self.args.clear();
                self.state = State::DesignateG1;
            }
            b'#' => {
                self.args.clear();
                self.state = State::AlignTest;
            }
            // DCS introducer: payloads are unsupported, swallow the one
            // byte that follows.
            b'P' => self.state = State::DesignateG0,
            // A second ESC restarts the sequence.
            c0::ESC => {}
            _ => {
                callback(Action::Esc(byte));
                self.state = State::Ground;
            }
        }
    }

    fn csi<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'0'..=b'9' => {
                self.args.add_digit(byte);
                self.ret_state = State::Csi;
                self.state = State::Param;
            }
            // Separator before any digit: skip, stay in the command state.
            b';' => {}
            b'?' => self.state = State::DecPrivate,
            _ => {
                callback(Action::Csi {
                    args: self.args,
                    final_byte: byte,
                });
                self.state = State::Ground;
            }
        }
    }

    fn dec_private<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'0'..=b'9' => {
                self.args.add_digit(byte);
                self.ret_state = State::DecPrivate;
                self.state = State::Param;
            }
            b';' => {}
            _ => {
                callback(Action::DecMode {
                    args: self.args,
                    final_byte: byte,
                });
                self.state = State::Ground;
            }
        }
    }

    fn param<F>(&mut self, byte: u8, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match byte {
            b'0'..=b'9' => self.args.add_digit(byte),
            b';' => self.args.advance(),
            _ => {
                // The terminating byte closes the argument, then belongs to
                // the host state: hand it back for a second dispatch.
                self.args.advance();
                debug_assert!(self.ret_state != State::Param);
                self.state = self.ret_state;
                self.ret_state = State::Ground;
                self.advance(byte, callback);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(input: &[u8]) -> Vec<Action> {
        let mut parser = Parser::new();
        let mut actions = Vec::new();
        parser.feed(input, |action| actions.push(action));
        actions
    }

    #[test]
    fn print_ascii() {
        let actions = parse_all(b"Hello");
        assert_eq!(actions.len(), 5);
        assert_eq!(actions[0], Action::Print(b'H'));
        assert_eq!(actions[4], Action::Print(b'o'));
    }

    #[test]
    fn control_characters_execute() {
        let actions = parse_all(b"\x07\x08\x0A\x0D\x7F");
        assert_eq!(
            actions,
            vec![
                Action::Execute(0x07),
                Action::Execute(0x08),
                Action::Execute(0x0A),
                Action::Execute(0x0D),
                Action::Execute(0x7F),
            ]
        );
    }

    #[test]
    fn high_bytes_go_to_the_writer() {
        assert_eq!(parse_all(b"\x80"), vec![Action::Print(0x80)]);
    }

    #[test]
    fn csi_with_one_argument() {
        let actions = parse_all(b"\x1b[5A");
        assert_eq!(actions.len(), 1);
        let Action::Csi { args, final_byte } = actions[0] else {
            panic!("expected Csi, got {:?}", actions[0]);
        };
        assert_eq!(final_byte, b'A');
        assert_eq!(args.count(), 1);
        assert_eq!(args.get(0), 5);
    }

    #[test]
    fn csi_bare_command_has_no_arguments() {
        let actions = parse_all(b"\x1b[A");
        let Action::Csi { args, .. } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(args.count(), 0);
    }

    #[test]
    fn csi_two_arguments() {
        let actions = parse_all(b"\x1b[10;20H");
        let Action::Csi { args, final_byte } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(final_byte, b'H');
        assert_eq!(args.count(), 2);
        assert_eq!(args.get(0), 10);
        assert_eq!(args.get(1), 20);
    }

    #[test]
    fn leading_separator_is_skipped() {
        // A `;` before any digit never opens a slot.
        let actions = parse_all(b"\x1b[;H");
        let Action::Csi { args, final_byte } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(final_byte, b'H');
        assert_eq!(args.count(), 0);
    }

    #[test]
    fn trailing_separator_counts_an_empty_slot() {
        let actions = parse_all(b"\x1b[1;m");
        let Action::Csi { args, .. } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(args.count(), 2);
        assert_eq!(args.get(0), 1);
        assert_eq!(args.get(1), 0);
    }

    #[test]
    fn dec_private_mode() {
        let actions = parse_all(b"\x1b[?7h");
        assert_eq!(actions.len(), 1);
        let Action::DecMode { args, final_byte } = actions[0] else {
            panic!("expected DecMode, got {:?}", actions[0]);
        };
        assert_eq!(final_byte, b'h');
        assert_eq!(args.count(), 1);
        assert_eq!(args.get(0), 7);
    }

    #[test]
    fn esc_dispatch() {
        assert_eq!(parse_all(b"\x1b7"), vec![Action::Esc(b'7')]);
    }

    #[test]
    fn double_escape_restarts() {
        assert_eq!(parse_all(b"\x1b\x1bM"), vec![Action::Esc(b'M')]);
    }

    #[test]
    fn designate_states_swallow_one_byte() {
        assert_eq!(parse_all(b"\x1b(B"), vec![]);
        assert_eq!(parse_all(b"\x1b)0A"), vec![Action::Print(b'A')]);
        assert_eq!(parse_all(b"\x1b#8"), vec![]);
    }

    #[test]
    fn dcs_swallows_one_byte() {
        assert_eq!(parse_all(b"\x1bPqA"), vec![Action::Print(b'A')]);
    }

    #[test]
    fn chunk_boundaries() {
        let mut parser = Parser::new();
        let mut actions = Vec::new();

        parser.feed(b"\x1b[", |a| actions.push(a));
        assert!(actions.is_empty());

        parser.feed(b"5", |a| actions.push(a));
        assert!(actions.is_empty());

        parser.feed(b"A", |a| actions.push(a));
        assert_eq!(actions.len(), 1);
        let Action::Csi { args, final_byte } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(final_byte, b'A');
        assert_eq!(args.get(0), 5);
    }

    #[test]
    fn interrupt_drops_half_parsed_sequence() {
        let mut parser = Parser::new();
        let mut actions = Vec::new();

        parser.feed(b"\x1b[1", |a| actions.push(a));
        parser.interrupt();
        parser.feed(b"2", |a| actions.push(a));

        assert_eq!(actions, vec![Action::Print(b'2')]);
    }

    #[test]
    fn arguments_saturate_at_four() {
        let actions = parse_all(b"\x1b[1;2;3;4;5;6H");
        let Action::Csi { args, .. } = actions[0] else {
            panic!("expected Csi");
        };
        assert_eq!(args.count(), 4);
        assert_eq!(args.get(0), 1);
        assert_eq!(args.get(3), 4);
    }

    #[test]
    fn unknown_terminator_still_dispatches() {
        // The consumer decides what is a known command; the machine only
        // guarantees it is back at ground afterwards.
        let actions = parse_all(b"\x1b[QX");
        assert_eq!(actions.len(), 2);
        assert!(actions[0].is_csi());
        assert_eq!(actions[1], Action::Print(b'X'));
    }
}
