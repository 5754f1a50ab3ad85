//! VT100 escape sequence parser.
//!
//! This crate turns a stream of 8-bit characters into semantic actions:
//! printable output, C0 controls, and `ESC`-introduced command sequences
//! with their numeric arguments. It knows nothing about screens or
//! cursors; a consumer applies the actions to whatever model it keeps.
//!
//! The parser is designed to:
//! - Handle arbitrary chunk boundaries (streaming)
//! - Be deterministic and allocation-free
//! - Not wedge on malformed input (unknown sequences fall back to ground)

pub mod action;
pub mod args;
pub mod parser;

pub use action::{c0, Action};
pub use args::Args;
pub use parser::Parser;
