//! Tatami terminal core.
//!
//! This crate provides the screen-state half of the terminal emulator:
//! - Cursor, saved cursor, scroll region, colors, and mode flags
//! - Command execution for the sequences the parser recognizes
//! - The writer that turns printable bytes into display draws
//! - Public byte-feeding entry points on [`Terminal`]
//!
//! Rendering and host responses go through two narrow capability traits
//! ([`Display`] and [`ResponseSink`]); the crate has no I/O of its own and
//! can be driven headlessly for testing via [`headless`].

pub mod color;
pub mod display;
pub mod headless;
pub mod screen;
pub mod terminal;

mod performer;

pub use color::Rgb565;
pub use display::{Display, ResponseSink};
pub use headless::{HeadlessDisplay, ResponseBuffer};
pub use screen::{Metrics, Modes, Pos, Screen, ScrollRegion};
pub use terminal::Terminal;
