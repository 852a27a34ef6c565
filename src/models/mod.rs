//! View-side data types.
//!
//! - [`OutputLine`] - A line in the terminal scrollback

mod terminal;

pub use terminal::{OutputLine, OutputLineData};
