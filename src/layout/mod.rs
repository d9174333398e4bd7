//! Text layout utilities for positioning content on pages.
//!
//! This module provides the pieces the quotation composer is built from: a
//! greedy word-wrapper driven by font metrics ([`split_into_lines`]), the
//! right-alignment arithmetic used for numeric columns ([`right_align`]),
//! and a vertical [`Cursor`] that tracks the running write position as
//! blocks of text are laid out top to bottom.

mod cursor;
mod margins;
mod text;

pub use cursor::*;
pub use margins::*;
pub use text::*;
