//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: handlers decide what to show, these
//! functions decide how it looks.

pub mod progress;
pub mod tables;

pub use tables::{BOLD, CYAN, GREEN, RED, RESET, YELLOW, render_table, separator, truncated, yes_no};
