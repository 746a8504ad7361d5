//! View components for the TUI

pub mod habits;
pub mod tree;
