//! Terminal output for the command-line search

pub mod search_display;
pub mod theme;
