//! # CLI Layer
//!
//! One UI client for docshelf. This is the only place that parses
//! arguments, prints to the terminal, or decides exit codes.
//!
//! - `run()`: dispatch (called by `main.rs`)
//! - `init_context()`: resolves the data dir, loads config, sets up logging
//! - `handle_*()`: per-command handlers that call `ShelfApi` and print
//! - `print_*()`: output formatting

mod commands;
mod print;
mod setup;

pub use commands::run;
