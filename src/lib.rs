//! Library crate root re-exporting the runner, configuration, and CLI modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod config;
pub mod runner;
