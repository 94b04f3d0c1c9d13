//! Command implementations for the Kiln CLI.

pub mod run;
