//! Configuration, input handling and run drivers for the `hanoi` binary.

pub mod config;
pub mod input;
pub mod runner;
