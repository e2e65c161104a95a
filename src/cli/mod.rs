pub mod commands;
pub mod global;

pub use global::{CommandLineArgs, GlobalArgs};
