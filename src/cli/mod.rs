//! Command-line interface module.

mod args;
pub mod hash;
pub mod inject;

pub use args::{Cli, Commands, InjectArgs};
