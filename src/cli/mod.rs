//! CLI module
//!
//! Command-line interface over the pager and the one-shot calls.
//!
//! # Commands
//!
//! - `shots` - Page through a shot feed, optionally saving the pager
//! - `resume` - Continue a saved pager
//! - `shot`, `comments` - Shot detail and its comments
//! - `player`, `followers`, `following`, `draftees` - Player resources

mod commands;
mod runner;

pub use commands::{Cli, Commands, MergeMode, OutputFormat, PagingArgs};
pub use runner::Runner;
