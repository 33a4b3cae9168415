//! 命令行交互模块

mod commands;

pub use commands::{help_text, CommandResult, Session};
