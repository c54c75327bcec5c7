pub mod cli;
pub mod config;
pub mod hook;
pub mod http;
pub mod launcher;
pub mod logging;
pub mod package;
pub mod start_command;
pub mod utils;
