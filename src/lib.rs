pub mod cli;
pub mod command;
pub mod config;
pub mod disk;
pub mod error;
pub mod executor;
pub mod session;
pub mod signal_handler;
pub mod types;
pub mod ui;
pub mod util;
pub mod wizard;
