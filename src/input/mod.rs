mod account;
mod config;

pub mod toml_input;

pub use account::*;
pub use config::*;
