pub mod config;
pub mod reqwest;
