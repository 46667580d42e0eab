pub mod archive;
pub mod cli;
pub mod config;
pub mod errors;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod server;
pub mod service;
