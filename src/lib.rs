pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod errors;
pub mod format;
pub mod header;
pub mod lineups;
pub mod net;
pub mod render;
pub mod schedule;
pub mod snapshot;
pub mod teams;
pub mod template;
