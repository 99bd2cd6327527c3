// fluxcache - offline-first caching front for the fluxlove portfolio
// Author: kelexine (https://github.com/kelexine)

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod network;
pub mod router;
pub mod server;
pub mod utils;
