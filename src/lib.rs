pub mod cache;
pub mod config;
pub mod espn;
pub mod http_cache;
pub mod http_client;
pub mod identity;
pub mod lineup;
pub mod plays;
pub mod resolver;
pub mod server;
pub mod service;
pub mod snapshot;
