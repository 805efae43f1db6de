pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod server;
pub mod services;
