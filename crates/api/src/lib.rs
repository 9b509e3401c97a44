//! HTTP API: routing, request binding, and the server bootstrap.

pub mod app;
pub mod cli;
pub mod middleware;
pub mod server;
