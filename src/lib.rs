pub mod accounts;
pub mod app;
pub mod attendance;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod store;
