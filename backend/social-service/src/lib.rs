pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod logging;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;
pub mod websocket;
