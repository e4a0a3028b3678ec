pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod export;
pub mod import;
pub mod models;
pub mod query;
pub mod seed;
pub mod server;
pub mod services;
