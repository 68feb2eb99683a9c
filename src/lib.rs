pub mod app;
pub mod config;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod logging;
pub mod output;
pub mod pacing;
pub mod sasbdb;
pub mod store;
