pub mod accounts;
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod local_state;
pub mod logging;
pub mod ui;
