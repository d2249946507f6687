pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod gateway;
pub mod models;
pub mod services;
pub mod state;
pub mod validation;
pub mod views;
