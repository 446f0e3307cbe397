//! Quartermaster equipment checkout server
//!
//! A REST JSON API where users request and return items grouped by
//! responsibility, managers approve or deny those requests, chiefs run the
//! events that open and close the request windows, and admins manage accounts.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
