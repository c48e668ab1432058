//! ShareLocal Marketplace Server
//!
//! A Rust implementation of the ShareLocal item-sharing marketplace,
//! providing a REST JSON API for listing items, browsing the catalog,
//! and managing item requests between neighbours.

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
