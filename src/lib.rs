//! Appointment booking backend.
//!
//! Two record types, [`models::user::User`] and [`models::consulta::Consulta`],
//! their stores, and an HTTP bootstrap serving two static pages.

pub mod config;
pub mod context;
pub mod controllers;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod server;

pub use config::Config;
pub use context::ApiContext;
pub use error::{AppError, AppResult, ValidationError};
