//! Cinemood: emotion-driven movie recommendations over HTTP.
//!
//! Free text is classified into an emotion, the emotion is mapped to genres,
//! and movies are picked from an in-memory genre index built at startup from a
//! CSV snapshot or a Firestore collection.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
