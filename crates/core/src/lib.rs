//! Core types and shared functionality for marquee.
//!
//! This crate provides:
//! - Response cache with fingerprinted keys and TTL expiry
//! - The request error taxonomy
//! - Configuration loading and validation
//! - Catalog record types

pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use cache::{Fingerprint, RequestParams, ResponseCache};
pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use models::{Category, ListPage, LoadStatus, Movie, MovieDetails};
