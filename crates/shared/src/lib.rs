//! Shared types, auth claims, and configuration for Arta.
//!
//! This crate provides common types used across all other crates:
//! - JWT claims and token validation
//! - Pagination types for list endpoints
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, LedgerConfig};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{PageRequest, PageResponse};
