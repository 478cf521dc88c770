//! # Blogicum Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`:
//! Postgres repositories, an in-memory store, token and password services and
//! a rate limiter.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `minimal` - in-memory store only

pub mod auth;
pub mod database;
pub mod memory;
pub mod rate_limit;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::DatabaseConnections;
pub use memory::InMemoryStore;
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
