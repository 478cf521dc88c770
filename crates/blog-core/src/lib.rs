//! # Blogicum Core
//!
//! The domain layer of the Blogicum backend.
//! Entities, visibility and authorship rules, and the ports the infrastructure
//! implements. No database or HTTP dependencies live here.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod query;
pub mod service;

pub use error::{DomainError, RepoError};
pub use service::BlogService;
