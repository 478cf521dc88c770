//! # Blogicum Shared
//!
//! Request and response types of the HTTP API, free of server dependencies so
//! that clients can reuse them.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
