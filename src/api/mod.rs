//! Typed wrappers over the auth and user endpoints.

pub mod auth;
pub mod client;
pub mod types;
pub mod user;

pub use client::ApiClient;
