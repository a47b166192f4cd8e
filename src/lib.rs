//! # Bearer Client Library
//!
//! Authenticated HTTP client for the travel API. Keeps a bearer token
//! fresh, attaches it to outgoing requests and routes each response to
//! the handler registered for its status code.
//!
//! Modules:
//! - `config`: client configuration, loading and validation
//! - `session`: token store and per-client session context
//! - `token`: JWT validity checks, header parsing and refresh
//! - `request`: request dispatch, status code handlers and errors
//! - `api`: typed auth and user endpoints

pub mod api;
pub mod config;
pub mod helpers;
pub mod observability;
pub mod request;
pub mod session;
pub mod token;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::api::ApiClient;
pub use crate::config::settings::ClientConfig;
pub use crate::request::{Dispatcher, RequestArgs, RequestError};
pub use crate::session::{Session, TokenStore};
