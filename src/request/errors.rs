use std::collections::HashMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::request::response::RawResponse;

/// Structured error body returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorObject {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Failed response without a structured payload.
    #[error("{}", status_line(.0))]
    Http(RawResponse),

    #[error("{}", .payload.error)]
    HttpWithPayload {
        response: RawResponse,
        payload: ErrorObject,
    },

    #[error("Authorization failed: header is missing")]
    MissingAuthHeader,

    #[error("Authorization failed: token is missing")]
    MissingToken,

    /// A status code was reached that nobody registered a handler for.
    #[error("fetch: handler for code {0} is not specified")]
    UnhandledStatus(u16),

    #[error("query function does not provide data")]
    MissingData,

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("encode: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

fn status_line(response: &RawResponse) -> String {
    response.status_text()
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Http(response) => Some(response.status),
            RequestError::HttpWithPayload { response, .. } => Some(response.status),
            RequestError::UnhandledStatus(code) => StatusCode::from_u16(*code).ok(),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&ErrorObject> {
        match self {
            RequestError::HttpWithPayload { payload, .. } => Some(payload),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            RequestError::Http(response) | RequestError::HttpWithPayload { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Label used for the failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::Http(_) => "http",
            RequestError::HttpWithPayload { .. } => "http_payload",
            RequestError::MissingAuthHeader | RequestError::MissingToken => "auth_header",
            RequestError::UnhandledStatus(_) => "unhandled_status",
            RequestError::MissingData => "missing_data",
            RequestError::Transport(_) => "transport",
            RequestError::Decode(_) => "decode",
            RequestError::Encode(_) => "encode",
            RequestError::InvalidHeader(_) => "invalid_header",
        }
    }
}
