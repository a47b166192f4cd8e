use http::header::AUTHORIZATION;
use http::HeaderMap;

use crate::request::errors::RequestError;
use crate::utils::constants::AUTHORIZATION_HEADER;

/// Extract `<token>` from an `Authorization: <scheme> <token>` value.
pub fn token_from_header(auth_header: Option<&str>) -> Result<String, RequestError> {
    let auth_header = auth_header
        .filter(|value| !value.is_empty())
        .ok_or(RequestError::MissingAuthHeader)?;

    auth_header
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or(RequestError::MissingToken)
}

/// Same as [`token_from_header`], reading the header out of a response.
pub fn token_from_headers(headers: &HeaderMap) -> Result<String, RequestError> {
    let value = headers
        .get(AUTHORIZATION)
        .map(|value| value.to_str())
        .transpose()
        .map_err(|e| RequestError::InvalidHeader(format!("{}: {}", AUTHORIZATION_HEADER, e)))?;
    token_from_header(value)
}
