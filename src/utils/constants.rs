//! Shared constants and invariants

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_LANG: &str = "en-US";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const ACCEPT_LANGUAGE_HEADER: &str = "Accept-Language";
