use reqwest::Client;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::request::errors::RequestError;
use crate::request::response::RawResponse;
use crate::session::Session;
use crate::token::header::token_from_headers;
use crate::token::validator::is_token_valid;
use crate::utils::constants::ACCEPT_LANGUAGE_HEADER;

static SUCCESS_MSG: &str = "success";
static ERROR_MSG: &str = "error";
static REUSED_MSG: &str = "reused";

/// Keeps the session's bearer token usable, refreshing it when missing or expired.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    client: Client,
    refresh_url: String,
    default_lang: String,
    session: Session,
}

impl TokenRefresher {
    pub fn new(
        client: Client,
        refresh_url: impl Into<String>,
        default_lang: impl Into<String>,
        session: Session,
    ) -> Self {
        Self {
            client,
            refresh_url: refresh_url.into(),
            default_lang: default_lang.into(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Return a token that is valid right now.
    ///
    /// The stored token is returned as is when it still validates. Otherwise
    /// the refresh endpoint is called once, and with single flight enabled
    /// concurrent callers wait for that call and reuse its token.
    pub async fn get_fresh_token(&self) -> Result<String, RequestError> {
        if let Some(token) = self.valid_stored_token().await {
            return Ok(token);
        }

        if !self.session.single_flight() {
            return self.refresh().await;
        }

        let _guard = self.session.refresh_guard().lock().await;
        // another caller may have refreshed while we waited
        if let Some(token) = self.valid_stored_token().await {
            debug!("token refreshed by a concurrent caller");
            get_metrics().await.token_refreshes.with_label_values(&[REUSED_MSG]).inc();
            return Ok(token);
        }
        self.refresh().await
    }

    /// Call the refresh endpoint unconditionally and store the returned token.
    pub async fn refresh(&self) -> Result<String, RequestError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        info!("refreshing token at {}", self.refresh_url);

        let result = self.request_new_token().await;
        metrics
            .request_duration
            .with_label_values(&["POST"])
            .observe(start.elapsed().as_secs_f64());

        match result {
            Ok(token) => {
                self.session.store().set(token.clone()).await;
                metrics.token_refreshes.with_label_values(&[SUCCESS_MSG]).inc();
                debug!("token refreshed");
                Ok(token)
            }
            Err(e) => {
                metrics.token_refreshes.with_label_values(&[ERROR_MSG]).inc();
                metrics.request_failures.with_label_values(&[e.reason()]).inc();
                warn!(error = %e, "token refresh failed");
                Err(e)
            }
        }
    }

    async fn request_new_token(&self) -> Result<String, RequestError> {
        let response = self
            .client
            .post(&self.refresh_url)
            .header(ACCEPT_LANGUAGE_HEADER, &self.default_lang)
            .json(&json!({}))
            .send()
            .await?;

        let response = RawResponse::read(response).await?;
        get_metrics()
            .await
            .requests
            .with_label_values(&["POST", response.status.as_str()])
            .inc();

        if !response.is_success() {
            return Err(RequestError::Http(response));
        }
        token_from_headers(&response.headers)
    }

    async fn valid_stored_token(&self) -> Option<String> {
        let token = self.session.store().get().await?;
        if is_token_valid(&token) {
            Some(token)
        } else {
            get_metrics().await.token_validation_failures.inc();
            None
        }
    }
}
