use std::sync::Arc;
use std::time::Duration;

use http::header::ACCEPT_LANGUAGE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::settings::SettingsConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::request::errors::RequestError;
use crate::request::handlers::{Expect, Handler, HandlerRegistry};
use crate::request::response::RawResponse;
use crate::session::Session;
use crate::token::TokenRefresher;

pub type UrlFn<Req> = Arc<dyn Fn(&Req) -> String + Send + Sync>;

/// Request target, fixed or built from the call data.
pub enum Url<Req> {
    Literal(String),
    FromData(UrlFn<Req>),
}

impl<Req> Url<Req> {
    pub fn from_data<F>(build: F) -> Self
    where
        F: Fn(&Req) -> String + Send + Sync + 'static,
    {
        Url::FromData(Arc::new(build))
    }

    fn resolve(&self, data: Option<&Req>) -> Result<String, RequestError> {
        match self {
            Url::Literal(url) => Ok(url.clone()),
            Url::FromData(build) => data.map(|data| build(data)).ok_or(RequestError::MissingData),
        }
    }
}

impl<Req> From<&str> for Url<Req> {
    fn from(url: &str) -> Self {
        Url::Literal(url.to_owned())
    }
}

impl<Req> From<String> for Url<Req> {
    fn from(url: String) -> Self {
        Url::Literal(url)
    }
}

/// Per request configuration consumed by [`Dispatcher::create_request`].
pub struct RequestArgs<Res, Req = ()> {
    url: Url<Req>,
    method: Method,
    lang: Option<String>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    success: Vec<Expect<Res>>,
    errors: Vec<Expect<Res>>,
    anonymous: bool,
}

impl<Res, Req> RequestArgs<Res, Req> {
    pub fn new(url: impl Into<Url<Req>>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            lang: None,
            headers: Vec::new(),
            body: None,
            success: Vec::new(),
            errors: Vec::new(),
            anonymous: false,
        }
    }

    pub fn url(mut self, url: impl Into<Url<Req>>) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Fixed JSON body, sent on every call instead of the call data.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn handle_success_codes(mut self, codes: &[u16]) -> Self {
        self.success.extend(codes.iter().map(|code| Expect::Code(*code)));
        self
    }

    pub fn handle_success_with(mut self, code: u16, handler: Handler<Res>) -> Self {
        self.success.push(Expect::With(code, handler));
        self
    }

    pub fn handle_error_codes(mut self, codes: &[u16]) -> Self {
        self.errors.extend(codes.iter().map(|code| Expect::Code(*code)));
        self
    }

    pub fn handle_error_with(mut self, code: u16, handler: Handler<Res>) -> Self {
        self.errors.push(Expect::With(code, handler));
        self
    }

    /// Send without a bearer token.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// Sends requests on behalf of one session.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: Client,
    base_url: String,
    default_lang: String,
    refresher: TokenRefresher,
}

impl Dispatcher {
    pub fn new(settings: &SettingsConfig, session: Session) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms()))
            .build()?;
        Ok(Self::from_parts(
            client,
            &settings.base_url,
            &settings.default_lang,
            &settings.refresh.path,
            session,
        ))
    }

    pub fn from_parts(
        client: Client,
        base_url: &str,
        default_lang: &str,
        refresh_path: &str,
        session: Session,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let refresher = TokenRefresher::new(
            client.clone(),
            join_url(&base_url, refresh_path),
            default_lang,
            session,
        );
        Self {
            client,
            base_url,
            default_lang: default_lang.to_owned(),
            refresher,
        }
    }

    pub fn session(&self) -> &Session {
        self.refresher.session()
    }

    pub fn refresher(&self) -> &TokenRefresher {
        &self.refresher
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    pub fn create_request<Res, Req>(&self, args: RequestArgs<Res, Req>) -> Result<PreparedRequest<Res, Req>, RequestError> {
        let mut headers = HeaderMap::new();
        let lang = args.lang.unwrap_or_else(|| self.default_lang.clone());
        headers.insert(ACCEPT_LANGUAGE, header_value(&lang)?);
        for (name, value) in &args.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RequestError::InvalidHeader(format!("{}: {}", name, e)))?;
            headers.insert(name, header_value(value)?);
        }

        let handlers = HandlerRegistry::build(&args.method, &args.success, &args.errors);
        Ok(PreparedRequest {
            dispatcher: self.clone(),
            url: args.url,
            method: args.method,
            headers,
            body: args.body,
            anonymous: args.anonymous,
            handlers,
        })
    }

    fn absolute_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_owned()
        } else {
            join_url(&self.base_url, url)
        }
    }
}

/// A request ready to be sent any number of times.
pub struct PreparedRequest<Res, Req = ()> {
    dispatcher: Dispatcher,
    url: Url<Req>,
    method: Method,
    headers: HeaderMap,
    body: Option<Value>,
    anonymous: bool,
    handlers: HandlerRegistry<Res>,
}

impl<Res, Req> PreparedRequest<Res, Req>
where
    Res: DeserializeOwned,
    Req: Serialize,
{
    /// Send one request.
    ///
    /// `data` feeds the URL builder when the URL is not a literal, otherwise
    /// it becomes the JSON body unless a fixed body was configured.
    pub async fn call(&self, data: Option<&Req>) -> Result<Res, RequestError> {
        let metrics = get_metrics().await;
        let result = self.execute(data).await;
        if let Err(e) = &result {
            metrics.request_failures.with_label_values(&[e.reason()]).inc();
            debug!(method = %self.method, error = %e, "request failed");
        }
        result
    }

    pub async fn send(&self) -> Result<Res, RequestError> {
        self.call(None).await
    }

    async fn execute(&self, data: Option<&Req>) -> Result<Res, RequestError> {
        let url = self.dispatcher.absolute_url(&self.url.resolve(data)?);
        let body = self.resolve_body(data)?;

        let mut request = self
            .dispatcher
            .client
            .request(self.method.clone(), &url)
            .headers(self.headers.clone());

        if !self.anonymous {
            let token = self.dispatcher.refresher.get_fresh_token().await?;
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let metrics = get_metrics().await;
        let start = get_instant();
        debug!(method = %self.method, url = %url, "sending request");
        let result = match request.send().await {
            Ok(response) => RawResponse::read(response).await,
            Err(e) => Err(e),
        };
        // failed and timed out calls count towards the histogram too
        metrics
            .request_duration
            .with_label_values(&[self.method.as_str()])
            .observe(start.elapsed().as_secs_f64());
        let response = result.inspect_err(|e| warn!(url = %url, error = %e, "request transport failed"))?;

        metrics
            .requests
            .with_label_values(&[self.method.as_str(), response.status.as_str()])
            .inc();
        debug!(status = %response.status, url = %url, "response received");

        self.handlers.dispatch(response)
    }

    fn resolve_body(&self, data: Option<&Req>) -> Result<Option<Value>, RequestError> {
        if let Some(body) = &self.body {
            return Ok(Some(body.clone()));
        }
        match (&self.url, data) {
            (Url::Literal(_), Some(data)) => serde_json::to_value(data)
                .map(Some)
                .map_err(RequestError::Encode),
            _ => Ok(None),
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader(format!("{}: {}", value, e)))
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::from_parts(Client::new(), "http://localhost:8080/api/", "en-US", "/auth/refresh", Session::default())
    }

    #[test]
    fn joins_relative_urls_to_base() {
        let d = dispatcher();
        assert_eq!(d.absolute_url("/users/me"), "http://localhost:8080/api/users/me");
        assert_eq!(d.absolute_url("users"), "http://localhost:8080/api/users");
        assert_eq!(d.absolute_url("https://other.host/x"), "https://other.host/x");
    }

    #[test]
    fn url_function_needs_data() {
        let url: Url<String> = Url::from_data(|id: &String| format!("/users/{}", id));
        assert!(matches!(url.resolve(None), Err(RequestError::MissingData)));
        assert_eq!(url.resolve(Some(&"42".to_owned())).unwrap(), "/users/42");
    }

    #[test]
    fn rejects_invalid_headers() {
        let args = RequestArgs::<Value>::new("/users/me").header("bad header", "x");
        assert!(matches!(dispatcher().create_request(args), Err(RequestError::InvalidHeader(_))));
    }

    #[test]
    fn literal_url_sends_data_as_body_unless_fixed() {
        let d = dispatcher();
        let prepared = d
            .create_request(RequestArgs::<Value, Value>::new("/users").method(Method::POST))
            .unwrap();
        let data = serde_json::json!({"email": "a@b.com"});
        assert_eq!(prepared.resolve_body(Some(&data)).unwrap(), Some(data.clone()));
        assert_eq!(prepared.resolve_body(None).unwrap(), None);

        let fixed = d
            .create_request(RequestArgs::<Value, Value>::new("/users").body(serde_json::json!({})))
            .unwrap();
        assert_eq!(fixed.resolve_body(Some(&data)).unwrap(), Some(serde_json::json!({})));

        let by_id = d
            .create_request(RequestArgs::<Value, Value>::new(Url::from_data(|_: &Value| "/users/1".to_owned())))
            .unwrap();
        assert_eq!(by_id.resolve_body(Some(&data)).unwrap(), None);
    }
}
