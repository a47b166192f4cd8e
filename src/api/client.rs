use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::settings::ClientConfig;
use crate::request::{Dispatcher, RequestArgs, RequestError};
use crate::session::Session;

/// Typed access to the travel API for one session and locale.
#[derive(Debug, Clone)]
pub struct ApiClient {
    dispatcher: Dispatcher,
    lang: String,
}

impl ApiClient {
    pub fn new(dispatcher: Dispatcher) -> Self {
        let lang = dispatcher.default_lang().to_owned();
        Self { dispatcher, lang }
    }

    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self, RequestError> {
        Ok(Self::new(Dispatcher::new(&config.settings, session)?))
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn session(&self) -> &Session {
        self.dispatcher.session()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Request args preset with method and locale.
    pub(crate) fn args<Res, Req>(&self, method: Method, url: &str) -> RequestArgs<Res, Req> {
        RequestArgs::new(url).method(method).lang(self.lang.clone())
    }

    /// Bearer authenticated JSON call expecting the method's default success code.
    pub(crate) async fn send_json<Res, Req>(
        &self,
        method: Method,
        url: &str,
        error_codes: &[u16],
        body: Option<&Req>,
    ) -> Result<Res, RequestError>
    where
        Res: DeserializeOwned,
        Req: Serialize,
    {
        let request = self
            .dispatcher
            .create_request(self.args::<Res, Req>(method, url).handle_error_codes(error_codes))?;
        request.call(body).await
    }
}
