use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;

use crate::request::errors::{ErrorObject, RequestError};
use crate::request::response::RawResponse;

pub type HandlerFn<T> = Arc<dyn Fn(&RawResponse) -> Result<T, RequestError> + Send + Sync>;

/// What to do with a response carrying a registered status code.
pub enum Handler<T> {
    /// Decode the body into `T`.
    Json,
    /// Decode an [`ErrorObject`] and fail with it.
    JsonError,
    Custom(HandlerFn<T>),
}

impl<T> Handler<T> {
    pub fn custom<F>(handler: F) -> Self
    where
        F: Fn(&RawResponse) -> Result<T, RequestError> + Send + Sync + 'static,
    {
        Handler::Custom(Arc::new(handler))
    }
}

impl<T: DeserializeOwned> Handler<T> {
    pub fn handle(&self, response: &RawResponse) -> Result<T, RequestError> {
        match self {
            Handler::Json => handle_success_with_payload(response),
            Handler::JsonError => handle_error_with_payload(response),
            Handler::Custom(handler) => handler(response),
        }
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        match self {
            Handler::Json => Handler::Json,
            Handler::JsonError => Handler::JsonError,
            Handler::Custom(handler) => Handler::Custom(handler.clone()),
        }
    }
}

impl<T> std::fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handler::Json => f.write_str("Json"),
            Handler::JsonError => f.write_str("JsonError"),
            Handler::Custom(_) => f.write_str("Custom"),
        }
    }
}

pub fn handle_success_with_payload<T: DeserializeOwned>(response: &RawResponse) -> Result<T, RequestError> {
    response.json().map_err(RequestError::Decode)
}

pub fn handle_error_with_payload<T>(response: &RawResponse) -> Result<T, RequestError> {
    let payload: ErrorObject = response.json().map_err(RequestError::Decode)?;
    Err(RequestError::HttpWithPayload {
        response: response.clone(),
        payload,
    })
}

/// A status code expected by the caller, either with the generic handler or a custom one.
pub enum Expect<T> {
    Code(u16),
    With(u16, Handler<T>),
}

impl<T> From<u16> for Expect<T> {
    fn from(code: u16) -> Self {
        Expect::Code(code)
    }
}

impl<T> Clone for Expect<T> {
    fn clone(&self) -> Self {
        match self {
            Expect::Code(code) => Expect::Code(*code),
            Expect::With(code, handler) => Expect::With(*code, handler.clone()),
        }
    }
}

impl<T> std::fmt::Debug for Expect<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expect::Code(code) => write!(f, "Code({})", code),
            Expect::With(code, handler) => write!(f, "With({}, {:?})", code, handler),
        }
    }
}

/// Status code to handler mapping for one prepared request.
pub struct HandlerRegistry<T> {
    handlers: HashMap<u16, Handler<T>>,
}

impl<T> HandlerRegistry<T> {
    /// Without explicit success codes POST expects 201 and every other method 200.
    /// Error codes have no default and override success codes on collision.
    pub fn build(method: &Method, success: &[Expect<T>], errors: &[Expect<T>]) -> Self {
        let mut handlers = HashMap::new();

        if success.is_empty() {
            let code = if *method == Method::POST { 201 } else { 200 };
            handlers.insert(code, Handler::Json);
        } else {
            for expect in success {
                match expect {
                    Expect::Code(code) => handlers.insert(*code, Handler::Json),
                    Expect::With(code, handler) => handlers.insert(*code, handler.clone()),
                };
            }
        }

        for expect in errors {
            match expect {
                Expect::Code(code) => handlers.insert(*code, Handler::JsonError),
                Expect::With(code, handler) => handlers.insert(*code, handler.clone()),
            };
        }

        Self { handlers }
    }

    pub fn get(&self, code: u16) -> Option<&Handler<T>> {
        self.handlers.get(&code)
    }

    pub fn codes(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self.handlers.keys().copied().collect();
        codes.sort_unstable();
        codes
    }
}

impl<T: DeserializeOwned> HandlerRegistry<T> {
    /// Route a response to its handler.
    ///
    /// Unregistered failures become [`RequestError::Http`], unregistered
    /// successes [`RequestError::UnhandledStatus`].
    pub fn dispatch(&self, response: RawResponse) -> Result<T, RequestError> {
        let code = response.status.as_u16();
        match self.get(code) {
            Some(handler) => handler.handle(&response),
            None if !response.is_success() => Err(RequestError::Http(response)),
            None => Err(RequestError::UnhandledStatus(code)),
        }
    }
}

impl<T> std::fmt::Debug for HandlerRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry").field("codes", &self.codes()).finish()
    }
}
