pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod response;

pub use dispatcher::{Dispatcher, PreparedRequest, RequestArgs, Url};
pub use errors::{ErrorObject, RequestError};
pub use handlers::{Expect, Handler, HandlerRegistry};
pub use response::RawResponse;
