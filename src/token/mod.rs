pub mod header;
pub mod refresher;
pub mod validator;

pub use refresher::TokenRefresher;
pub use validator::{is_token_valid, JwtPayload};
