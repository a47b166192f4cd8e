use http::Method;
use tracing::info;

use crate::api::client::ApiClient;
use crate::api::types::{ChangePassword, LoginUser, ResetPassword, SubmitResetPassword, UserResponse};
use crate::request::{Handler, RawResponse, RequestError};
use crate::token::header::token_from_headers;

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const LOGOUT_ALL_PATH: &str = "/auth/logout/all";
pub const PASSWORD_RESET_PATH: &str = "/auth/password/reset";
pub const PASSWORD_RESET_SUBMIT_PATH: &str = "/auth/password/reset/submit";
pub const PASSWORD_CHANGE_PATH: &str = "/auth/password/change";

const LOGIN_ERRORS: [u16; 3] = [400, 401, 500];
const LOGOUT_ERRORS: [u16; 4] = [400, 401, 404, 500];
const PASSWORD_RESET_ERRORS: [u16; 2] = [400, 500];
const PASSWORD_RESET_SUBMIT_ERRORS: [u16; 3] = [400, 403, 500];
const PASSWORD_CHANGE_ERRORS: [u16; 4] = [400, 401, 404, 500];

/// Token from the `Authorization` header plus the user from the body.
type Authenticated = (String, UserResponse);

fn authenticated(response: &RawResponse) -> Result<Authenticated, RequestError> {
    let token = token_from_headers(&response.headers)?;
    let user = response.json().map_err(RequestError::Decode)?;
    Ok((token, user))
}

impl ApiClient {
    /// Exchange credentials for a session token. Sent without a bearer token.
    pub async fn login(&self, credentials: &LoginUser) -> Result<UserResponse, RequestError> {
        let request = self.dispatcher().create_request(
            self.args::<Authenticated, LoginUser>(Method::POST, LOGIN_PATH)
                .anonymous()
                .handle_success_with(201, Handler::custom(authenticated))
                .handle_error_codes(&LOGIN_ERRORS),
        )?;

        let (token, user) = request.call(Some(credentials)).await?;
        self.session().store().set(token).await;
        info!(user_id = %user.id, "logged in");
        Ok(user)
    }

    /// End the current session and forget the stored token.
    pub async fn logout(&self) -> Result<(), RequestError> {
        self.send_json::<(), ()>(Method::POST, LOGOUT_PATH, &LOGOUT_ERRORS, None)
            .await?;
        self.session().store().clear().await;
        info!("logged out");
        Ok(())
    }

    /// End every session of the current user and forget the stored token.
    pub async fn logout_all(&self) -> Result<(), RequestError> {
        self.send_json::<(), ()>(Method::POST, LOGOUT_ALL_PATH, &LOGOUT_ERRORS, None)
            .await?;
        self.session().store().clear().await;
        info!("logged out from all sessions");
        Ok(())
    }

    pub async fn password_reset(&self, body: &ResetPassword) -> Result<(), RequestError> {
        self.send_json(Method::POST, PASSWORD_RESET_PATH, &PASSWORD_RESET_ERRORS, Some(body))
            .await
    }

    pub async fn password_reset_submit(&self, body: &SubmitResetPassword) -> Result<UserResponse, RequestError> {
        self.send_json(Method::POST, PASSWORD_RESET_SUBMIT_PATH, &PASSWORD_RESET_SUBMIT_ERRORS, Some(body))
            .await
    }

    pub async fn password_change(&self, body: &ChangePassword) -> Result<UserResponse, RequestError> {
        self.send_json(Method::POST, PASSWORD_CHANGE_PATH, &PASSWORD_CHANGE_ERRORS, Some(body))
            .await
    }

    /// Force a token refresh regardless of the stored token.
    pub async fn refresh(&self) -> Result<String, RequestError> {
        self.dispatcher().refresher().refresh().await
    }
}
