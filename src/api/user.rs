use http::Method;

use crate::api::client::ApiClient;
use crate::api::types::{DeleteUser, NewUser, UpdateUser, UserResponse, VerifyUser};
use crate::request::{RequestError, Url};

pub const USERS_PATH: &str = "/users";
pub const USERS_ME_PATH: &str = "/users/me";
pub const USERS_VERIFY_PATH: &str = "/users/verify";

const CREATE_ERRORS: [u16; 3] = [400, 409, 500];
const MODIFY_ERRORS: [u16; 5] = [400, 401, 403, 404, 500];
const READ_ERRORS: [u16; 3] = [401, 404, 500];
const VERIFY_ERRORS: [u16; 3] = [400, 404, 500];

impl ApiClient {
    pub async fn create_user(&self, user: &NewUser) -> Result<UserResponse, RequestError> {
        self.send_json(Method::POST, USERS_PATH, &CREATE_ERRORS, Some(user)).await
    }

    pub async fn update_user(&self, update: &UpdateUser) -> Result<UserResponse, RequestError> {
        self.send_json(Method::PUT, USERS_PATH, &MODIFY_ERRORS, Some(update)).await
    }

    pub async fn delete_user(&self, body: &DeleteUser) -> Result<(), RequestError> {
        self.send_json(Method::DELETE, USERS_PATH, &MODIFY_ERRORS, Some(body)).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<UserResponse, RequestError> {
        let request = self.dispatcher().create_request(
            self.args::<UserResponse, String>(Method::GET, USERS_PATH)
                .url(Url::from_data(|id: &String| format!("{}/{}", USERS_PATH, id)))
                .handle_error_codes(&READ_ERRORS),
        )?;
        request.call(Some(&user_id.to_owned())).await
    }

    pub async fn get_me(&self) -> Result<UserResponse, RequestError> {
        self.send_json::<_, ()>(Method::GET, USERS_ME_PATH, &READ_ERRORS, None).await
    }

    pub async fn verify_user(&self, body: &VerifyUser) -> Result<(), RequestError> {
        self.send_json(Method::POST, USERS_VERIFY_PATH, &VERIFY_ERRORS, Some(body)).await
    }
}
