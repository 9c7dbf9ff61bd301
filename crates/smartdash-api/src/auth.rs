// Auth and user-profile endpoints
//
// Login, registration and token verification return a session
// (`AuthResponse`); profile calls operate on the user named by the
// `X-User-Id` header or the path.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    ApiResponse, AuthResponse, Credentials, MessageResponse, NewUser, PasswordChange,
    ProfileUpdate, User,
};

impl ApiClient {
    /// `POST /auth/authenticate`
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<AuthResponse, Error> {
        debug!(email, "authenticating");
        self.post(
            "auth/authenticate",
            &Credentials {
                email,
                password: password.expose_secret(),
            },
        )
        .await
    }

    /// `POST /auth/register`
    pub async fn register(&self, user: &NewUser<'_>) -> Result<AuthResponse, Error> {
        debug!(email = user.email, "registering");
        self.post("auth/register", user).await
    }

    /// `POST /auth/verify-token`
    ///
    /// Always sends an `Authorization` header, `Bearer ` with an empty
    /// token when no session is held.
    pub async fn verify_token(&self) -> Result<AuthResponse, Error> {
        let token = self.current_token();
        let token = token.as_ref().map_or("", |t| t.expose_secret());
        self.post_with_bearer("auth/verify-token", &json!({}), token)
            .await
    }

    /// `POST /auth/forgot-password`
    pub async fn forgot_password(&self, email: &str) -> Result<MessageResponse, Error> {
        self.post("auth/forgot-password", &json!({ "email": email }))
            .await
    }

    /// `GET /users/getUserById/{id}`
    pub async fn get_user(&self, user_id: &str) -> Result<User, Error> {
        self.get(&format!("users/getUserById/{user_id}")).await
    }

    /// `PATCH /users/profile`
    ///
    /// The backend wraps the updated profile in `{ success, message, data }`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, Error> {
        let resp: ApiResponse<User> = self.patch("users/profile", update).await?;
        resp.data.ok_or(Error::MissingData {
            endpoint: "users/profile",
        })
    }

    /// `PATCH /users/password`
    pub async fn change_password(&self, change: &PasswordChange<'_>) -> Result<(), Error> {
        self.patch_no_response("users/password", change).await
    }
}
