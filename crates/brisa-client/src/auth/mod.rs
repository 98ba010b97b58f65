pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[serde(rename = "apellido")]
    pub family_name: String,
    pub email: String,
    pub password: String,
}

/// Exchange credentials for a bearer token. The token still has to go
/// through [`session::AuthSession::login`] to become a session.
pub async fn authenticate(api: &ApiClient, email: &str, password: &str) -> AppResult<String> {
    let resp: LoginResponse = api
        .post_json("/login", &LoginRequest { email, password })
        .await?;
    Ok(resp.token)
}

/// Create an account. The backend assigns the initial role; an admin
/// promotes from the user panel afterwards.
pub async fn register(api: &ApiClient, req: &RegisterRequest) -> AppResult<()> {
    let _: serde_json::Value = api.post_json("/register", req).await?;
    Ok(())
}
