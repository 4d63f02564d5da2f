//! Login and logout handlers.
//!
//! # Security considerations
//! - The submitted password is only forwarded to the credential check; it is
//!   never logged, stored, or echoed into a cookie.
//! - Failed logins return one fixed message whether the user is unknown or the
//!   password is wrong.
use crate::api::error::{ApiError, api_internal, api_login_failed, api_validation_error};
use crate::app::AppState;
use crate::auth::SESSION_COOKIE;
use crate::observability::{LoginOutcome, record_login};
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::{IntoResponse, Redirect};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;

/// Landing page after a successful login.
pub const HOME_PATH: &str = "/dsstore";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Session started; redirect to the store list"),
        (status = 400, description = "Username or password missing", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Warehouse rejected the credentials", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Form(form) = form.map_err(|_| api_validation_error("Username and password are required"))?;
    let (Some(username), Some(password)) = (
        form.username.filter(|value| !value.trim().is_empty()),
        form.password.filter(|value| !value.is_empty()),
    ) else {
        return Err(api_validation_error("Username and password are required"));
    };

    match state.store.verify_credentials(&username, &password).await {
        Ok(true) => {
            record_login(LoginOutcome::Success);
            tracing::info!(user = %username, "login succeeded");
            let token = state.sessions.issue(&username);
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(state.cookie_secure)
                .path("/");
            Ok((jar.add(cookie), Redirect::to(HOME_PATH)))
        }
        Ok(false) => {
            record_login(LoginOutcome::Rejected);
            tracing::info!(user = %username, "login rejected");
            Err(api_login_failed())
        }
        Err(err) => {
            record_login(LoginOutcome::Error);
            Err(api_internal("login unavailable", &err))
        }
    }
}

#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 303, description = "Session revoked; redirect to the login page")
    )
)]
pub(crate) async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.revoke(cookie.value());
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to(LOGIN_PATH))
}
