//! Registration, login, and the access gate.
//!
//! Passwords are hashed with Argon2 (fresh salt per hash, embedded in the
//! PHC string). A successful login mints an HS256 access token and binds it
//! to the caller's server-side session; the gate middleware re-verifies that
//! token on every protected request without touching the database.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use lazy_static::lazy_static;
use std::sync::Arc;

use super::error::{GateDenial, LoginError, RegisterError};
use super::validation;
use crate::db::users;
use crate::db::{LoginRequest, LoginResponse, LoginStatusResponse, RegisterRequest, RegisterResponse};
use crate::session::{self, SESSION_COOKIE};
use crate::token;
use crate::AppState;

lazy_static! {
    /// Verified against when an email lookup comes up empty, so both login
    /// failure paths do comparable work.
    static ref DUMMY_HASH: String =
        hash_password("homefront-parity-filler").expect("static hash");
}

/// Identity attached to the request once the gate has verified a token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Registration endpoint
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), RegisterError> {
    if request.password != request.confirm_password {
        return Err(RegisterError::PasswordMismatch);
    }

    validation::validate_name(&request.name).map_err(RegisterError::Validation)?;
    validation::validate_email(&request.email).map_err(RegisterError::Validation)?;
    validation::validate_password(&request.password).map_err(RegisterError::Validation)?;

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        RegisterError::Failed
    })?;

    let id = users::create_user(&state.db, &request.name, &request.email, &password_hash).await?;

    tracing::info!(user_id = %id, "Registered new account");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), LoginError> {
    let user = match users::find_by_email(&state.db, &request.email).await? {
        Some(user) => user,
        None => {
            // Unknown email: burn a verification so the timing resembles
            // the wrong-password path, then fail the same way.
            let _ = verify_password(&request.password, &DUMMY_HASH);
            return Err(LoginError::InvalidCredentials);
        }
    };

    if !verify_password(&request.password, &user.password_hash) {
        return Err(LoginError::InvalidCredentials);
    }

    let token = token::mint(
        &user.id,
        &state.config.auth.token_secret,
        state.config.auth.token_ttl_minutes,
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Token minting failed");
        LoginError::Failed
    })?;

    // Reuse the presented session id when its signature verifies, otherwise
    // start a fresh one. Either way the new token replaces whatever the
    // session held.
    let session_id = jar
        .get(SESSION_COOKIE)
        .and_then(|c| session::verify_cookie(c.value(), &state.config.auth.session_secret))
        .unwrap_or_else(|| state.sessions.generate_id());

    state.sessions.attach(&session_id, token.clone());

    let cookie = Cookie::build((
        SESSION_COOKIE,
        session::sign_cookie(&session_id, &state.config.auth.session_secret),
    ))
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .build();

    tracing::info!(user_id = %user.id, "Login successful");

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            token,
        }),
    ))
}

/// Logout: drop the server-side session and expire the cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_id) = jar
        .get(SESSION_COOKIE)
        .and_then(|c| session::verify_cookie(c.value(), &state.config.auth.session_secret))
    {
        state.sessions.clear(&session_id);
    }

    // Removal cookie must carry the same path the login cookie was set with
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    let jar = jar.remove(removal);

    (jar, Redirect::to("/login"))
}

/// Report whether the caller's session currently holds a valid token.
/// Public, and never redirects; the login page polls this.
pub async fn login_status(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Json<LoginStatusResponse> {
    let is_logged_in = jar
        .get(SESSION_COOKIE)
        .and_then(|c| session::verify_cookie(c.value(), &state.config.auth.session_secret))
        .and_then(|session_id| state.sessions.token(&session_id))
        .map(|token| token::verify(&token, &state.config.auth.token_secret).is_ok())
        .unwrap_or(false);

    Json(LoginStatusResponse { is_logged_in })
}

/// Access gate applied to every protected page.
///
/// Two checkpoints: a session must be presented and hold a token, and that
/// token must verify. Each failure is a terminal redirect carrying only a
/// coarse reason code.
pub async fn gate(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .and_then(|c| session::verify_cookie(c.value(), &state.config.auth.session_secret))
        .and_then(|session_id| state.sessions.token(&session_id));

    let Some(token) = token else {
        return GateDenial::PleaseLogin.into_response();
    };

    match token::verify(&token, &state.config.auth.token_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser { id: claims.sub });
            next.run(request).await
        }
        Err(_) => GateDenial::InvalidToken.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_roundtrip() {
        let hash = hash_password("p1").unwrap();
        assert!(verify_password("p1", &hash));
        assert!(!verify_password("p2", &hash));
    }

    #[test]
    fn test_salt_is_fresh_per_hash() {
        let first = hash_password("same-password").unwrap();
        let second = hash_password("same-password").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("same-password", &first));
        assert!(verify_password("same-password", &second));
    }

    #[test]
    fn test_verify_against_garbage_hash() {
        assert!(!verify_password("p1", "not-a-phc-string"));
        assert!(!verify_password("p1", ""));
    }
}
