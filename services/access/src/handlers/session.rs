use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};

use rahala_domain::profile::Identity;
use rahala_domain::session::SessionSnapshot;

use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::error::AccessServiceError;
use crate::state::AppState;
use crate::usecase::sign_in::SignInInput;

/// Cookie carrying the caller's session id.
pub const SESSION_COOKIE: &str = "rahala_session";

pub fn session_id(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(Cookie::value)
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Snapshot of the caller's own session; anonymous without one.
pub async fn caller_snapshot<P, R, C>(state: &AppState<P, R, C>, jar: &CookieJar) -> SessionSnapshot
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    state.sessions.snapshot(session_id(jar)).await
}

// ── POST /auth/session ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignInRequest {
    pub identifier: String,
    pub secret: String,
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub success: bool,
    pub user: Identity,
}

/// Signs in on the caller's session, opening one when the caller has none.
/// A session opened for a failed attempt is discarded.
pub async fn sign_in<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, AccessServiceError>
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    let input = SignInInput {
        identifier: body.identifier,
        secret: body.secret,
    };
    input.validate()?;

    let existing = match session_id(&jar) {
        Some(id) => state.sessions.get(id).await.map(|store| (id.to_owned(), store)),
        None => None,
    };
    let (id, store, opened) = match existing {
        Some((id, store)) => (id, store, false),
        None => {
            let (id, store) = state.sessions.open().await;
            (id, store, true)
        }
    };

    match store.sign_in(&input.identifier, &input.secret).await {
        Ok(user) => Ok((
            jar.add(session_cookie(id)),
            Json(SignInResponse {
                success: true,
                user,
            }),
        )),
        Err(e) => {
            if opened {
                state.sessions.close(&id).await;
            }
            Err(e)
        }
    }
}

// ── DELETE /auth/session ─────────────────────────────────────────────────────

pub async fn sign_out<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AccessServiceError>
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    let Some(id) = session_id(&jar).map(str::to_owned) else {
        return Ok((jar, StatusCode::NO_CONTENT));
    };
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    if let Some(store) = state.sessions.get(&id).await {
        let revoked = store.sign_out().await;
        state.sessions.close(&id).await;
        revoked?;
    }
    Ok((jar, StatusCode::NO_CONTENT))
}

// ── GET /auth/session ────────────────────────────────────────────────────────

pub async fn current_session<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
) -> impl IntoResponse
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    Json(caller_snapshot(&state, &jar).await)
}
