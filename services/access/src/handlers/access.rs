use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::handlers::guard::redirect_location;
use crate::handlers::session::caller_snapshot;
use crate::state::AppState;
use crate::usecase::guard::{GuardDecision, evaluate};

#[derive(Serialize)]
pub struct AllowedResponse {
    pub allowed: bool,
}

// ── GET /auth/permissions/{permission} ───────────────────────────────────────

pub async fn check_permission<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
    Path(permission): Path<String>,
) -> impl IntoResponse
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    Json(AllowedResponse {
        allowed: caller_snapshot(&state, &jar).await.check_permission(&permission),
    })
}

// ── GET /auth/sections/{section} ─────────────────────────────────────────────

pub async fn check_section<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
    Path(section): Path<String>,
) -> impl IntoResponse
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    Json(AllowedResponse {
        allowed: caller_snapshot(&state, &jar).await.can_access_section(&section),
    })
}

// ── POST /access/evaluate ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct EvaluateRequest {
    /// Client-side location being navigated to, query included.
    pub path: String,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub decision: GuardDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

pub async fn evaluate_route<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    jar: CookieJar,
    Json(body): Json<EvaluateRequest>,
) -> impl IntoResponse
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    let requirement = state.routes.requirement_for(&body.path);
    let snapshot = caller_snapshot(&state, &jar).await;
    let decision = evaluate(&snapshot, &requirement, &body.path);
    let message = match decision {
        GuardDecision::RedirectToLanding { notice } => Some(notice.message()),
        _ => None,
    };
    Json(EvaluateResponse {
        location: redirect_location(&decision, &state.redirects),
        message,
        decision,
    })
}
