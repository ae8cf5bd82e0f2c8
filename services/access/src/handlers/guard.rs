use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::Serialize;
use tracing::{debug, warn};

use rahala_domain::route::RouteRequirement;

use crate::config::Redirects;
use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::handlers::session::caller_snapshot;
use crate::state::AppState;
use crate::usecase::guard::{GuardDecision, GuardNotice, evaluate};

/// Flash cookie read once by the landing page to show the denial notice.
pub const NOTICE_COOKIE: &str = "rahala_notice";

#[derive(Serialize)]
struct FromQuery<'a> {
    from: &'a str,
}

/// Where a redirecting decision sends the client.
pub fn redirect_location(decision: &GuardDecision, redirects: &Redirects) -> Option<String> {
    match decision {
        GuardDecision::RedirectToSignIn { from } => Some(sign_in_location(&redirects.sign_in, from)),
        GuardDecision::RedirectToLanding { .. } => Some(redirects.landing.clone()),
        GuardDecision::Wait | GuardDecision::Render => None,
    }
}

fn sign_in_location(sign_in: &str, from: &str) -> String {
    match serde_qs::to_string(&FromQuery { from }) {
        Ok(query) => format!("{sign_in}?{query}"),
        Err(e) => {
            warn!(error = %e, "could not encode return location");
            sign_in.to_owned()
        }
    }
}

fn notice_cookie(notice: GuardNotice) -> Cookie<'static> {
    Cookie::build((NOTICE_COOKIE, notice.as_str()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Route-guard middleware. Attach with
/// `from_fn_with_state((state, Arc::new(requirement)), enforce)`.
pub async fn enforce<P, R, C>(
    State((state, requirement)): State<(AppState<P, R, C>, Arc<RouteRequirement>)>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    let attempted = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());
    let snapshot = caller_snapshot(&state, &jar).await;
    let decision = evaluate(&snapshot, &requirement, &attempted);
    debug!(path = %attempted, ?decision, "route guard");

    match decision {
        GuardDecision::Render => next.run(request).await,
        GuardDecision::Wait => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(RETRY_AFTER, "1")],
            Json(serde_json::json!({ "decision": "wait" })),
        )
            .into_response(),
        GuardDecision::RedirectToSignIn { ref from } => {
            Redirect::to(&sign_in_location(&state.redirects.sign_in, from)).into_response()
        }
        GuardDecision::RedirectToLanding { notice } => (
            jar.add(notice_cookie(notice)),
            Redirect::to(&state.redirects.landing),
        )
            .into_response(),
    }
}
