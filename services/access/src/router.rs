use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use rahala_core::middleware::{propagate_request_id_layer, request_id_layer};
use rahala_domain::permission::MANAGE_USERS;
use rahala_domain::route::RouteRequirement;

use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::handlers::{
    access::{check_permission, check_section, evaluate_route},
    guard::enforce,
    health::{healthz, readyz},
    profiles::create_profile,
    session::{current_session, sign_in, sign_out},
};
use crate::state::AppState;

pub fn build_router<P, R, C>(state: AppState<P, R, C>) -> Router
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    let manage_users = (
        state.clone(),
        Arc::new(RouteRequirement::permission(MANAGE_USERS)),
    );

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Session
        .route(
            "/auth/session",
            get(current_session::<P, R, C>)
                .post(sign_in::<P, R, C>)
                .delete(sign_out::<P, R, C>),
        )
        .route("/auth/permissions/{permission}", get(check_permission::<P, R, C>))
        .route("/auth/sections/{section}", get(check_section::<P, R, C>))
        // Route guard
        .route("/access/evaluate", post(evaluate_route::<P, R, C>))
        // Profiles
        .route(
            "/profiles",
            post(create_profile::<P, R, C>).route_layer(middleware::from_fn_with_state(
                manage_users,
                enforce::<P, R, C>,
            )),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
}
