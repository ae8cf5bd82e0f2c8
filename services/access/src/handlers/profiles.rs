use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::error::AccessServiceError;
use crate::state::AppState;
use crate::usecase::profile::{CreateProfileInput, CreateProfileUseCase};

// ── POST /profiles ───────────────────────────────────────────────────────────

pub async fn create_profile<P, R, C>(
    State(state): State<AppState<P, R, C>>,
    Json(body): Json<CreateProfileInput>,
) -> Result<impl IntoResponse, AccessServiceError>
where
    P: IdentityProvider,
    R: ProfileRepository,
    C: SessionCache,
{
    let profile = CreateProfileUseCase {
        profiles: state.profile_repo(),
    }
    .execute(body)
    .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}
