use std::sync::Arc;

use rahala_domain::route::RouteTable;

use crate::config::Redirects;
use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::infra::cache::RedisSessionCache;
use crate::infra::db::DbProfileRepository;
use crate::infra::provider::HttpIdentityProvider;
use crate::usecase::registry::SessionRegistry;

/// Shared application state passed to every handler via axum `State`.
///
/// Generic over the collaborators so tests can run the router against
/// in-memory fakes; [`LiveState`] is the production wiring.
pub struct AppState<P: IdentityProvider, R: ProfileRepository, C: SessionCache> {
    pub sessions: Arc<SessionRegistry<P, R, C>>,
    pub profiles: Arc<R>,
    pub routes: Arc<RouteTable>,
    pub redirects: Arc<Redirects>,
}

pub type LiveState = AppState<HttpIdentityProvider, DbProfileRepository, RedisSessionCache>;

impl<P: IdentityProvider, R: ProfileRepository, C: SessionCache> Clone for AppState<P, R, C> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            profiles: Arc::clone(&self.profiles),
            routes: Arc::clone(&self.routes),
            redirects: Arc::clone(&self.redirects),
        }
    }
}

impl<P: IdentityProvider, R: ProfileRepository, C: SessionCache> AppState<P, R, C> {
    pub fn new(
        sessions: SessionRegistry<P, R, C>,
        profiles: R,
        routes: RouteTable,
        redirects: Redirects,
    ) -> Self {
        Self {
            sessions: Arc::new(sessions),
            profiles: Arc::new(profiles),
            routes: Arc::new(routes),
            redirects: Arc::new(redirects),
        }
    }

    pub fn profile_repo(&self) -> &R {
        &self.profiles
    }
}
