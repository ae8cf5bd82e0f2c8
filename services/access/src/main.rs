use sea_orm::Database;
use tracing::info;

use rahala_access::config::AccessConfig;
use rahala_access::infra::cache::RedisSessionCache;
use rahala_access::infra::db::DbProfileRepository;
use rahala_access::infra::provider::HttpIdentityProvider;
use rahala_access::route_table::back_office_routes;
use rahala_access::router::build_router;
use rahala_access::state::LiveState;
use rahala_access::usecase::registry::SessionRegistry;
use rahala_access::usecase::session::SessionStore;
use rahala_core::config::Config;
use rahala_core::tracing::{DEFAULT_FILTER, init_tracing};

#[tokio::main]
async fn main() {
    init_tracing(DEFAULT_FILTER);

    let config = AccessConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let profiles = DbProfileRepository { db };
    let client = reqwest::Client::new();
    let sessions = {
        let profiles = profiles.clone();
        let admin = config.admin();
        let profile_fetch = config.profile_fetch_policy();
        let provisioning = config.provision_policy();
        let provider_url = config.provider_url.clone();
        let api_key = config.provider_api_key.clone();
        SessionRegistry::new(move |session_id| {
            SessionStore::new(
                HttpIdentityProvider::with_client(client.clone(), &provider_url, &api_key),
                profiles.clone(),
                RedisSessionCache::for_session(redis.clone(), session_id),
                admin.clone(),
            )
            .with_policies(profile_fetch, provisioning)
        })
    };

    let state = LiveState::new(sessions, profiles, back_office_routes(), config.redirects());

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.access_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("access service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
