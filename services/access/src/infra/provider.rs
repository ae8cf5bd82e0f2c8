use anyhow::Context as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::{info, warn};

use crate::domain::repository::IdentityProvider;
use crate::domain::types::{ProviderCredential, ProviderErrorCode, ProviderEvent, ProviderUser};
use crate::error::AccessServiceError;

const EVENT_CAPACITY: usize = 16;

/// Identity-toolkit style REST provider.
///
/// Holds the signed-in user in memory and publishes every change on a
/// broadcast channel, the way a client SDK reports auth-state changes.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
    current: RwLock<Option<ProviderUser>>,
    events: broadcast::Sender<ProviderEvent>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    /// One provider session over a shared connection pool.
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            current: RwLock::new(None),
            events,
        }
    }

    async fn set_current(&self, user: Option<ProviderUser>) {
        let mut current = self.current.write().await;
        if *current == user {
            return;
        }
        current.clone_from(&user);
        // No receivers is fine; the store subscribes after startup.
        let _ = self.events.send(ProviderEvent::from(user));
    }
}

impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        secret: &str,
    ) -> Result<ProviderCredential, AccessServiceError> {
        let url = format!(
            "{}/accounts:signInWithPassword?key={}",
            self.base_url, self.api_key
        );
        let resp = self
            .client
            .post(&url)
            .json(&PasswordSignInRequest {
                email,
                password: secret,
                return_secure_token: true,
            })
            .send()
            .await
            .context("identity provider request")?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            let code = parse_error_body(&body);
            warn!(code = %code, "identity provider rejected sign-in");
            return Err(AccessServiceError::Provider(code));
        }

        let body: PasswordSignInResponse = resp
            .json()
            .await
            .context("decode identity provider response")?;
        let user = ProviderUser {
            uid: body.local_id,
            email: body.email.or_else(|| Some(email.to_owned())),
        };
        info!(uid = %user.uid, "identity provider sign-in");
        self.set_current(Some(user.clone())).await;

        Ok(ProviderCredential {
            uid: user.uid,
            email: user.email,
            synthesized: false,
        })
    }

    async fn sign_out(&self) -> Result<(), AccessServiceError> {
        self.set_current(None).await;
        Ok(())
    }

    async fn current_user(&self) -> Option<ProviderUser> {
        self.current.read().await.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

fn parse_error_body(body: &str) -> ProviderErrorCode {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => ProviderErrorCode::parse(&envelope.error.message),
        Err(_) => ProviderErrorCode::parse(body),
    }
}
