//! Injectable session store: the single owner of one caller's "who is signed in".
//!
//! Every transition (provider event, sign-in, sign-out) starts by taking a
//! fresh [`GenerationToken`] and flipping the snapshot to `Loading`. Resolution
//! runs without holding any lock; the final commit re-checks the token under
//! the commit lock and writes the cache and the snapshot together.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};

use rahala_domain::profile::{Identity, Profile};
use rahala_domain::session::{SessionSnapshot, SessionStatus};

use crate::config::AdminConfig;
use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::domain::types::{ProviderEvent, ProviderUser, RetryPolicy};
use crate::error::AccessServiceError;
use crate::usecase::generation::{GenerationToken, Generations};
use crate::usecase::provision::ProvisionAdminUseCase;
use crate::usecase::sign_in::{SignInInput, SignInUseCase, SignOutReason};

pub struct SessionStore<P: IdentityProvider, R: ProfileRepository, C: SessionCache> {
    provider: P,
    profiles: R,
    cache: C,
    admin: AdminConfig,
    profile_fetch: RetryPolicy,
    provisioning: RetryPolicy,
    generations: Generations,
    commit_lock: Mutex<()>,
    sender: watch::Sender<SessionSnapshot>,
    sign_out_reason: SignOutReason,
}

impl<P: IdentityProvider, R: ProfileRepository, C: SessionCache> SessionStore<P, R, C> {
    pub fn new(provider: P, profiles: R, cache: C, admin: AdminConfig) -> Self {
        let (sender, _) = watch::channel(SessionSnapshot::default());
        Self {
            provider,
            profiles,
            cache,
            admin,
            profile_fetch: RetryPolicy::profile_fetch(),
            provisioning: RetryPolicy::provision_confirm(),
            generations: Generations::new(),
            commit_lock: Mutex::new(()),
            sender,
            sign_out_reason: SignOutReason::default(),
        }
    }

    pub fn with_policies(mut self, profile_fetch: RetryPolicy, provisioning: RetryPolicy) -> Self {
        self.profile_fetch = profile_fetch;
        self.provisioning = provisioning;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn profiles(&self) -> &R {
        &self.profiles
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.sender.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.sender.borrow().identity.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.sender.subscribe()
    }

    pub fn check_permission(&self, permission: &str) -> bool {
        self.sender.borrow().check_permission(permission)
    }

    pub fn can_access_section(&self, key: &str) -> bool {
        self.sender.borrow().can_access_section(key)
    }

    /// Wait until no transition is pending and return the settled snapshot.
    pub async fn settled(&self) -> SessionSnapshot {
        let mut rx = self.sender.subscribe();
        let settled = rx.wait_for(|s| !s.is_loading()).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    // ── Startup ──────────────────────────────────────────────────────────────

    /// Warm start from the local cache. The cached identity is shown as
    /// `Loading` until the provider's live state resolves.
    pub async fn restore(&self) {
        let cached = match self.cache.load().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(error = %e, "session cache read failed");
                return;
            }
        };
        let Some(identity) = cached else {
            return;
        };
        let _guard = self.commit_lock.lock().await;
        let restored = self.sender.send_if_modified(|s| {
            if s.status != SessionStatus::Uninitialized {
                return false;
            }
            s.status = SessionStatus::Loading;
            s.identity = Some(identity);
            true
        });
        if restored {
            info!("session restored from cache");
        }
    }

    /// Restore, then resolve the provider's current user as the first event.
    pub async fn initialize(&self) {
        self.restore().await;
        let current = self.provider.current_user().await;
        self.handle_provider_event(ProviderEvent::from(current)).await;
    }

    // ── Provider events ──────────────────────────────────────────────────────

    /// Resolve one provider event to completion.
    pub async fn handle_provider_event(&self, event: ProviderEvent) {
        let token = self.begin_transition().await;
        self.resolve_event(event, &token).await;
    }

    async fn resolve_event(&self, event: ProviderEvent, token: &GenerationToken) {
        let user = match event {
            ProviderEvent::SignedOut => {
                let reason = self.sign_out_reason.take().await;
                self.commit(token, SessionSnapshot::anonymous(reason)).await;
                return;
            }
            ProviderEvent::SignedIn(user) => user,
        };

        match self.load_identity(&user, token).await {
            Ok(identity) => {
                self.commit(token, SessionSnapshot::authenticated(identity))
                    .await;
            }
            Err(AccessServiceError::Superseded) => {
                debug!(uid = %user.uid, generation = token.value(), "provider event superseded");
            }
            Err(e) => {
                warn!(uid = %user.uid, error = %e, "provider session rejected");
                let committed = self
                    .commit(
                        token,
                        SessionSnapshot::anonymous(Some(e.user_message().to_owned())),
                    )
                    .await;
                if committed {
                    self.revoke(e.user_message()).await;
                }
            }
        }
    }

    /// Profile for a provider user, retried with the profile-fetch policy.
    async fn load_identity(
        &self,
        user: &ProviderUser,
        token: &GenerationToken,
    ) -> Result<Identity, AccessServiceError> {
        let attempts = self.profile_fetch.attempts;
        for attempt in 1..=attempts {
            if !token.is_current() {
                return Err(AccessServiceError::Superseded);
            }
            match self.find_profile(user).await {
                Ok(Some(profile)) if !profile.is_enabled() => {
                    return Err(AccessServiceError::AccountDisabled);
                }
                Ok(Some(profile)) => return Ok(Identity::from(profile)),
                Ok(None) if self.is_admin_user(user) => {
                    let profile = ProvisionAdminUseCase {
                        profiles: &self.profiles,
                        admin: &self.admin,
                        policy: self.provisioning,
                    }
                    .execute(&user.uid, token)
                    .await?;
                    return Ok(Identity::from(profile));
                }
                Ok(None) => debug!(uid = %user.uid, attempt, "profile not found yet"),
                Err(AccessServiceError::StorePermissionDenied) => {
                    return Err(AccessServiceError::StorePermissionDenied);
                }
                Err(e) => warn!(uid = %user.uid, attempt, error = %e, "profile fetch failed"),
            }
            if attempt < attempts && !token.pause(self.profile_fetch.delay).await {
                return Err(AccessServiceError::Superseded);
            }
        }
        Err(AccessServiceError::ProfileUnavailable)
    }

    async fn find_profile(&self, user: &ProviderUser) -> Result<Option<Profile>, AccessServiceError> {
        if let Some(profile) = self.profiles.find_by_id(&user.uid).await? {
            return Ok(Some(profile));
        }
        match user.email.as_deref() {
            Some(email) => self.profiles.find_by_email(email).await,
            None => Ok(None),
        }
    }

    fn is_admin_user(&self, user: &ProviderUser) -> bool {
        user.email
            .as_deref()
            .is_some_and(|email| self.admin.is_admin_email(email))
    }

    // ── Sign-in / sign-out ───────────────────────────────────────────────────

    /// Sign in and commit the resolved identity.
    ///
    /// Blank input is rejected before the session is touched. When a newer
    /// transition (typically the provider echoing this very sign-in) takes
    /// over, the identity that transition settles on is returned instead.
    pub async fn sign_in(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Identity, AccessServiceError> {
        let input = SignInInput {
            identifier: identifier.to_owned(),
            secret: secret.to_owned(),
        };
        input.validate()?;

        let token = self.begin_transition().await;
        self.sign_out_reason.take().await;
        let result = SignInUseCase {
            provider: &self.provider,
            profiles: &self.profiles,
            admin: &self.admin,
            provisioning: self.provisioning,
            reason: &self.sign_out_reason,
        }
        .execute(input, &token)
        .await;

        match result {
            Ok(identity) => {
                if self
                    .commit(&token, SessionSnapshot::authenticated(identity.clone()))
                    .await
                {
                    return Ok(identity);
                }
            }
            Err(AccessServiceError::Superseded) => {}
            Err(e) => {
                self.commit(
                    &token,
                    SessionSnapshot::anonymous(Some(e.user_message().to_owned())),
                )
                .await;
                return Err(e);
            }
        }

        self.settled()
            .await
            .identity
            .ok_or(AccessServiceError::Superseded)
    }

    /// Revoke the provider session and clear the identity and the cache.
    pub async fn sign_out(&self) -> Result<(), AccessServiceError> {
        let token = self.begin_transition().await;
        self.sign_out_reason.take().await;
        let revoked = self.provider.sign_out().await;
        if let Err(ref e) = revoked {
            warn!(error = %e, "provider sign-out failed, clearing local session anyway");
        }
        self.commit(&token, SessionSnapshot::anonymous(None)).await;
        revoked
    }

    async fn revoke(&self, message: &str) {
        self.sign_out_reason.record(message).await;
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "failed to revoke provider session");
            self.sign_out_reason.take().await;
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    async fn begin_transition(&self) -> GenerationToken {
        let _guard = self.commit_lock.lock().await;
        let token = self.generations.advance();
        self.sender.send_modify(|s| s.status = SessionStatus::Loading);
        debug!(generation = token.value(), "session transition started");
        token
    }

    /// Publish `next` and mirror it to the cache, unless `token` is stale.
    async fn commit(&self, token: &GenerationToken, next: SessionSnapshot) -> bool {
        let _guard = self.commit_lock.lock().await;
        if !token.is_current() {
            debug!(
                generation = token.value(),
                current = self.generations.current(),
                "dropping superseded session commit"
            );
            return false;
        }

        let cached = match next.identity {
            Some(ref identity) => self.cache.store(identity).await,
            None => self.cache.clear().await,
        };
        if let Err(e) = cached {
            warn!(error = %e, "session cache write failed");
        }

        debug!(generation = token.value(), status = ?next.status, "session committed");
        self.sender.send_replace(next);
        true
    }
}

impl<P, R, C> SessionStore<P, R, C>
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    /// Consume provider events in arrival order. Each event gets its
    /// generation before the next one is read, then resolves on its own task.
    pub fn spawn_listener(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = store.provider.subscribe();
        tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "provider events lagged, resyncing current user");
                        ProviderEvent::from(store.provider.current_user().await)
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("provider event stream closed");
                        break;
                    }
                };
                let token = store.begin_transition().await;
                let worker = Arc::clone(&store);
                tokio::spawn(async move { worker.resolve_event(event, &token).await });
            }
        })
    }
}
