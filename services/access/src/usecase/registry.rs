//! Per-caller sessions, keyed by the id carried in the session cookie.
//!
//! Each session owns its own [`SessionStore`], provider client and cache
//! slot, so one caller's sign-in never becomes another caller's identity.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use rahala_domain::session::SessionSnapshot;

use crate::domain::repository::{IdentityProvider, ProfileRepository, SessionCache};
use crate::usecase::session::SessionStore;

/// Builds the store backing a new session id.
pub type SessionFactory<P, R, C> = Box<dyn Fn(&str) -> SessionStore<P, R, C> + Send + Sync>;

struct SessionEntry<P: IdentityProvider, R: ProfileRepository, C: SessionCache> {
    store: Arc<SessionStore<P, R, C>>,
    listener: JoinHandle<()>,
}

impl<P: IdentityProvider, R: ProfileRepository, C: SessionCache> Drop for SessionEntry<P, R, C> {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

pub struct SessionRegistry<P: IdentityProvider, R: ProfileRepository, C: SessionCache> {
    factory: SessionFactory<P, R, C>,
    sessions: RwLock<HashMap<String, SessionEntry<P, R, C>>>,
}

impl<P, R, C> SessionRegistry<P, R, C>
where
    P: IdentityProvider + 'static,
    R: ProfileRepository + 'static,
    C: SessionCache + 'static,
{
    pub fn new(
        factory: impl Fn(&str) -> SessionStore<P, R, C> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Store for a known session id. Unknown ids resolve to nothing.
    pub async fn get(&self, id: &str) -> Option<Arc<SessionStore<P, R, C>>> {
        self.sessions
            .read()
            .await
            .get(id)
            .map(|entry| Arc::clone(&entry.store))
    }

    /// Snapshot seen by a caller. Callers without a live session are
    /// anonymous.
    pub async fn snapshot(&self, id: Option<&str>) -> SessionSnapshot {
        let store = match id {
            Some(id) => self.get(id).await,
            None => None,
        };
        match store {
            Some(store) => store.snapshot(),
            None => SessionSnapshot::anonymous(None),
        }
    }

    /// Start a session under a fresh id: subscribe to its provider, then
    /// resolve the provider's current user before anyone can see it.
    pub async fn open(&self) -> (String, Arc<SessionStore<P, R, C>>) {
        let id = Uuid::new_v4().to_string();
        let store = Arc::new((self.factory)(&id));
        let listener = store.spawn_listener();
        store.initialize().await;

        self.sessions.write().await.insert(
            id.clone(),
            SessionEntry {
                store: Arc::clone(&store),
                listener,
            },
        );
        debug!("session opened");
        (id, store)
    }

    /// Forget a session and stop its provider listener.
    pub async fn close(&self, id: &str) -> bool {
        let closed = self.sessions.write().await.remove(id).is_some();
        if closed {
            info!("session closed");
        }
        closed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
