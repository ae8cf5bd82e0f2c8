//! Generation counter that supersedes stale session transitions.
//!
//! Every session transition takes a fresh [`GenerationToken`]. Long-running
//! work (profile retries, provisioning confirmation) checks its token between
//! steps and gives up once a newer transition has started; commits compare the
//! token against the live generation before touching session state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Generations {
    current: Arc<AtomicU64>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new transition, superseding every earlier token.
    pub fn advance(&self) -> GenerationToken {
        let value = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationToken {
            value,
            current: Arc::clone(&self.current),
        }
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationToken {
    value: u64,
    current: Arc<AtomicU64>,
}

impl GenerationToken {
    /// A token no session owns; it stays current forever.
    pub fn detached() -> Self {
        Generations::new().advance()
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.value
    }

    /// Sleep for `delay`, then report whether the token is still current.
    pub async fn pause(&self, delay: Duration) -> bool {
        tokio::time::sleep(delay).await;
        self.is_current()
    }
}
