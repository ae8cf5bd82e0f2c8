use std::time::Duration;

use serde::Deserialize;

use rahala_core::config::Config;

use crate::domain::types::{
    PROFILE_FETCH_ATTEMPTS, PROFILE_FETCH_DELAY, PROVISION_CONFIRM_ATTEMPTS,
    PROVISION_CONFIRM_DELAY, ProviderCredential, RetryPolicy,
};

/// Access service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct AccessConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL (session cache).
    pub redis_url: String,
    /// TCP port to listen on (default 3120). Env var: `ACCESS_PORT`.
    #[serde(default = "default_port")]
    pub access_port: u16,
    /// Identity-provider REST base URL. Env var: `PROVIDER_URL`.
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// Identity-provider project API key. Env var: `PROVIDER_API_KEY`.
    pub provider_api_key: String,
    /// Administrator email; doubles as a sign-in alias.
    pub admin_email: String,
    /// Administrator secret checked locally for alias sign-ins.
    pub admin_secret: String,
    /// Legacy administrator identifiers (comma list). Env var: `ADMIN_ALIASES`.
    #[serde(default = "default_admin_aliases")]
    pub admin_aliases: Vec<String>,
    /// Fixed external id the administrator profile is keyed by.
    pub admin_uid: String,
    /// Where unauthenticated navigations are sent (default `/login`).
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    /// Where unauthorized navigations are sent (default `/`).
    #[serde(default = "default_landing_route")]
    pub landing_route: String,
    #[serde(default = "default_profile_fetch_attempts")]
    pub profile_fetch_attempts: u32,
    #[serde(default = "default_profile_fetch_delay_ms")]
    pub profile_fetch_delay_ms: u64,
    #[serde(default = "default_provision_attempts")]
    pub provision_attempts: u32,
    #[serde(default = "default_provision_delay_ms")]
    pub provision_delay_ms: u64,
}

impl Config for AccessConfig {}

impl AccessConfig {
    pub fn admin(&self) -> AdminConfig {
        AdminConfig {
            email: self.admin_email.clone(),
            secret: self.admin_secret.clone(),
            aliases: self.admin_aliases.clone(),
            uid: self.admin_uid.clone(),
        }
    }

    pub fn profile_fetch_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.profile_fetch_attempts,
            Duration::from_millis(self.profile_fetch_delay_ms),
        )
    }

    pub fn provision_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.provision_attempts,
            Duration::from_millis(self.provision_delay_ms),
        )
    }

    pub fn redirects(&self) -> Redirects {
        Redirects {
            sign_in: self.sign_in_route.clone(),
            landing: self.landing_route.clone(),
        }
    }
}

/// Administrator identity injected into the sign-in flow.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub secret: String,
    pub aliases: Vec<String>,
    pub uid: String,
}

impl AdminConfig {
    /// Exact match against the alias list or the admin email.
    pub fn is_alias(&self, identifier: &str) -> bool {
        identifier == self.email || self.aliases.iter().any(|a| a == identifier)
    }

    /// Case-insensitive email match, as the provider compares emails.
    pub fn is_admin_email(&self, identifier: &str) -> bool {
        identifier.eq_ignore_ascii_case(&self.email)
    }

    pub fn secret_matches(&self, secret: &str) -> bool {
        secret == self.secret
    }

    /// Credential bound to the well-known administrator id, with no provider
    /// session behind it.
    pub fn credential(&self) -> ProviderCredential {
        ProviderCredential {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            synthesized: true,
        }
    }
}

/// Redirect targets of the route guard.
#[derive(Debug, Clone)]
pub struct Redirects {
    pub sign_in: String,
    pub landing: String,
}

impl Default for Redirects {
    fn default() -> Self {
        Self {
            sign_in: default_sign_in_route(),
            landing: default_landing_route(),
        }
    }
}

fn default_port() -> u16 {
    3120
}

fn default_provider_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_owned()
}

fn default_admin_aliases() -> Vec<String> {
    vec!["admin".to_owned(), "1000".to_owned(), "1001".to_owned()]
}

fn default_sign_in_route() -> String {
    "/login".to_owned()
}

fn default_landing_route() -> String {
    "/".to_owned()
}

fn default_profile_fetch_attempts() -> u32 {
    PROFILE_FETCH_ATTEMPTS
}

fn default_profile_fetch_delay_ms() -> u64 {
    PROFILE_FETCH_DELAY.as_millis() as u64
}

fn default_provision_attempts() -> u32 {
    PROVISION_CONFIRM_ATTEMPTS
}

fn default_provision_delay_ms() -> u64 {
    PROVISION_CONFIRM_DELAY.as_millis() as u64
}
