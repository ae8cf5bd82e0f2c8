use std::fmt;
use std::time::Duration;

/// Prefix of the per-session cached identity keys.
pub const SESSION_CACHE_PREFIX: &str = "rahala:session";

/// Cached identities outlive their in-memory session by at most this long.
pub const SESSION_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Profile lookups after an identity-provider event.
pub const PROFILE_FETCH_ATTEMPTS: u32 = 5;
pub const PROFILE_FETCH_DELAY: Duration = Duration::from_millis(200);

/// Polling for a freshly written administrator profile to become visible.
pub const PROVISION_CONFIRM_ATTEMPTS: u32 = 10;
pub const PROVISION_CONFIRM_DELAY: Duration = Duration::from_millis(350);

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    pub const fn profile_fetch() -> Self {
        Self::new(PROFILE_FETCH_ATTEMPTS, PROFILE_FETCH_DELAY)
    }

    pub const fn provision_confirm() -> Self {
        Self::new(PROVISION_CONFIRM_ATTEMPTS, PROVISION_CONFIRM_DELAY)
    }
}

/// A user as reported by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub uid: String,
    pub email: Option<String>,
}

/// Result of a successful provider sign-in, or the locally synthesized
/// administrator credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    pub uid: String,
    pub email: Option<String>,
    /// True when no provider session backs this credential.
    pub synthesized: bool,
}

/// Identity-change notification from the provider's subscription stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    SignedIn(ProviderUser),
    SignedOut,
}

impl From<Option<ProviderUser>> for ProviderEvent {
    fn from(user: Option<ProviderUser>) -> Self {
        user.map_or(Self::SignedOut, Self::SignedIn)
    }
}

/// Classified provider sign-in failure.
///
/// Parsed from both the REST error form (`INVALID_PASSWORD`,
/// `TOO_MANY_ATTEMPTS_TRY_LATER : …`) and the SDK form (`auth/wrong-password`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorCode {
    InvalidCredential,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    TooManyRequests,
    /// Expired or invalid API key on the provider project.
    InvalidApiKey,
    Other(String),
}

impl ProviderErrorCode {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let head = raw.split([' ', ':']).next().unwrap_or_default();
        match head {
            "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_CREDENTIAL"
            | "INVALID_EMAIL"
            | "auth/invalid-credential"
            | "auth/invalid-login-credentials"
            | "auth/invalid-email" => Self::InvalidCredential,
            "USER_DISABLED" | "auth/user-disabled" => Self::UserDisabled,
            "EMAIL_NOT_FOUND" | "auth/user-not-found" => Self::UserNotFound,
            "INVALID_PASSWORD" | "auth/wrong-password" => Self::WrongPassword,
            "TOO_MANY_ATTEMPTS_TRY_LATER" | "auth/too-many-requests" => Self::TooManyRequests,
            "API_KEY_INVALID" | "API_KEY_EXPIRED" | "auth/api-key-expired"
            | "auth/invalid-api-key" => Self::InvalidApiKey,
            _ => {
                let lower = raw.to_lowercase();
                if lower.contains("api key") && (lower.contains("expired") || lower.contains("not valid"))
                {
                    Self::InvalidApiKey
                } else {
                    Self::Other(raw.to_owned())
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::UserDisabled => "USER_DISABLED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::InvalidApiKey => "PROVIDER_KEY_INVALID",
            Self::Other(_) => "PROVIDER_ERROR",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "البريد الإلكتروني أو كلمة المرور غير صحيحة",
            Self::UserDisabled => "تم تعطيل هذا الحساب",
            Self::UserNotFound => "لا يوجد مستخدم بهذا البريد الإلكتروني",
            Self::WrongPassword => "كلمة المرور غير صحيحة",
            Self::TooManyRequests => "تم تجاوز عدد المحاولات المسموح، يرجى المحاولة لاحقاً",
            Self::InvalidApiKey | Self::Other(_) => {
                "حدث خطأ أثناء تسجيل الدخول، يرجى المحاولة مرة أخرى"
            }
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(raw) => f.write_str(raw),
            other => f.write_str(other.kind()),
        }
    }
}
