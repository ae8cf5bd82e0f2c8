/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (field names map to upper-case
/// env vars, `Vec` fields read comma-separated values) and call
/// `Config::from_env()` at startup.
///
/// # Panics
///
/// `from_env` panics if any required env var is missing or cannot be
/// deserialized. Use `try_from_env` to handle the error instead.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn try_from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    fn from_env() -> Self {
        Self::try_from_env().expect("failed to load config from environment")
    }
}
