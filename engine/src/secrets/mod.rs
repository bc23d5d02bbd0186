pub mod string;

pub use string::SecretString;

use keyring::Entry;
use regex::Regex;
use sdk::errors::EngineError;
use std::sync::OnceLock;

/// SecretManager resolves completion-service credentials.
///
/// Lookup order for a credential named by an environment variable:
/// 1. The process environment (after loading `.env` from the working directory)
/// 2. The OS keychain, under this manager's service name
///
/// A credential found nowhere is a fatal startup condition.
///
/// The SecretManager also scrubs API-key-shaped text out of log output and
/// error messages.
pub struct SecretManager {
    service_name: String,
}

/// Regex patterns for detecting common secret formats.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Initializes and returns the secret detection patterns.
///
/// Patterns match:
/// - Groq API keys: gsk_[a-zA-Z0-9]{20,}
/// - OpenAI API keys: sk-[a-zA-Z0-9-_]{20,}
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        [
            r"gsk_[a-zA-Z0-9]{20,}",
            r"sk-[a-zA-Z0-9\-_]{20,}",
            r"Bearer\s+[^\s]{20,}",
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
    })
}

impl SecretManager {
    /// Creates a new SecretManager with the given keychain service name.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Loads a `.env` file from the working directory into the process
    /// environment, if one exists. Variables already set are not overridden.
    pub fn load_dotenv() {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }
    }

    /// Resolves the credential stored under `env_var`.
    ///
    /// # Errors
    /// Returns `EngineError::MissingCredential` if neither the environment
    /// nor the keychain holds a non-empty value. A keychain that cannot be
    /// read is logged at `warn` with the storage error before the key is
    /// reported missing, since setting the variable is the fix either way.
    pub fn resolve(&self, env_var: &str) -> Result<SecretString, EngineError> {
        if let Ok(value) = std::env::var(env_var) {
            if !value.trim().is_empty() {
                tracing::debug!("Using credential '{}' from environment", env_var);
                return Ok(SecretString::new(value.trim()));
            }
        }

        settle_keychain_lookup(env_var, self.keychain_lookup(env_var))
    }

    /// Reads a secret from the OS keychain, `None` when no entry exists.
    fn keychain_lookup(&self, key: &str) -> Result<Option<SecretString>, EngineError> {
        let entry = Entry::new(&self.service_name, key).map_err(|e| {
            EngineError::KeyringError(format!("Failed to create keyring entry: {}", e))
        })?;

        match entry.get_password() {
            Ok(secret) if !secret.trim().is_empty() => Ok(Some(SecretString::new(secret))),
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(EngineError::KeyringError(format!(
                "Failed to retrieve secret '{}': {}",
                key, e
            ))),
        }
    }

    /// Scrubs secrets from text by replacing them with [REDACTED].
    ///
    /// # Examples
    /// ```
    /// use genie_engine::secrets::SecretManager;
    ///
    /// let scrubbed = SecretManager::scrub("My API key is gsk_1234567890abcdefghij");
    /// assert_eq!(scrubbed, "My API key is [REDACTED]");
    /// ```
    pub fn scrub(text: &str) -> String {
        let mut result = text.to_string();

        for pattern in get_secret_patterns() {
            result = pattern.replace_all(&result, "[REDACTED]").to_string();
        }

        result
    }
}

/// Turn a keychain lookup into the resolved credential
fn settle_keychain_lookup(
    env_var: &str,
    lookup: Result<Option<SecretString>, EngineError>,
) -> Result<SecretString, EngineError> {
    match lookup {
        Ok(Some(secret)) => {
            tracing::debug!("Using credential '{}' from keychain", env_var);
            Ok(secret)
        }
        Ok(None) => Err(EngineError::MissingCredential(env_var.to_string())),
        Err(e) => {
            tracing::warn!(
                "Could not read '{}' from the system keychain ({}). Set it in the environment instead",
                env_var,
                e
            );
            Err(EngineError::MissingCredential(env_var.to_string()))
        }
    }
}
