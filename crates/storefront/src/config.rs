//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string of the hosted database
//!   (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `SUPABASE_URL` - Project URL of the hosted backend (auth + storage)
//! - `SUPABASE_ANON_KEY` - Public anon API key of the hosted backend
//! - `STRIPE_SECRET_KEY` - Stripe secret API key
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `SUPABASE_AVATAR_BUCKET` - Storage bucket for avatars (default: avatars)
//! - `STRIPE_CURRENCY` - ISO currency for checkout (default: usd)
//! - `RESEND_API_KEY` - Resend API key; the contact form is disabled without it
//! - `CONTACT_FROM_ADDRESS` - Sender of contact form emails
//! - `CONTACT_TO_ADDRESS` - Inbox receiving contact form emails
//! - `MAPBOX_PUBLIC_TOKEN` - Public Mapbox token; the map is hidden without it
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_CONTACT_FROM: &str = "SinoCoffee Contact <onboarding@resend.dev>";
const DEFAULT_CONTACT_TO: &str = "sidickabdoulayesino1@gmail.com";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront, without trailing slash
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Hosted backend (auth + storage)
    pub supabase: SupabaseConfig,
    /// Stripe Checkout
    pub stripe: StripeConfig,
    /// Contact form delivery
    pub email: EmailConfig,
    /// Public Mapbox token for the locations map
    pub mapbox_token: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: Url,
    /// Anon API key sent as `apikey` on every request
    pub anon_key: SecretString,
    /// Bucket holding user avatars
    pub avatar_bucket: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("avatar_bucket", &self.avatar_bucket)
            .finish()
    }
}

/// Stripe configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (server-side only)
    pub secret_key: SecretString,
    /// Lowercase ISO currency code
    pub currency: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("currency", &self.currency)
            .finish()
    }
}

/// Contact email configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// Resend API key; `None` disables the contact form
    pub resend_api_key: Option<SecretString>,
    /// `From` header of contact emails
    pub from_address: String,
    /// Inbox receiving contact emails
    pub to_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = normalize_base_url(&get_required_env("STOREFRONT_BASE_URL")?);
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let supabase = SupabaseConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;
        let email = EmailConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            supabase,
            stripe,
            email,
            mapbox_token: get_optional_env("MAPBOX_PUBLIC_TOKEN"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the session cookie should be marked `Secure`.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("SUPABASE_URL")?;
        let url = Url::parse(&normalize_base_url(&raw))
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            anon_key: get_required_secret("SUPABASE_ANON_KEY")?,
            avatar_bucket: get_env_or_default("SUPABASE_AVATAR_BUCKET", "avatars"),
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency = get_env_or_default("STRIPE_CURRENCY", "usd").to_lowercase();
        validate_currency(&currency)?;
        Ok(Self {
            secret_key: get_validated_secret("STRIPE_SECRET_KEY")?,
            currency,
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let resend_api_key = match get_optional_env("RESEND_API_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "RESEND_API_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };
        Ok(Self {
            resend_api_key,
            from_address: get_env_or_default("CONTACT_FROM_ADDRESS", DEFAULT_CONTACT_FROM),
            to_address: get_env_or_default("CONTACT_TO_ADDRESS", DEFAULT_CONTACT_TO),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse a sample rate in `[0, 1]`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_rate(&raw).map_err(|msg| ConfigError::InvalidEnvVar(key.to_string(), msg))
}

fn parse_rate(raw: &str) -> Result<f32, String> {
    let rate = raw.trim().parse::<f32>().map_err(|e| e.to_string())?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(format!("must be between 0 and 1 (got {rate})"))
    }
}

/// Strip trailing slashes so URLs can be joined with `format!`.
fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn validate_currency(currency: &str) -> Result<(), ConfigError> {
    if currency.len() == 3 && currency.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar(
            "STRIPE_CURRENCY".to_string(),
            format!("expected a three-letter ISO code, got '{currency}'"),
        ))
    }
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Config with dummy values for unit tests elsewhere in the crate.
    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/sinocoffee"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            supabase: SupabaseConfig {
                url: Url::parse("https://abc.supabase.co").unwrap(),
                anon_key: SecretString::from("anon_key_value"),
                avatar_bucket: "avatars".to_string(),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test_51HqLyjWDarjtT1zdp7dc"),
                currency: "usd".to_string(),
            },
            email: EmailConfig {
                resend_api_key: None,
                from_address: DEFAULT_CONTACT_FROM.to_string(),
                to_address: DEFAULT_CONTACT_TO.to_string(),
            },
            mapbox_token: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-stripe-key-here", "STRIPE_SECRET_KEY").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_accepts_stripe_style_key() {
        assert!(validate_secret_strength("sk_test_51HqLyjWDarjtT1zdp7dcXYZ", "STRIPE_SECRET_KEY").is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_ok());
    }

    #[test]
    fn test_parse_rate_bounds() {
        assert!((parse_rate("0.25").unwrap() - 0.25).abs() < f32::EPSILON);
        assert!(parse_rate("1.5").is_err());
        assert!(parse_rate("-0.1").is_err());
        assert!(parse_rate("abc").is_err());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" https://sinocoffee.com/ "), "https://sinocoffee.com");
        assert_eq!(normalize_base_url("http://localhost:3000"), "http://localhost:3000");
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("usd").is_ok());
        assert!(validate_currency("USD").is_err());
        assert!(validate_currency("dollars").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        let mut config = test_config();
        assert!(!config.is_https());
        config.base_url = "https://sinocoffee.com".to_string();
        assert!(config.is_https());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut config = test_config();
        config.email.resend_api_key = Some(SecretString::from("re_super_secret_value"));
        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("anon_key_value"));
        assert!(!debug_output.contains("sk_test_51HqLyjWDarjtT1zdp7dc"));
        assert!(!debug_output.contains("re_super_secret_value"));
        assert!(!debug_output.contains("postgres://localhost"));
    }
}
