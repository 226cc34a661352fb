use lettre::message::Mailbox;
use once_cell::sync::Lazy;
use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroize;

pub static CONF: Lazy<Config> = Lazy::new(|| Config::from_env().expect("Failed to load config"));

const DB_USERNAME_VAR: &str = "GUARDIANS_DB_USERNAME";
const DB_PASSWORD_VAR: &str = "GUARDIANS_DB_PASSWORD";
const DB_HOSTNAME_VAR: &str = "GUARDIANS_DB_HOSTNAME";
const DB_PORT_VAR: &str = "GUARDIANS_DB_PORT";
const DB_NAME_VAR: &str = "GUARDIANS_DB_NAME";
const DB_MAX_CONNECTIONS_VAR: &str = "GUARDIANS_DB_MAX_CONNECTIONS";
const DB_IDLE_TIMEOUT_SECS_VAR: &str = "GUARDIANS_DB_IDLE_TIMEOUT_SECS";

const EMAIL_ENABLED_VAR: &str = "GUARDIANS_EMAIL_ENABLED";
const EMAIL_FROM_ADDR_VAR: &str = "GUARDIANS_EMAIL_FROM_ADDR";
const EMAIL_REPLY_TO_ADDR_VAR: &str = "GUARDIANS_EMAIL_REPLY_TO_ADDR";
const SMTP_ADDRESS_VAR: &str = "GUARDIANS_SMTP_ADDRESS";
const SMTP_USERNAME_VAR: &str = "GUARDIANS_SMTP_USERNAME";
const SMTP_PASSWORD_VAR: &str = "GUARDIANS_SMTP_PASSWORD";
const MAX_SMTP_CONNECTIONS_VAR: &str = "GUARDIANS_MAX_SMTP_CONNECTIONS";
const SMTP_IDLE_TIMEOUT_SECS_VAR: &str = "GUARDIANS_SMTP_IDLE_TIMEOUT_SECS";

const RECOVERY_URL_VAR: &str = "GUARDIANS_RECOVERY_URL";

const HORIZON_URL_VAR: &str = "GUARDIANS_HORIZON_URL";
const NETWORK_PASSPHRASE_VAR: &str = "GUARDIANS_NETWORK_PASSPHRASE";
const HORIZON_TIMEOUT_SECS_VAR: &str = "GUARDIANS_HORIZON_TIMEOUT_SECS";

const ACTIX_WORKER_COUNT_VAR: &str = "GUARDIANS_ACTIX_WORKER_COUNT";
const LOG_LEVEL_VAR: &str = "GUARDIANS_LOG_LEVEL";
const HEALTH_ENDPOINT_KEY_VAR: &str = "GUARDIANS_HEALTH_ENDPOINT_KEY";

const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";

#[derive(Zeroize)]
pub struct ConfigInner {
    pub db_username: String,
    pub db_password: String,
    pub db_hostname: String,
    #[zeroize(skip)]
    pub db_port: u16,
    pub db_name: String,
    #[zeroize(skip)]
    pub db_max_connections: u32,
    #[zeroize(skip)]
    pub db_idle_timeout: Duration,

    #[zeroize(skip)]
    pub email_enabled: bool,
    #[zeroize(skip)]
    pub email_from_address: Mailbox,
    #[zeroize(skip)]
    pub email_reply_to_address: Mailbox,
    pub smtp_address: String,
    pub smtp_username: String,
    pub smtp_password: String,
    #[zeroize(skip)]
    pub max_smtp_connections: u32,
    #[zeroize(skip)]
    pub smtp_idle_timeout: Duration,

    #[zeroize(skip)]
    pub recovery_url: String,

    #[zeroize(skip)]
    pub horizon_url: String,
    #[zeroize(skip)]
    pub network_passphrase: String,
    #[zeroize(skip)]
    pub horizon_timeout: Duration,

    #[zeroize(skip)]
    pub actix_worker_count: usize,
    #[zeroize(skip)]
    pub log_level: String,
    pub health_endpoint_key: String,
}

impl ConfigInner {
    pub fn database_uri(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db_username, self.db_password, self.db_hostname, self.db_port, self.db_name,
        )
    }
}

pub struct Config {
    inner: UnsafeCell<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        // Safe as long as `unsafe Config::zeroize()` hasn't been called
        unsafe { &*self.inner.get() }
    }
}

// Safe to be shared across threads as long as `unsafe Config::zeroize()` hasn't been called
unsafe impl Sync for Config {}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        let email_enabled = if cfg!(test) {
            false
        } else {
            env_var(EMAIL_ENABLED_VAR)?
        };

        let email_from_address: Mailbox = env_var::<String>(EMAIL_FROM_ADDR_VAR)?
            .parse()
            .map_err(|_| ConfigError::InvalidVar(EMAIL_FROM_ADDR_VAR))?;
        let email_reply_to_address: Mailbox = env_var::<String>(EMAIL_REPLY_TO_ADDR_VAR)?
            .parse()
            .map_err(|_| ConfigError::InvalidVar(EMAIL_REPLY_TO_ADDR_VAR))?;

        // SMTP settings are only needed when emails actually go out
        let (smtp_address, smtp_username, smtp_password) = if email_enabled {
            (
                env_var(SMTP_ADDRESS_VAR)?,
                env_var(SMTP_USERNAME_VAR)?,
                env_var(SMTP_PASSWORD_VAR)?,
            )
        } else {
            (String::new(), String::new(), String::new())
        };

        let inner = ConfigInner {
            db_username: env_var(DB_USERNAME_VAR)?,
            db_password: env_var(DB_PASSWORD_VAR)?,
            db_hostname: env_var(DB_HOSTNAME_VAR)?,
            db_port: env_var(DB_PORT_VAR)?,
            db_name: env_var(DB_NAME_VAR)?,
            db_max_connections: env_var_or(DB_MAX_CONNECTIONS_VAR, 48),
            db_idle_timeout: Duration::from_secs(env_var_or(DB_IDLE_TIMEOUT_SECS_VAR, 30)),

            email_enabled,
            email_from_address,
            email_reply_to_address,
            smtp_address,
            smtp_username,
            smtp_password,
            max_smtp_connections: env_var_or(MAX_SMTP_CONNECTIONS_VAR, 24),
            smtp_idle_timeout: Duration::from_secs(env_var_or(SMTP_IDLE_TIMEOUT_SECS_VAR, 60)),

            recovery_url: env_var(RECOVERY_URL_VAR)?,

            horizon_url: env_var_or(HORIZON_URL_VAR, String::from(DEFAULT_HORIZON_URL)),
            network_passphrase: env_var_or(
                NETWORK_PASSPHRASE_VAR,
                String::from(guardians_common::stellar::TESTNET_PASSPHRASE),
            ),
            horizon_timeout: Duration::from_secs(env_var_or(HORIZON_TIMEOUT_SECS_VAR, 10)),

            actix_worker_count: env_var_or(ACTIX_WORKER_COUNT_VAR, num_cpus::get()),
            log_level: env_var_or(LOG_LEVEL_VAR, String::from("info")),
            health_endpoint_key: env_var(HEALTH_ENDPOINT_KEY_VAR)?,
        };

        Ok(Config {
            inner: UnsafeCell::new(inner),
        })
    }

    /// # Safety
    ///
    /// Safe only if the Config isn't being used by other threads or across an async
    /// boundary. Generally, this should only be used at the end of the main function once
    /// all threads have been joined.
    pub unsafe fn zeroize(&self) {
        unsafe {
            (*self.inner.get()).zeroize();
        }
    }
}

fn env_var<T: FromStr>(key: &'static str) -> Result<T, ConfigError> {
    let var = std::env::var(key).map_err(|_| ConfigError::missing(key))?;
    let var: T = var.parse().map_err(|_| ConfigError::invalid(key))?;
    Ok(var)
}

fn env_var_or<T: FromStr>(key: &'static str, default: T) -> T {
    let Ok(var) = std::env::var(key) else {
        return default;
    };

    var.parse().unwrap_or(default)
}

#[derive(Clone, Copy, Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar(&'static str),
}

impl ConfigError {
    fn missing(var_name: &'static str) -> Self {
        Self::MissingVar(var_name)
    }

    fn invalid(var_name: &'static str) -> Self {
        Self::InvalidVar(var_name)
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(key) => write!(f, "Missing environment variable '{}'", key),
            Self::InvalidVar(key) => write!(f, "Environment variable '{}' is invalid", key),
        }
    }
}
