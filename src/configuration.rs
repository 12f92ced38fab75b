use crate::error::ConfigError;

/// Environment variable holding the token signing secret
pub const SECRET_ENV_VAR: &str = "SECRET_KEY";

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Longest accepted token lifetime, in seconds (one year)
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 365 * 24 * 60 * 60;

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_access_expiry")]
    pub access_token_expiry: i64,   // seconds (e.g., 900 for 15 minutes)
    #[serde(default = "default_refresh_expiry")]
    pub refresh_token_expiry: i64,  // seconds (e.g., 86400 for 24 hours)
}

impl JwtSettings {
    /// An empty or missing secret is a fatal startup condition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired(format!(
                "token signing secret ({})",
                SECRET_ENV_VAR
            )));
        }
        if self.issuer.is_empty() {
            return Err(ConfigError::MissingRequired("jwt.issuer".to_string()));
        }
        if self.access_token_expiry <= 0 || self.refresh_token_expiry <= 0 {
            return Err(ConfigError::InvalidValue(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.access_token_expiry > MAX_TOKEN_LIFETIME_SECONDS
            || self.refresh_token_expiry > MAX_TOKEN_LIFETIME_SECONDS
        {
            return Err(ConfigError::InvalidValue(format!(
                "token lifetimes must not exceed {} seconds",
                MAX_TOKEN_LIFETIME_SECONDS
            )));
        }
        if self.access_token_expiry >= self.refresh_token_expiry {
            return Err(ConfigError::InvalidValue(
                "access_token_expiry must be shorter than refresh_token_expiry".to_string(),
            ));
        }
        Ok(())
    }
}

/// Password hashing settings
#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    pub hash_cost: u32,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_issuer() -> String {
    "book_talk".to_string()
}

fn default_access_expiry() -> i64 {
    15 * 60
}

fn default_refresh_expiry() -> i64 {
    24 * 60 * 60
}

/// Loads settings from `configuration.*` (optional), `APP_*` environment
/// variables and the signing secret from `SECRET_KEY`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .set_override_option("jwt.secret", std::env::var(SECRET_ENV_VAR).ok())?
        .build()?;

    let settings = settings.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
