use std::time::Duration;
use url::Url;

pub const DEFAULT_AGE_URL: &str = "https://api.agify.io";
pub const DEFAULT_GENDER_URL: &str = "https://api.genderize.io";
pub const DEFAULT_NATIONALITY_URL: &str = "https://api.nationalize.io";

#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment: "local", "dev" or "prod".
    pub env: String,
    pub database_url: String,
    pub age_service_url: String,
    pub gender_service_url: String,
    pub nationality_service_url: String,
    /// Deadline for a single request's core work.
    pub request_timeout: Duration,
    pub http_address: String,
    /// Upper bound on handling one HTTP request, including body transfer.
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Logs the loaded configuration, without credentials.
    pub fn log_summary(&self) {
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Environment: {}", self.env);
        tracing::debug!("Age service URL: {}", self.age_service_url);
        tracing::debug!("Gender service URL: {}", self.gender_service_url);
        tracing::debug!("Nationality service URL: {}", self.nationality_service_url);
        tracing::debug!("HTTP address: {}", self.http_address);
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match var("DATABASE_URL") {
            Some(url) => {
                if !url.starts_with("postgresql://") && !url.starts_with("postgres://") {
                    anyhow::bail!("DATABASE_URL must start with postgresql:// or postgres://");
                }
                url
            }
            None => {
                let required = |key: &str| {
                    var(key).ok_or_else(|| {
                        anyhow::anyhow!(
                            "{} environment variable required (or set DATABASE_URL)",
                            key
                        )
                    })
                };
                let host = required("PS_PG_DB_HOST")?;
                let port: u16 = required("PS_PG_DB_PORT")?
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PS_PG_DB_PORT must be a valid port number"))?;
                postgres_url(
                    &host,
                    port,
                    &required("PS_PG_DB_USER")?,
                    &required("PS_PG_DB_PASS")?,
                    &required("PS_PG_DB_NAME")?,
                )?
            }
        };

        let service_url = |key: &str, default: &str| -> anyhow::Result<String> {
            let url = var(key).unwrap_or_else(|| default.to_string());
            Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", key, e))?;
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", key);
            }
            Ok(url)
        };

        let request_timeout = match var("PS_CTX_TIMEOUT") {
            Some(secs) => Duration::from_secs(secs.trim().parse().map_err(|_| {
                anyhow::anyhow!("PS_CTX_TIMEOUT must be a whole number of seconds")
            })?),
            None => Duration::from_secs(10),
        };

        let duration = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match var(key) {
                Some(raw) => parse_duration(&raw)
                    .ok_or_else(|| anyhow::anyhow!("{} must be a duration like 4s or 500ms", key)),
                None => Ok(default),
            }
        };

        Ok(Self {
            env: var("PS_ENV").unwrap_or_else(|| "local".to_string()),
            database_url,
            age_service_url: service_url("PS_AGE_URL", DEFAULT_AGE_URL)?,
            gender_service_url: service_url("PS_GENDER_URL", DEFAULT_GENDER_URL)?,
            nationality_service_url: service_url("PS_NATIONALITY_URL", DEFAULT_NATIONALITY_URL)?,
            request_timeout,
            http_address: var("PS_HTTP_SERVER").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            http_timeout: duration("PS_HTTP_TIMEOUT", Duration::from_secs(15))?,
        })
    }
}

/// Builds a Postgres URL from its parts, percent-encoding the credentials.
fn postgres_url(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    db_name: &str,
) -> anyhow::Result<String> {
    let mut url = Url::parse(&format!("postgres://{}", host))
        .map_err(|e| anyhow::anyhow!("PS_PG_DB_HOST is not a valid host: {}", e))?;
    if url.host_str().map_or(true, str::is_empty) || !url.path().is_empty() {
        anyhow::bail!("PS_PG_DB_HOST is not a valid host: {}", host);
    }
    url.set_port(Some(port))
        .map_err(|_| anyhow::anyhow!("PS_PG_DB_PORT cannot be applied to {}", host))?;
    url.set_username(user)
        .map_err(|_| anyhow::anyhow!("PS_PG_DB_USER cannot be applied to {}", host))?;
    url.set_password(Some(password))
        .map_err(|_| anyhow::anyhow!("PS_PG_DB_PASS cannot be applied to {}", host))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("PS_PG_DB_HOST is not a valid host: {}", host))?
        .push(db_name);
    Ok(url.into())
}

/// Parses durations such as `500ms`, `4s`, `2m` or `1h`. A bare number is seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits.parse().ok()?;

    match unit {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        "h" => value.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}
