//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::cache::CacheConfig;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "kinoteka";
const ENV_PREFIX: &str = "KINOTEKA";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_ELASTIC_URL: &str = "http://127.0.0.1:9200";
const DEFAULT_ELASTIC_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_REDIS_POOL_SIZE: usize = 16;
const DEFAULT_REDIS_TIMEOUT_MS: u64 = 1_000;

/// Command-line arguments for the Kinoteka binary.
#[derive(Debug, Parser)]
#[command(name = "kinoteka", version, about = "Read-only film catalogue API")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "KINOTEKA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the Elasticsearch base URL.
    #[arg(long = "elastic-url", value_name = "URL")]
    pub elastic_url: Option<String>,

    /// Override the Elasticsearch request timeout.
    #[arg(long = "elastic-timeout-ms", value_name = "MILLIS")]
    pub elastic_timeout_ms: Option<u64>,

    /// Use Redis at this URL for the result cache.
    #[arg(long = "redis-url", value_name = "URL")]
    pub redis_url: Option<String>,

    /// Override the Redis connection pool size.
    #[arg(long = "redis-pool-size", value_name = "COUNT")]
    pub redis_pool_size: Option<usize>,

    /// Toggle the result cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the film cache lifetime.
    #[arg(long = "cache-film-ttl-seconds", value_name = "SECONDS")]
    pub cache_film_ttl_seconds: Option<u64>,

    /// Override the genre cache lifetime.
    #[arg(long = "cache-genre-ttl-seconds", value_name = "SECONDS")]
    pub cache_genre_ttl_seconds: Option<u64>,

    /// Override the person cache lifetime.
    #[arg(long = "cache-person-ttl-seconds", value_name = "SECONDS")]
    pub cache_person_ttl_seconds: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub elastic: ElasticSettings,
    pub redis: RedisSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ElasticSettings {
    pub url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RedisSettings {
    /// `None` keeps the cache in process memory.
    pub url: Option<Url>,
    pub pool_size: usize,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub film_ttl: Duration,
    pub genre_ttl: Duration,
    pub person_ttl: Duration,
    pub memory_capacity: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_serve_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    elastic: RawElasticSettings,
    redis: RawRedisSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.elastic_url.as_ref() {
            self.elastic.url = Some(url.clone());
        }
        if let Some(timeout) = overrides.elastic_timeout_ms {
            self.elastic.timeout_ms = Some(timeout);
        }
        if let Some(url) = overrides.redis_url.as_ref() {
            self.redis.url = Some(url.clone());
        }
        if let Some(size) = overrides.redis_pool_size {
            self.redis.pool_size = Some(size);
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(ttl) = overrides.cache_film_ttl_seconds {
            self.cache.film_ttl_seconds = Some(ttl);
        }
        if let Some(ttl) = overrides.cache_genre_ttl_seconds {
            self.cache.genre_ttl_seconds = Some(ttl);
        }
        if let Some(ttl) = overrides.cache_person_ttl_seconds {
            self.cache.person_ttl_seconds = Some(ttl);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            elastic,
            redis,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            elastic: build_elastic_settings(elastic)?,
            redis: build_redis_settings(redis)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    let graceful_shutdown = positive_duration(
        graceful_secs,
        Duration::from_secs,
        "server.graceful_shutdown_seconds",
    )?;

    Ok(ServerSettings {
        addr,
        graceful_shutdown,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_elastic_settings(elastic: RawElasticSettings) -> Result<ElasticSettings, LoadError> {
    let raw_url = non_blank(elastic.url).unwrap_or_else(|| DEFAULT_ELASTIC_URL.to_string());
    let url = parse_url(&raw_url, &["http", "https"], "elastic.url")?;

    let timeout = positive_duration(
        elastic.timeout_ms.unwrap_or(DEFAULT_ELASTIC_TIMEOUT_MS),
        Duration::from_millis,
        "elastic.timeout_ms",
    )?;

    Ok(ElasticSettings { url, timeout })
}

fn build_redis_settings(redis: RawRedisSettings) -> Result<RedisSettings, LoadError> {
    let url = non_blank(redis.url)
        .map(|raw| parse_url(&raw, &["redis", "rediss"], "redis.url"))
        .transpose()?;

    let pool_size = redis.pool_size.unwrap_or(DEFAULT_REDIS_POOL_SIZE);
    if pool_size == 0 {
        return Err(LoadError::invalid(
            "redis.pool_size",
            "must be greater than zero",
        ));
    }

    let timeout = positive_duration(
        redis.timeout_ms.unwrap_or(DEFAULT_REDIS_TIMEOUT_MS),
        Duration::from_millis,
        "redis.timeout_ms",
    )?;

    Ok(RedisSettings {
        url,
        pool_size,
        timeout,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let defaults = CacheConfig::default();
    let film_ttl = positive_duration(
        cache.film_ttl_seconds.unwrap_or(defaults.film_ttl_seconds),
        Duration::from_secs,
        "cache.film_ttl_seconds",
    )?;
    let genre_ttl = positive_duration(
        cache.genre_ttl_seconds.unwrap_or(defaults.genre_ttl_seconds),
        Duration::from_secs,
        "cache.genre_ttl_seconds",
    )?;
    let person_ttl = positive_duration(
        cache.person_ttl_seconds.unwrap_or(defaults.person_ttl_seconds),
        Duration::from_secs,
        "cache.person_ttl_seconds",
    )?;

    let memory_capacity =
        NonZeroUsize::new(cache.memory_capacity.unwrap_or(defaults.memory_capacity)).ok_or_else(
            || LoadError::invalid("cache.memory_capacity", "must be greater than zero"),
        )?;

    Ok(CacheSettings {
        enabled: cache.enabled.unwrap_or(defaults.enabled),
        film_ttl,
        genre_ttl,
        person_ttl,
        memory_capacity,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawElasticSettings {
    url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRedisSettings {
    url: Option<String>,
    pool_size: Option<usize>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    film_ttl_seconds: Option<u64>,
    genre_ttl_seconds: Option<u64>,
    person_ttl_seconds: Option<u64>,
    memory_capacity: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_url(raw: &str, schemes: &[&str], key: &'static str) -> Result<Url, LoadError> {
    let url = Url::parse(raw)
        .map_err(|err| LoadError::invalid(key, format!("invalid url `{raw}`: {err}")))?;
    if !schemes.contains(&url.scheme()) {
        return Err(LoadError::invalid(
            key,
            format!(
                "unsupported scheme `{}`, expected one of {}",
                url.scheme(),
                schemes.join(", ")
            ),
        ));
    }
    Ok(url)
}

fn positive_duration(
    value: u64,
    unit: fn(u64) -> Duration,
    key: &'static str,
) -> Result<Duration, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    Ok(unit(value))
}
