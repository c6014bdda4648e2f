use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::features::regions::models::Region;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    /// Only required when the loader or stations services are enabled
    pub database: Option<DatabaseConfig>,
    pub swagger: SwaggerConfig,
    pub sources: SourcesConfig,
    pub aggregator: AggregatorConfig,
    pub loader: LoaderConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    pub enabled_services: Vec<ServiceKind>,
}

/// HTTP surfaces the binary can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// `/health`, `/{region}/records`, `/api/search/{region}`
    Regions,
    /// `/api/search`
    Aggregator,
    /// `/load`, `/clear`, `/api/load`
    Loader,
    /// `/api/stations`
    Stations,
}

impl ServiceKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "regions" | "region" => Some(Self::Regions),
            "aggregator" | "search" => Some(Self::Aggregator),
            "loader" | "load" => Some(Self::Loader),
            "stations" => Some(Self::Stations),
            _ => None,
        }
    }

    pub fn needs_database(&self) -> bool {
        matches!(self, Self::Loader | Self::Stations)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Location of each region's source file
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    pub cat_path: PathBuf,
    pub gal_path: PathBuf,
    pub cv_path: PathBuf,
    /// Field delimiter of the GAL CSV
    pub csv_delimiter: u8,
}

/// A downstream region search service the aggregator fans out to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionEndpoint {
    pub name: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub endpoints: Vec<RegionEndpoint>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Stations written before the pending batch is committed
    pub batch_size: usize,
    /// Rows deleted per round trip by `clear`
    pub clear_page_size: i64,
}

/// Nominatim geocoding, used for stations without genuine coordinates
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Minimum spacing between two Nominatim requests
    pub min_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        let app = AppConfig::from_env()?;

        let database = match env::var("DATABASE_URL") {
            Ok(_) => Some(DatabaseConfig::from_env()?),
            Err(_) if app.enabled_services.iter().any(ServiceKind::needs_database) => {
                return Err(
                    "DATABASE_URL must be set when the loader or stations services are enabled"
                        .to_string(),
                );
            }
            Err(_) => None,
        };

        let aggregator = AggregatorConfig::from_env(&app)?;

        Ok(Config {
            app,
            database,
            swagger: SwaggerConfig::from_env()?,
            sources: SourcesConfig::from_env()?,
            aggregator,
            loader: LoaderConfig::from_env()?,
            geocoding: GeocodingConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 20 * 1024 * 1024; // 20MB
    const DEFAULT_SERVICES: &'static str = "regions,aggregator,loader,stations";

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5004".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let enabled_services = parse_services(
            &env::var("ENABLED_SERVICES").unwrap_or_else(|_| Self::DEFAULT_SERVICES.to_string()),
        )?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            enabled_services,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_enabled(&self, kind: ServiceKind) -> bool {
        self.enabled_services.contains(&kind)
    }
}

fn parse_services(raw: &str) -> Result<Vec<ServiceKind>, String> {
    let mut services = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = ServiceKind::parse(part)
            .ok_or_else(|| format!("Unknown service '{}' in ENABLED_SERVICES", part))?;
        if !services.contains(&kind) {
            services.push(kind);
        }
    }
    if services.is_empty() {
        return Err("ENABLED_SERVICES must name at least one service".to_string());
    }
    Ok(services)
}

impl DatabaseConfig {
    // Default values for database connection pool (conservative defaults for small-medium apps)
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: env_number("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: env_number("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: env_number(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: env_number("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: env_number("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "ITV Directory API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Search and load vehicle inspection stations of Catalonia, Galicia and the Valencian Community"
                .to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl SourcesConfig {
    pub fn from_env() -> Result<Self, String> {
        let delimiter = env::var("GAL_CSV_DELIMITER").unwrap_or_else(|_| ";".to_string());
        let csv_delimiter = match delimiter.as_bytes() {
            [b] => *b,
            _ => return Err("GAL_CSV_DELIMITER must be a single ASCII character".to_string()),
        };

        Ok(Self {
            cat_path: env_path("CAT_SOURCE_PATH", "data/ITV-CAT.xml"),
            gal_path: env_path("GAL_SOURCE_PATH", "data/Estacions_ITV.csv"),
            cv_path: env_path("CV_SOURCE_PATH", "data/estaciones.json"),
            csv_delimiter,
        })
    }

    pub fn path_for(&self, region: Region) -> &PathBuf {
        match region {
            Region::Cat => &self.cat_path,
            Region::Gal => &self.gal_path,
            Region::Cv => &self.cv_path,
        }
    }
}

impl AggregatorConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 3;

    /// `AGGREGATOR_SERVICES` is a comma separated list of `name=base_url`.
    /// Without it every region is served by this same process.
    pub fn from_env(app: &AppConfig) -> Result<Self, String> {
        let endpoints = match env::var("AGGREGATOR_SERVICES") {
            Ok(raw) if !raw.trim().is_empty() => parse_endpoints(&raw)?,
            _ => {
                let self_url = format!("http://{}", app.server_address());
                Region::ALL
                    .iter()
                    .map(|region| RegionEndpoint {
                        name: region.slug().to_string(),
                        base_url: self_url.clone(),
                    })
                    .collect()
            }
        };

        let timeout_secs = env_number("AGGREGATOR_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            endpoints,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_endpoints(raw: &str) -> Result<Vec<RegionEndpoint>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let (name, url) = entry
                .split_once('=')
                .ok_or_else(|| format!("Invalid AGGREGATOR_SERVICES entry '{}'", entry))?;
            Ok(RegionEndpoint {
                name: name.trim().to_lowercase(),
                base_url: url.trim().trim_end_matches('/').to_string(),
            })
        })
        .collect()
}

impl LoaderConfig {
    const DEFAULT_BATCH_SIZE: usize = 500;
    const DEFAULT_CLEAR_PAGE_SIZE: i64 = 400;

    pub fn from_env() -> Result<Self, String> {
        let batch_size = env_number("LOADER_BATCH_SIZE", Self::DEFAULT_BATCH_SIZE)?;
        let clear_page_size = env_number("LOADER_CLEAR_PAGE_SIZE", Self::DEFAULT_CLEAR_PAGE_SIZE)?;

        if batch_size == 0 || clear_page_size <= 0 {
            return Err("LOADER_BATCH_SIZE and LOADER_CLEAR_PAGE_SIZE must be positive".to_string());
        }

        Ok(Self {
            batch_size,
            clear_page_size,
        })
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            clear_page_size: Self::DEFAULT_CLEAR_PAGE_SIZE,
        }
    }
}

impl GeocodingConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 10;
    // Nominatim usage policy allows one request per second
    const DEFAULT_MIN_INTERVAL_MS: u64 = 1100;

    pub fn from_env() -> Result<Self, String> {
        let enabled = env::var("GEOCODING_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let base_url = env::var("GEOCODING_BASE_URL")
            .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string());
        let user_agent = env::var("GEOCODING_USER_AGENT")
            .unwrap_or_else(|_| "itv-directory/0.1 (station-loader)".to_string());
        let timeout_secs = env_number("GEOCODING_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let min_interval_ms =
            env_number("GEOCODING_MIN_INTERVAL_MS", Self::DEFAULT_MIN_INTERVAL_MS)?;

        Ok(Self {
            enabled,
            base_url,
            user_agent,
            request_timeout: Duration::from_secs(timeout_secs),
            min_interval: Duration::from_millis(min_interval_ms),
        })
    }
}

fn env_number<T>(key: &str, default: T) -> Result<T, String>
where
    T: std::str::FromStr + ToString,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .map_err(|_| format!("{} must be a valid number", key))
}

fn env_path(key: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(key).unwrap_or_else(|_| default.to_string()))
}
