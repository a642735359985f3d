use std::path::Path;

use serde::Deserialize;

/// Placeholder substituted with the camera id in `live.stream_url_template`.
pub const CAMERA_ID_PLACEHOLDER: &str = "{camera_id}";

const MAX_SUBSCRIBER_BUFFER: usize = 65_536;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Capacity of each camera's pending queue, seen per subscriber.
    pub subscriber_buffer: usize,
    /// Fallback `liveStream` URL when the producer does not send one.
    pub stream_url_template: String,
    pub lookup_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub live: LiveConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

/// Loads the configuration: embedded defaults -> inspection-live.toml -> $INSPECTION_LIVE_CONFIG -> env.
pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let custom_path = std::env::var("INSPECTION_LIVE_CONFIG").ok();
    load_with(custom_path.as_deref().map(Path::new))
}

/// Same layering as [`load`], with an explicit override file instead of the env lookup.
pub fn load_with(custom_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: inspection-live.toml (in CWD)
        .add_source(::config::File::with_name("inspection-live").required(false));

    if let Some(path) = custom_path {
        builder = builder.add_source(::config::File::from(path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(::config::Environment::with_prefix("INSPECTION_LIVE").separator("__"));

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Live
    if cfg.live.subscriber_buffer == 0 || cfg.live.subscriber_buffer > MAX_SUBSCRIBER_BUFFER {
        return Err(anyhow::anyhow!(
            "live.subscriber_buffer must be in 1..={}",
            MAX_SUBSCRIBER_BUFFER
        ));
    }
    if cfg.live.lookup_timeout_ms == 0 {
        return Err(anyhow::anyhow!("live.lookup_timeout_ms must be > 0"));
    }
    if !cfg.live.stream_url_template.contains(CAMERA_ID_PLACEHOLDER) {
        return Err(anyhow::anyhow!(
            "live.stream_url_template must contain {}",
            CAMERA_ID_PLACEHOLDER
        ));
    }

    Ok(())
}

pub fn ensure_sqlite_parent_dir(url: &str) -> anyhow::Result<()> {
    if let Some(path) = url.strip_prefix("sqlite://") {
        // sqlite:///C:/... on Windows
        #[cfg(windows)]
        let path = {
            let bytes = path.as_bytes();
            if bytes.len() >= 3 && bytes[0] == b'/' && bytes[2] == b':' && bytes[1].is_ascii_alphabetic() {
                &path[1..]
            } else {
                path
            }
        };
        let p = Path::new(path.split('?').next().unwrap_or(path));
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }
    Ok(())
}
