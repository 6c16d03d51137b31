use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::http::request::DEFAULT_BUFFER_SIZE;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_ENV: &str = "RAWHTTP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP port to listen on, all interfaces
    pub port: u16,
    /// Capacity of the per-connection request line buffer
    pub read_buffer_size: usize,
    /// Directory the `/video` route reads from
    pub assets_dir: PathBuf,
    /// Base URL that `/httpbin/*` requests are forwarded to
    pub upstream_url: String,
    /// Largest chunk written when streaming an upstream body
    pub proxy_chunk_size: usize,
    pub upstream_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8888,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            assets_dir: PathBuf::from("assets"),
            upstream_url: "http://httpbin.org".to_string(),
            proxy_chunk_size: 32,
            upstream_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Loads the file named by `RAWHTTP_CONFIG` if set, then applies the
    /// `PORT`, `ASSETS_DIR` and `UPSTREAM_URL` overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(port) = std::env::var("PORT") {
            cfg.port = port
                .parse()
                .with_context(|| format!("invalid PORT value {port:?}"))?;
        }
        if let Ok(dir) = std::env::var("ASSETS_DIR") {
            cfg.assets_dir = PathBuf::from(dir);
        }
        if let Ok(upstream) = std::env::var("UPSTREAM_URL") {
            cfg.upstream_url = upstream;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.read_buffer_size == 0 {
            anyhow::bail!("read_buffer_size must be greater than zero");
        }
        if self.proxy_chunk_size == 0 {
            anyhow::bail!("proxy_chunk_size must be greater than zero");
        }

        let url = url::Url::parse(&self.upstream_url)
            .with_context(|| format!("invalid upstream_url {:?}", self.upstream_url))?;
        if url.scheme() != "http" {
            anyhow::bail!("upstream_url must use http, got {}", url.scheme());
        }
        if url.host_str().is_none() {
            anyhow::bail!("upstream_url is missing a host");
        }
        Ok(())
    }
}
