//! Process configuration.
//!
//! Everything is read once at startup from command-line flags or the environment
//! (a `.env` file is loaded first when present). The API key has no default and
//! must be supplied from outside the binary.
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! photo-describer --bind 127.0.0.1:8080 --timeout-secs 20
//! ```

use clap::Parser;
use std::{fmt, net::SocketAddr, path::PathBuf, time::Duration};

/// Default request-body cap: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Parser, Clone)]
#[command(
    author,
    version,
    about = "Describes uploaded photos in Latvian via a vision API",
    long_about = None
)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "PHOTO_DESCRIBER_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Bearer token for the vision API
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the chat-completion API
    #[arg(long, env = "OPENAI_API_BASE", default_value = "https://api.openai.com/v1")]
    pub api_base: String,

    /// Vision-capable model identifier
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o")]
    pub model: String,

    /// Hard timeout for the outbound API call, in seconds
    #[arg(long, env = "PHOTO_DESCRIBER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Directory for transient image files (defaults to the OS temp dir)
    #[arg(long, env = "PHOTO_DESCRIBER_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Largest accepted request body, in bytes
    #[arg(
        long,
        env = "PHOTO_DESCRIBER_MAX_UPLOAD_BYTES",
        default_value_t = DEFAULT_MAX_UPLOAD_BYTES
    )]
    pub max_upload_bytes: usize,
}

impl Config {
    /// Config suitable for tests and embedding: everything at its default except the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_key: api_key.into(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            timeout_secs: 30,
            temp_dir: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

// Hand-written so the key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temp_dir", &self.temp_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_flags() {
        let config = Config::try_parse_from(["photo-describer", "--api-key", "sk-test"]).unwrap();
        assert_eq!(config.bind, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_trailing_slash_in_api_base() {
        let mut config = Config::with_api_key("sk-test");
        config.api_base = "http://localhost:9000/v1/".to_string();
        assert_eq!(config.completions_url(), "http://localhost:9000/v1/chat/completions");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Config::with_api_key("sk-very-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("sk-very-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_temp_dir_falls_back_to_os_default() {
        let config = Config::with_api_key("sk-test");
        assert_eq!(config.temp_dir(), std::env::temp_dir());
    }
}
