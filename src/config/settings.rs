//! Configuration settings for Gammabots.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix for environment overrides, e.g. `GAMMABOTS__API__BASE_URL`.
const ENV_PREFIX: &str = "GAMMABOTS";

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API configuration.
    pub api: ApiConfig,
    /// Bearer credential configuration.
    pub auth: AuthConfig,
    /// Wallet JSON-RPC configuration.
    pub wallet: WalletConfig,
    /// Mint workflow timings and limits.
    pub mint: MintConfig,
    /// UI configuration.
    pub ui: UiConfig,
    /// Key bindings.
    pub keybindings: KeyBindings,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    /// for anything not set.
    pub fn load_or_default() -> crate::Result<Self> {
        Self::load(None)
    }

    /// Load configuration from file and environment.
    ///
    /// The file is optional. Environment variables prefixed with
    /// `GAMMABOTS__` override file values, using `__` as the nesting separator.
    pub fn load(path: Option<PathBuf>) -> crate::Result<Self> {
        let config_path = path.unwrap_or_else(Self::default_path);

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(config_path).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| crate::Error::config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| crate::Error::config(e.to_string()))
    }

    /// Save configuration to file.
    pub fn save(&self, path: Option<PathBuf>) -> crate::Result<()> {
        let config_path = path.unwrap_or_else(Self::default_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::config(e.to_string()))?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    fn default_path() -> PathBuf {
        super::config_dir()
            .map(|p| p.join("config.toml"))
            .unwrap_or_else(|_| PathBuf::from("config.toml"))
    }
}

/// Backend API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Gammabots backend base URL.
    pub base_url: String,
    /// API key attached to every backend request.
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Rate limit (requests per second).
    pub rate_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gammabots.xyz".to_string(),
            api_key: None,
            timeout_secs: 30,
            rate_limit: 10,
        }
    }
}

/// Bearer credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token, takes precedence over `token_env`.
    pub token: Option<String>,
    /// Name of the environment variable holding the bearer token.
    pub token_env: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: "GAMMABOTS_TOKEN".to_string(),
        }
    }
}

/// Wallet configuration.
///
/// Without an `rpc_url` the terminal runs without a wallet and minting is
/// skipped after validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// JSON-RPC endpoint of a wallet that manages accounts (EIP-1193 style).
    pub rpc_url: Option<String>,
    /// Strategy NFT contract address (0x-prefixed hex).
    pub contract_address: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: "0x0000000000000000000000000000000000000000".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Mint workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Maximum strategy length in characters.
    pub max_strategy_chars: usize,
    /// Interval between mint status polls in milliseconds.
    pub poll_interval_ms: u64,
    /// How long to wait for on-chain confirmation before giving up, in seconds.
    pub confirm_timeout_secs: u64,
    /// Delay between the timeout warning and the redirect, in milliseconds.
    pub redirect_delay_ms: u64,
}

impl MintConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            max_strategy_chars: 5000,
            poll_interval_ms: 1000,
            confirm_timeout_secs: 60,
            redirect_delay_ms: 2000,
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Tick rate in milliseconds for UI updates.
    pub tick_rate_ms: u64,
    /// Enable mouse support.
    pub mouse_support: bool,
    /// Show status bar.
    pub show_status_bar: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            mouse_support: true,
            show_status_bar: true,
        }
    }
}

/// Key bindings configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Quit the application.
    pub quit: String,
    /// Show help.
    pub help: String,
    /// Navigate up.
    pub up: String,
    /// Navigate down.
    pub down: String,
    /// Cancel/back.
    pub back: String,
    /// Refresh data.
    pub refresh: String,
    /// Switch to mint view.
    pub mint: String,
    /// Switch to strategies view.
    pub strategies: String,
    /// Start editing the strategy text.
    pub edit: String,
    /// Submit the strategy for minting.
    pub submit: String,
    /// Clear the strategy text.
    pub clear: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "?".to_string(),
            up: "k".to_string(),
            down: "j".to_string(),
            back: "Esc".to_string(),
            refresh: "r".to_string(),
            mint: "1".to_string(),
            strategies: "2".to_string(),
            edit: "i".to_string(),
            submit: "Ctrl+s".to_string(),
            clear: "Ctrl+x".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir().join(format!("gammabots-{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_mint_defaults() {
        let mint = MintConfig::default();
        assert_eq!(mint.max_strategy_chars, 5000);
        assert_eq!(mint.poll_interval(), Duration::from_secs(1));
        assert_eq!(mint.confirm_timeout(), Duration::from_secs(60));
        assert_eq!(mint.redirect_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = Config::load(Some(scratch_path())).unwrap();
        assert_eq!(config.mint, MintConfig::default());
        assert!(config.wallet.rpc_url.is_none());
        assert_eq!(config.auth.token_env, "GAMMABOTS_TOKEN");
    }

    #[test]
    fn test_load_partial_file() {
        let path = scratch_path();
        std::fs::write(
            &path,
            "[api]\nbase_url = \"http://localhost:4000\"\n\n[mint]\nconfirm_timeout_secs = 90\n",
        )
        .unwrap();

        let config = Config::load(Some(path.clone())).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:4000");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.mint.confirm_timeout_secs, 90);
        assert_eq!(config.mint.poll_interval_ms, 1000);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_save_and_reload() {
        let path = scratch_path();
        let mut config = Config::default();
        config.wallet.rpc_url = Some("http://127.0.0.1:8545".to_string());
        config.keybindings.submit = "Ctrl+Enter".to_string();
        config.save(Some(path.clone())).unwrap();

        let loaded = Config::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.wallet.rpc_url.as_deref(), Some("http://127.0.0.1:8545"));
        assert_eq!(loaded.keybindings.submit, "Ctrl+Enter");

        std::fs::remove_file(path).ok();
    }
}
