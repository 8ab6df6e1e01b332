use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rpc: RpcConfig,
    #[serde(default)]
    pub price: PriceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_max_addresses")]
    pub max_addresses: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            max_addresses: default_max_addresses(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    3000
}

fn default_max_addresses() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct RpcConfig {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct PriceConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_feed_timeout_ms")]
    pub feed_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            feed_timeout_ms: default_feed_timeout_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_feed_url() -> String {
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd,cny".to_string()
}

fn default_feed_timeout_ms() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

impl Config {
    pub fn load(path: &str) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> eyre::Result<()> {
        if self.api.port == 0 {
            return Err(eyre::eyre!("api.port must be non-zero"));
        }
        if self.api.max_addresses == 0 {
            return Err(eyre::eyre!("api.max_addresses must be at least 1"));
        }
        if self.rpc.request_timeout_ms == 0 {
            return Err(eyre::eyre!("rpc.request_timeout_ms must be non-zero"));
        }
        if !self.price.feed_url.starts_with("http") {
            return Err(eyre::eyre!(
                "price.feed_url must be an HTTP URL, got '{}'",
                self.price.feed_url
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[api]
host = "127.0.0.1"
port = 8080

[rpc]
request_timeout_ms = 5000

[price]
cache_ttl_secs = 60
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.max_addresses, 50); // default
        assert_eq!(config.rpc.request_timeout_ms, 5000);
        assert_eq!(config.price.cache_ttl_secs, 60);
        assert!(config.price.feed_url.contains("coingecko")); // default
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.rpc.request_timeout_ms, 10_000);
        assert_eq!(config.price.cache_ttl_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.api.max_addresses = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.price.feed_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }
}
