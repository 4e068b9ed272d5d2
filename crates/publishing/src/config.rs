/// Downstream service locations and credentials.
#[derive(Debug, Clone)]
pub struct DownstreamConfig {
    pub publishing_api_url: String,
    pub publishing_api_bearer_token: String,
    pub asset_manager_url: String,
    pub asset_manager_bearer_token: String,
}

impl DownstreamConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                             |
    /// |--------------------------------|-------------------------------------|
    /// | `PUBLISHING_API_URL`           | `http://publishing-api.dev.gov.uk`  |
    /// | `PUBLISHING_API_BEARER_TOKEN`  | `example`                           |
    /// | `ASSET_MANAGER_URL`            | `http://asset-manager.dev.gov.uk`   |
    /// | `ASSET_MANAGER_BEARER_TOKEN`   | `example`                           |
    pub fn from_env() -> Self {
        Self {
            publishing_api_url: env_or("PUBLISHING_API_URL", "http://publishing-api.dev.gov.uk"),
            publishing_api_bearer_token: env_or("PUBLISHING_API_BEARER_TOKEN", "example"),
            asset_manager_url: env_or("ASSET_MANAGER_URL", "http://asset-manager.dev.gov.uk"),
            asset_manager_bearer_token: env_or("ASSET_MANAGER_BEARER_TOKEN", "example"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|_| default.into())
}
