use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub asset_base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub store_url: String,
    pub api: ApiConfig,
    /// Code that upgrades a self-registration to VENDEDOR.
    pub codigo_vendedor: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let api = ApiConfig {
            base_url: std::env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api".into()),
            asset_base_url: std::env::var("ASSET_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let store_url =
            std::env::var("STORE_URL").unwrap_or_else(|_| "sqlite://dulces_mila.db".into());
        let codigo_vendedor =
            std::env::var("CODIGO_VENDEDOR").unwrap_or_else(|_| "MILA2025".into());

        anyhow::ensure!(
            api.base_url.starts_with("http://") || api.base_url.starts_with("https://"),
            "API_BASE_URL must be an http(s) url, got {}",
            api.base_url
        );

        Ok(Self {
            store_url,
            api,
            codigo_vendedor,
        })
    }
}
