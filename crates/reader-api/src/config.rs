//! §6 Environment, scaled down from `riptide-config::env::EnvConfigLoader`
//! to the handful of settings this gateway actually has.

/// Gateway-wide configuration, loaded once at startup from the process
/// environment.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// `SEARXNG_INSTANCE_URL` (§6), default `http://localhost:8080`.
    pub searxng_instance_url: String,
    /// `PORT` (§6), default `8080`.
    pub port: u16,
    /// Not in §6 directly but required to reach the out-of-scope headless
    /// rendering collaborator; see `remote_browser`.
    pub headless_service_url: String,
    /// Root of `local-storage/instant-screenshots` (§6 Persisted state).
    pub screenshot_root: std::path::PathBuf,
    /// This gateway's own advertised host, used by C7's self-crawl check
    /// and to build screenshot URLs.
    pub host: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        let port = std::env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(8080);
        Self {
            searxng_instance_url: std::env::var("SEARXNG_INSTANCE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            port,
            headless_service_url: std::env::var("HEADLESS_SERVICE_URL").unwrap_or_else(|_| "http://localhost:9222".to_string()),
            screenshot_root: std::env::var("SCREENSHOT_ROOT")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|_| std::path::PathBuf::from("local-storage/instant-screenshots")),
            host: std::env::var("GATEWAY_HOST").unwrap_or_else(|_| format!("localhost:{port}")),
        }
    }
}
