use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub sheet_id: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub target_url: String,
    pub listing_path: String,
    pub cdp_url: String,
    /// Request headers applied to the automated tab. Values may carry
    /// session cookies, so `Debug` prints only the header names.
    pub extra_headers: Vec<(String, String)>,
    /// `None` disables screenshot capture.
    pub diagnostics_dir: Option<PathBuf>,
    pub login_timeout_ticks: u32,
    pub login_poll_ms: u64,
    pub navigation_timeout_secs: u64,
    pub settle_navigation_ms: u64,
    pub settle_click_ms: u64,
    pub settle_input_ms: u64,
    pub sheets_base_url: String,
    pub sheets_timeout_secs: u64,
    pub sheets_max_retries: u32,
    pub sheets_retry_backoff_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self
            .extra_headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect();

        f.debug_struct("AppConfig")
            .field("sheet_id", &self.sheet_id)
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("target_url", &self.target_url)
            .field("listing_path", &self.listing_path)
            .field("cdp_url", &self.cdp_url)
            .field("extra_headers", &header_names)
            .field("diagnostics_dir", &self.diagnostics_dir)
            .field("login_timeout_ticks", &self.login_timeout_ticks)
            .field("login_poll_ms", &self.login_poll_ms)
            .field("navigation_timeout_secs", &self.navigation_timeout_secs)
            .field("settle_navigation_ms", &self.settle_navigation_ms)
            .field("settle_click_ms", &self.settle_click_ms)
            .field("settle_input_ms", &self.settle_input_ms)
            .field("sheets_base_url", &self.sheets_base_url)
            .field("sheets_timeout_secs", &self.sheets_timeout_secs)
            .field("sheets_max_retries", &self.sheets_max_retries)
            .field("sheets_retry_backoff_ms", &self.sheets_retry_backoff_ms)
            .finish()
    }
}
