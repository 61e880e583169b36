use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub review_source_base_url: String,
    pub checkpoint_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub crawler_request_timeout_secs: u64,
    pub crawler_user_agent: String,
    pub crawler_max_retries: u32,
    pub crawler_retry_backoff_base_secs: u64,
    pub crawler_max_per_second: usize,
    pub crawler_max_per_minute: usize,
    pub crawler_inter_request_delay_ms: u64,
    pub crawler_inter_series_delay_ms: u64,
    pub crawler_reviews_per_series: u32,
    pub crawler_include_preliminary: bool,
    pub checkpoint_save_every: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("review_source_base_url", &self.review_source_base_url)
            .field("checkpoint_path", &self.checkpoint_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "crawler_request_timeout_secs",
                &self.crawler_request_timeout_secs,
            )
            .field("crawler_user_agent", &self.crawler_user_agent)
            .field("crawler_max_retries", &self.crawler_max_retries)
            .field(
                "crawler_retry_backoff_base_secs",
                &self.crawler_retry_backoff_base_secs,
            )
            .field("crawler_max_per_second", &self.crawler_max_per_second)
            .field("crawler_max_per_minute", &self.crawler_max_per_minute)
            .field(
                "crawler_inter_request_delay_ms",
                &self.crawler_inter_request_delay_ms,
            )
            .field(
                "crawler_inter_series_delay_ms",
                &self.crawler_inter_series_delay_ms,
            )
            .field(
                "crawler_reviews_per_series",
                &self.crawler_reviews_per_series,
            )
            .field(
                "crawler_include_preliminary",
                &self.crawler_include_preliminary,
            )
            .field("checkpoint_save_every", &self.checkpoint_save_every)
            .finish()
    }
}
