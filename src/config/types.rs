use serde::Deserialize;

/// Main configuration structure for Pricewalk
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Catalog home page; category discovery starts from its navigation menu
    #[serde(rename = "home-url")]
    pub home_url: String,
}

/// Browser automation session configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Base URL of the WebDriver endpoint (e.g. a local geckodriver)
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Time to let a page settle after navigation before reading its source
    /// (milliseconds)
    #[serde(rename = "page-settle-ms", default = "default_page_settle_ms")]
    pub page_settle_ms: u64,
}

fn default_page_settle_ms() -> u64 {
    5000
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite dataset file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the category tree snapshot file
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,
}
