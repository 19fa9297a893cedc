//! Browser configuration loaded from environment variables.

use promptdex_core::search::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Configuration for the catalog browser.
///
/// All fields have defaults suitable for a local ComfyUI-style host;
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Base URL of the catalog store API (default:
    /// `http://127.0.0.1:8188/promptdex`).
    pub base_url: String,
    /// Fixed page size of the list view (default: 20, capped at 200).
    pub page_limit: i64,
}

impl BrowserConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                           |
    /// |-----------------------|-----------------------------------|
    /// | `PROMPTDEX_BASE_URL`  | `http://127.0.0.1:8188/promptdex` |
    /// | `PROMPTDEX_PAGE_LIMIT`| `20`                              |
    pub fn from_env() -> Self {
        let base_url = std::env::var("PROMPTDEX_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8188/promptdex".into());
        // A trailing slash would double up in endpoint paths.
        let base_url = base_url.trim_end_matches('/').to_string();

        let page_limit: i64 = std::env::var("PROMPTDEX_PAGE_LIMIT")
            .unwrap_or_else(|_| DEFAULT_PAGE_LIMIT.to_string())
            .parse()
            .expect("PROMPTDEX_PAGE_LIMIT must be a valid integer");
        let page_limit = page_limit.clamp(1, MAX_PAGE_LIMIT);

        Self {
            base_url,
            page_limit,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8188/promptdex".into(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
