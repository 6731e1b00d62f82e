use std::env;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::Result;

// Environment variables consulted for defaults
pub const TOTAL_SIZE_HINT_ENV: &str = "TIMELINE_TOTAL_SIZE_HINT";
pub const DEVTOOLS_BASE_ENV: &str = "TIMELINE_DEVTOOLS_BASE";
pub const USER_AGENT_ENV: &str = "TIMELINE_USER_AGENT";

/// Query parameter carrying the timeline URL (or a comma-separated list).
pub const TARGET_PARAM: &str = "loadTimelineFromURL";

/// Size assumed for an asset whose response has no usable length.
pub const DEFAULT_TOTAL_SIZE_HINT: u64 = 50 * 1000 * 1000;

pub const DEFAULT_DEVTOOLS_BASE: &str = "https://chrome-devtools-frontend.appspot.com/serve_file/";

pub static TOTAL_SIZE_HINT: Lazy<u64> = Lazy::new(|| {
    env::var(TOTAL_SIZE_HINT_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_TOTAL_SIZE_HINT)
});

pub static DEVTOOLS_BASE: Lazy<String> =
    Lazy::new(|| env::var(DEVTOOLS_BASE_ENV).unwrap_or_else(|_| DEFAULT_DEVTOOLS_BASE.to_string()));

pub static USER_AGENT: Lazy<String> = Lazy::new(|| {
    env::var(USER_AGENT_ENV)
        .unwrap_or_else(|_| format!("timeline-viewer/{}", env!("CARGO_PKG_VERSION")))
});

/// Everything a loader needs to know about the page it is embedded in.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Address of the viewer document itself (`location.href`).
    pub viewer_url: Url,
    /// Remote root the DevTools frontend assets are served from.
    pub devtools_base: Url,
    pub total_size_hint: u64,
    pub user_agent: String,
}

impl ViewerConfig {
    /// Builds a config for `viewer_url` with defaults taken from the environment.
    pub fn new(viewer_url: Url) -> Result<Self> {
        Ok(Self {
            viewer_url,
            devtools_base: Url::parse(&DEVTOOLS_BASE)?,
            total_size_hint: *TOTAL_SIZE_HINT,
            user_agent: USER_AGENT.clone(),
        })
    }

    pub fn with_devtools_base(mut self, base: Url) -> Self {
        self.devtools_base = base;
        self
    }

    pub fn with_total_size_hint(mut self, hint: u64) -> Self {
        self.total_size_hint = hint;
        self
    }

    /// Timeline URLs requested through the viewer's query string.
    pub fn target_urls(&self) -> Vec<String> {
        target_urls(&self.viewer_url)
    }
}

/// Reads the `loadTimelineFromURL` parameter and splits it on commas.
pub fn target_urls(viewer_url: &Url) -> Vec<String> {
    viewer_url
        .query_pairs()
        .find(|(key, _)| key == TARGET_PARAM)
        .map(|(_, value)| split_url_list(&value))
        .unwrap_or_default()
}

pub fn split_url_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derives the DevTools asset root from the bootstrap script address,
/// e.g. `.../serve_file/@rev/inspector.js?x` becomes `.../serve_file/@rev/`.
pub fn devtools_base_from_script(script_src: &str) -> Result<Url> {
    let base = match script_src.find("inspector.js") {
        Some(idx) => &script_src[..idx],
        None => script_src,
    };
    Ok(Url::parse(base)?)
}
