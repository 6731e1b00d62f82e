//! Per-request routing decision for resources requested by the trace panel.
//!
//! The hosted DevTools frontend asks for its own static files relative to
//! the document it runs in. When that document is the viewer page, those
//! requests land on the viewer's origin, so they are rewritten onto the
//! DevTools asset root. The timeline asset itself is intercepted, and any
//! other request goes to the native loader untouched.

use url::Url;

use crate::config::ViewerConfig;
use crate::error::Result;

/// Where a requested resource should be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Forward to the native loader unchanged.
    PassThrough(Url),
    /// Forward to the native loader at a rewritten address.
    Redirect(Url),
    /// Load through the asset fetcher; this is the timeline itself.
    Intercept(Url),
}

impl Route {
    pub fn url(&self) -> &Url {
        match self {
            Route::PassThrough(url) | Route::Redirect(url) | Route::Intercept(url) => url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Route::PassThrough(_) => "pass-through",
            Route::Redirect(_) => "redirect",
            Route::Intercept(_) => "intercept",
        }
    }
}

/// Classifies `requested` against the viewer location and the current target.
///
/// `requested` may be relative; it is resolved against `viewer_url` first.
/// Only the exact target string is intercepted, other spellings of the
/// same address are routed like any other request.
pub fn classify(
    requested: &str,
    viewer_url: &Url,
    target: Option<&str>,
    devtools_base: &Url,
) -> Result<Route> {
    let url = viewer_url.join(requested)?;

    if target == Some(requested) {
        return Ok(Route::Intercept(url));
    }

    if url.origin() == viewer_url.origin() {
        let relative = url.path().replacen(viewer_url.path(), "", 1);
        let relative = relative.strip_prefix('/').unwrap_or(&relative);
        return Ok(Route::Redirect(devtools_base.join(relative)?));
    }

    Ok(Route::PassThrough(url))
}

/// Routing state for one loader: the viewer location, the DevTools asset
/// root and the timeline currently being loaded.
#[derive(Debug, Clone)]
pub struct UrlRouter {
    viewer_url: Url,
    devtools_base: Url,
    target: Option<String>,
}

impl UrlRouter {
    pub fn new(config: &ViewerConfig, target: Option<String>) -> Self {
        Self {
            viewer_url: config.viewer_url.clone(),
            devtools_base: config.devtools_base.clone(),
            target,
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn classify(&self, requested: &str) -> Result<Route> {
        let route = classify(
            requested,
            &self.viewer_url,
            self.target.as_deref(),
            &self.devtools_base,
        )?;
        log::debug!("Route[{}]: {} -> {}", route.kind(), requested, route.url());
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;

    const VIEWER: &str = "https://viewer.test/timeline/";
    const BASE: &str = "https://devtools.test/serve_file/@rev/";
    const TARGET: &str = "https://traces.test/run/profile.json";

    fn router(target: Option<&str>) -> UrlRouter {
        let config = ViewerConfig {
            viewer_url: Url::parse(VIEWER).unwrap(),
            devtools_base: Url::parse(BASE).unwrap(),
            total_size_hint: 100,
            user_agent: "test".to_string(),
        };
        UrlRouter::new(&config, target.map(str::to_string))
    }

    #[test]
    fn test_target_is_intercepted() {
        let route = router(Some(TARGET)).classify(TARGET).unwrap();
        assert_eq!(route, Route::Intercept(Url::parse(TARGET).unwrap()));
    }

    #[test]
    fn test_target_on_viewer_origin_is_still_intercepted() {
        let target = "https://viewer.test/timeline/local.json";
        let route = router(Some(target)).classify(target).unwrap();
        assert!(matches!(route, Route::Intercept(_)));
    }

    #[test]
    fn test_other_spelling_of_target_is_not_intercepted() {
        let route = router(Some("local.json"))
            .classify("https://viewer.test/timeline/local.json")
            .unwrap();
        assert_eq!(
            route,
            Route::Redirect(Url::parse("https://devtools.test/serve_file/@rev/local.json").unwrap())
        );
        assert_eq!(router(Some("local.json")).target(), Some("local.json"));
    }

    #[test]
    fn test_same_origin_asset_is_redirected_to_base() {
        let route = router(Some(TARGET))
            .classify("https://viewer.test/timeline/emulated_devices/module.json")
            .unwrap();
        assert_eq!(
            route,
            Route::Redirect(
                Url::parse("https://devtools.test/serve_file/@rev/emulated_devices/module.json")
                    .unwrap()
            )
        );
        assert_ne!(route.url().origin(), Url::parse(VIEWER).unwrap().origin());
    }

    #[test]
    fn test_relative_request_is_resolved_then_redirected() {
        let route = router(None).classify("./timeline_module.js").unwrap();
        assert_eq!(
            route.url().as_str(),
            "https://devtools.test/serve_file/@rev/timeline_module.js"
        );
    }

    #[test]
    fn test_redirect_drops_query() {
        let route = router(None)
            .classify("https://viewer.test/timeline/a/b.json?v=3")
            .unwrap();
        assert_eq!(route.url().as_str(), "https://devtools.test/serve_file/@rev/a/b.json");
    }

    #[test]
    fn test_foreign_origin_passes_through_unchanged() {
        let requested = "https://cdn.test/lib/thing.js?x=1";
        let route = router(Some(TARGET)).classify(requested).unwrap();
        assert_eq!(route, Route::PassThrough(Url::parse(requested).unwrap()));
    }

    #[test]
    fn test_malformed_url_is_an_error() {
        let result = router(Some(TARGET)).classify("http://[::1");
        assert!(matches!(result, Err(LoadError::UrlParse(_))));
    }
}
