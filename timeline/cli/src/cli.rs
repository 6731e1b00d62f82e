use anyhow::{bail, Result};
use clap::Parser;
use url::Url;

use timeline_core::config::{devtools_base_from_script, split_url_list, DEVTOOLS_BASE_ENV};
use timeline_core::{
    create_split_view, HttpFetcher, HttpNativeLoader, LoaderFacade, SplitViewLayout, ViewerConfig,
};

use crate::console::ConsolePanelHost;
use crate::report::{self, RegionReport};

type ConsoleFacade = LoaderFacade<HttpNativeLoader, HttpFetcher, ConsolePanelHost>;

/// Load remote timelines the way the trace viewer page does
#[derive(Parser, Debug)]
#[command(name = "timeline", version, about)]
pub struct Cli {
    /// Address of the viewer page; its `loadTimelineFromURL` parameter selects the timelines
    #[arg(long, env = "TIMELINE_VIEWER_URL", default_value = "http://localhost:8000/")]
    pub viewer_url: String,

    /// Timeline URL or comma-separated URLs, overriding the viewer's query parameter
    #[arg(short = 'u', long = "load-timeline-from-url", value_name = "URLS")]
    pub urls: Option<String>,

    /// Root the DevTools frontend assets are served from
    #[arg(long, env = DEVTOOLS_BASE_ENV)]
    pub devtools_base: Option<String>,

    /// DevTools bootstrap script (`.../inspector.js`) to derive the asset root from
    #[arg(long, conflicts_with = "devtools_base")]
    pub devtools_script: Option<String>,

    /// Size assumed for responses without a usable Content-Length
    #[arg(long)]
    pub total_size_hint: Option<u64>,

    /// Extra resource requested through the loader before each timeline
    #[arg(short = 'r', long = "resource", value_name = "URL")]
    pub resources: Vec<String>,

    /// Print the region summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = self.viewer_config()?;
        let urls = self.target_urls(&config);
        if urls.is_empty() {
            bail!(
                "no timeline given: pass --load-timeline-from-url or a viewer URL with ?{}=",
                timeline_core::config::TARGET_PARAM
            );
        }

        let native = HttpNativeLoader::new(&config)?;
        let fetcher = HttpFetcher::new(&config)?;

        let reports = match create_split_view(&urls) {
            None => {
                let facade = console_facade(&config, &urls[0], "main", &native, &fetcher);
                let report =
                    load_region(facade, "main".to_string(), urls[0].clone(), self.resources.clone())
                        .await;
                vec![report]
            }
            Some(layout) => self.load_split(&config, &layout, &native, &fetcher).await?,
        };

        println!("{}", report::render(&reports, self.json)?);

        if reports.iter().all(|r| !r.success) {
            bail!("no timeline could be loaded");
        }
        Ok(())
    }

    fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = ViewerConfig::new(Url::parse(&self.viewer_url)?)?;
        if let Some(base) = &self.devtools_base {
            config = config.with_devtools_base(Url::parse(base)?);
        } else if let Some(script) = &self.devtools_script {
            config = config.with_devtools_base(devtools_base_from_script(script)?);
        }
        if let Some(hint) = self.total_size_hint {
            config = config.with_total_size_hint(hint);
        }
        Ok(config)
    }

    fn target_urls(&self, config: &ViewerConfig) -> Vec<String> {
        match &self.urls {
            Some(list) => split_url_list(list),
            None => config.target_urls(),
        }
    }

    async fn load_split(
        &self,
        config: &ViewerConfig,
        layout: &SplitViewLayout,
        native: &HttpNativeLoader,
        fetcher: &HttpFetcher,
    ) -> Result<Vec<RegionReport>> {
        for region in layout.regions() {
            log::debug!(
                "Region {} at {}",
                region.id,
                region.source_url(&config.viewer_url)?
            );
        }

        let reports = layout
            .launch(|region, sync| {
                let label = region.id.to_string();
                let facade =
                    console_facade(config, &region.url, &label, native, fetcher).with_region(sync);
                load_region(facade, label, region.url.clone(), self.resources.clone())
            })
            .await;
        Ok(reports)
    }
}

fn console_facade(
    config: &ViewerConfig,
    target: &str,
    label: &str,
    native: &HttpNativeLoader,
    fetcher: &HttpFetcher,
) -> ConsoleFacade {
    LoaderFacade::new(
        config,
        Some(target.to_string()),
        native.clone(),
        fetcher.clone(),
        ConsolePanelHost::new(label),
    )
    .with_post_load(|host: &mut ConsolePanelHost, payload: &str| host.handle_drop(payload))
}

async fn load_region(
    mut facade: ConsoleFacade,
    label: String,
    url: String,
    resources: Vec<String>,
) -> RegionReport {
    for resource in &resources {
        match facade.load(resource).await {
            Ok(body) => log::info!("[{label}] Loaded {resource} ({} bytes)", body.len()),
            Err(e) => log::warn!("[{label}] Failed to load {resource}: {e}"),
        }
    }

    let result = facade.load(&url).await;
    RegionReport::new(&label, &url, &result, facade.host())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("timeline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_urls_from_flag() {
        let cli = parse(&["-u", "https://a.test/1.json, https://b.test/2.json"]);
        let config = cli.viewer_config().unwrap();
        assert_eq!(
            cli.target_urls(&config),
            vec!["https://a.test/1.json".to_string(), "https://b.test/2.json".to_string()]
        );
    }

    #[test]
    fn test_urls_from_viewer_query() {
        let cli = parse(&[
            "--viewer-url",
            "http://localhost:8000/?loadTimelineFromURL=https://a.test/1.json",
        ]);
        let config = cli.viewer_config().unwrap();
        assert_eq!(cli.target_urls(&config), vec!["https://a.test/1.json".to_string()]);
    }

    #[test]
    fn test_devtools_base_from_script_flag() {
        let cli = parse(&[
            "--devtools-script",
            "https://devtools.test/serve_file/@rev/inspector.js",
            "--total-size-hint",
            "1024",
        ]);
        let config = cli.viewer_config().unwrap();
        assert_eq!(config.devtools_base.as_str(), "https://devtools.test/serve_file/@rev/");
        assert_eq!(config.total_size_hint, 1024);
    }

    #[test]
    fn test_repeated_resources() {
        let cli = parse(&["-r", "a.js", "--resource", "b.js"]);
        assert_eq!(cli.resources, vec!["a.js".to_string(), "b.js".to_string()]);
    }

    #[test]
    fn test_invalid_viewer_url() {
        let cli = parse(&["--viewer-url", "not a url"]);
        assert!(cli.viewer_config().is_err());
    }
}
