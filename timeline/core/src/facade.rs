use futures_util::StreamExt;
use url::Url;

use crate::bridge;
use crate::config::ViewerConfig;
use crate::error::{FetchError, LoadError, Result};
use crate::fetcher::{AssetFetcher, FetchEvent};
use crate::native::NativeLoader;
use crate::panel::PanelHost;
use crate::router::{Route, UrlRouter};
use crate::session::LoadSession;
use crate::split::RegionSync;

/// Hook run with the payload after a successful timeline load,
/// e.g. to tell the embedding panel that a drop completed.
pub type PostLoadHook<H> = Box<dyn FnMut(&mut H, &str) + Send>;

/// The loader the trace panel calls instead of its native one.
///
/// Requests for the timeline asset are downloaded here with progress
/// reporting; everything else is handed to the wrapped native loader,
/// possibly at a rewritten address.
pub struct LoaderFacade<N, F, H> {
    router: UrlRouter,
    native: N,
    fetcher: F,
    host: H,
    total_size_hint: u64,
    region: Option<RegionSync>,
    post_load: Option<PostLoadHook<H>>,
    session: Option<LoadSession>,
}

impl<N, F, H> LoaderFacade<N, F, H>
where
    N: NativeLoader,
    F: AssetFetcher,
    H: PanelHost,
{
    pub fn new(config: &ViewerConfig, target: Option<String>, native: N, fetcher: F, host: H) -> Self {
        Self {
            router: UrlRouter::new(config, target),
            native,
            fetcher,
            host,
            total_size_hint: config.total_size_hint,
            region: None,
            post_load: None,
            session: None,
        }
    }

    /// Scopes this loader to one region of a split view.
    pub fn with_region(mut self, region: RegionSync) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_post_load(mut self, hook: impl FnMut(&mut H, &str) + Send + 'static) -> Self {
        self.post_load = Some(Box::new(hook));
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Session of the most recent timeline load.
    pub fn session(&self) -> Option<&LoadSession> {
        self.session.as_ref()
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub async fn load(&mut self, requested: &str) -> Result<String> {
        let route = match self.router.classify(requested) {
            Ok(route) => route,
            Err(err) => {
                if self.router.target() == Some(requested) {
                    log::warn!("Timeline address {requested} is invalid: {err}");
                    if let Some(region) = &self.region {
                        region.abandon();
                    }
                }
                return Err(err);
            }
        };
        match route {
            Route::PassThrough(url) | Route::Redirect(url) => self.native.load(&url).await,
            Route::Intercept(url) => self.load_target(url).await,
        }
    }

    async fn load_target(&mut self, url: Url) -> Result<String> {
        log::info!("Loading timeline from {url}");
        let mut session = LoadSession::new(url.clone(), self.total_size_hint);
        let mut events = self.fetcher.fetch(&url);

        let mut result = Err(FetchError::transport("fetch ended without a result"));
        while let Some(event) = events.next().await {
            match event {
                FetchEvent::Progress(progress) => {
                    bridge::on_progress(progress, &mut session, &mut self.host)
                }
                FetchEvent::Done(done) => {
                    result = done;
                    break;
                }
            }
        }

        let outcome = match result {
            Ok(body) => {
                log::info!("Timeline {url} loaded, {} bytes", body.len());
                if let Some(hook) = self.post_load.as_mut() {
                    hook(&mut self.host, &body);
                }
                if let Some(region) = &self.region {
                    region.synchronize(&mut self.host).await;
                }
                session.finish(Ok(body.len()));
                Ok(body)
            }
            Err(err) => {
                bridge::on_failure(&err, &session, &mut self.host);
                if let Some(region) = &self.region {
                    region.abandon();
                }
                session.finish(Err(err.clone()));
                Err(LoadError::Fetch(err))
            }
        };
        self.session = Some(session);
        outcome
    }
}
