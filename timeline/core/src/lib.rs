//! Loading of remote timeline assets into an embedded trace panel.
//!
//! [`LoaderFacade`] stands in for the panel's native resource loader. Each
//! request is classified by the [`router`]: the timeline asset is fetched
//! with progress reporting through the [`bridge`], same-origin static assets
//! are redirected to the DevTools asset root, and the rest passes through.
//! Several timelines requested at once are loaded side by side by the
//! [`split`] coordinator.

pub mod bridge;
pub mod config;
pub mod error;
pub mod facade;
pub mod fetcher;
pub mod native;
pub mod panel;
pub mod router;
pub mod session;
pub mod split;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ViewerConfig;
pub use error::{FetchError, LoadError, Result};
pub use facade::LoaderFacade;
pub use fetcher::{AssetFetcher, FetchEvent, HttpFetcher};
pub use native::{HttpNativeLoader, NativeLoader};
pub use panel::{PanelHost, TimeRange, TracePanel};
pub use router::{Route, UrlRouter};
pub use session::{LoadSession, Outcome, Progress};
pub use split::{create_split_view, Region, RegionId, RegionSync, SplitViewLayout, SyncState};
