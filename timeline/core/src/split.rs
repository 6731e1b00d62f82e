//! Side-by-side loading of several timelines.
//!
//! Each region runs its own loader with its own session. Once a region's
//! load succeeds it aligns its visible range with the first region, which
//! is authoritative. Alignment happens once per load and is not a binding.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::watch;
use url::Url;

use crate::config::TARGET_PARAM;
use crate::error::Result;
use crate::panel::{PanelHost, TimeRange};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionId(String);

impl RegionId {
    fn for_index(index: usize) -> Self {
        RegionId(format!("split-view-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub index: usize,
    pub id: RegionId,
    pub url: String,
    pub height_percent: f64,
}

impl Region {
    /// Viewer address that loads only this region's timeline.
    pub fn source_url(&self, viewer_url: &Url) -> Result<Url> {
        let mut url = viewer_url.join("./")?;
        url.query_pairs_mut()
            .clear()
            .append_pair(TARGET_PARAM, self.url.trim());
        Ok(url)
    }
}

/// What the authoritative region has published so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Authority {
    Pending,
    Ready(TimeRange),
    /// The first region failed or has no range; siblings skip alignment.
    Unavailable,
}

/// Range shared by all regions of one layout.
#[derive(Debug)]
pub struct SyncState {
    authority: watch::Sender<Authority>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        let (authority, _) = watch::channel(Authority::Pending);
        Self { authority }
    }

    pub fn current(&self) -> Authority {
        *self.authority.borrow()
    }

    fn publish(&self, authority: Authority) {
        self.authority.send_replace(authority);
    }

    /// Marks the authority unavailable unless it already published.
    fn release(&self) -> bool {
        self.authority.send_if_modified(|current| {
            if *current == Authority::Pending {
                *current = Authority::Unavailable;
                true
            } else {
                false
            }
        })
    }

    /// Waits until the authoritative region has finished, successfully or not.
    async fn authoritative_range(&self) -> Option<TimeRange> {
        let mut rx = self.authority.subscribe();
        let authority = *rx
            .wait_for(|a| !matches!(a, Authority::Pending))
            .await
            .ok()?;
        match authority {
            Authority::Ready(range) => Some(range),
            _ => None,
        }
    }
}

/// A region's handle on the layout's [`SyncState`].
///
/// Dropping the first region's handle before it published releases the
/// siblings waiting on it.
#[derive(Debug)]
pub struct RegionSync {
    id: RegionId,
    authoritative: bool,
    state: Arc<SyncState>,
}

impl RegionSync {
    pub fn id(&self) -> &RegionId {
        &self.id
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative
    }

    /// Runs once after this region's own load succeeded.
    pub async fn synchronize<H>(&self, host: &mut H)
    where
        H: PanelHost + ?Sized,
    {
        if self.authoritative {
            let range = host.panel().and_then(|panel| panel.visible_range());
            log::debug!("Region {} publishes range {range:?}", self.id);
            self.state
                .publish(range.map_or(Authority::Unavailable, Authority::Ready));
            return;
        }

        let Some(range) = self.state.authoritative_range().await else {
            log::debug!("Region {}: no authoritative range, skipping alignment", self.id);
            return;
        };
        match host.panel() {
            Some(panel) => {
                log::debug!("Region {} aligned to {range:?}", self.id);
                panel.set_visible_range(range);
            }
            None => log::debug!("Region {}: panel gone, skipping alignment", self.id),
        }
    }

    /// Runs when this region's load failed.
    pub fn abandon(&self) {
        if self.authoritative && self.state.release() {
            log::debug!("Region {} has no range to publish", self.id);
        }
    }
}

impl Drop for RegionSync {
    fn drop(&mut self) {
        self.abandon();
    }
}

/// Layout of a split view; immutable once created.
#[derive(Debug, Clone)]
pub struct SplitViewLayout {
    regions: Vec<Region>,
    sync: Arc<SyncState>,
}

/// Splits the viewport between `urls`, one region each.
/// Returns `None` for zero or one URL: that is single-view mode.
pub fn create_split_view(urls: &[String]) -> Option<SplitViewLayout> {
    if urls.len() <= 1 {
        return None;
    }

    let height_percent = 100.0 / urls.len() as f64;
    let regions = urls
        .iter()
        .enumerate()
        .map(|(index, url)| Region {
            index,
            id: RegionId::for_index(index),
            url: url.trim().to_string(),
            height_percent,
        })
        .collect();

    Some(SplitViewLayout {
        regions,
        sync: Arc::new(SyncState::new()),
    })
}

impl SplitViewLayout {
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region_urls(&self) -> Vec<&str> {
        self.regions.iter().map(|r| r.url.as_str()).collect()
    }

    pub fn region_ids(&self) -> Vec<&RegionId> {
        self.regions.iter().map(|r| &r.id).collect()
    }

    pub fn sync_state(&self) -> &Arc<SyncState> {
        &self.sync
    }

    /// Frameset row specification, e.g. `"50%,50%"`.
    pub fn rows_spec(&self) -> String {
        self.regions
            .iter()
            .map(|r| format!("{}%", r.height_percent))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn region_sync(&self, region: &Region) -> RegionSync {
        RegionSync {
            id: region.id.clone(),
            authoritative: region.index == 0,
            state: Arc::clone(&self.sync),
        }
    }

    /// Starts one independent load per region and waits for all of them.
    /// Results come back in region order; one region's failure does not
    /// affect the others.
    pub async fn launch<F, Fut, T>(&self, mut start: F) -> Vec<T>
    where
        F: FnMut(&Region, RegionSync) -> Fut,
        Fut: Future<Output = T>,
    {
        log::info!(
            "Starting split view with {} regions ({})",
            self.region_count(),
            self.rows_spec()
        );
        let loads: Vec<Fut> = self
            .regions
            .iter()
            .map(|region| start(region, self.region_sync(region)))
            .collect();
        join_all(loads).await
    }
}
