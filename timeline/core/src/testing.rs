//! Recording collaborators shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use url::Url;

use crate::error::{LoadError, Result};
use crate::fetcher::{AssetFetcher, FetchEvent};
use crate::native::NativeLoader;
use crate::panel::{PanelHost, TimeRange, TracePanel};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Started,
    Progress(f64),
    SetRange(TimeRange),
}

#[derive(Debug, Default)]
pub struct RecordingPanel {
    pub calls: Vec<PanelCall>,
    pub range: Option<TimeRange>,
}

impl TracePanel for RecordingPanel {
    fn loading_started(&mut self) {
        self.calls.push(PanelCall::Started);
    }

    fn loading_progress(&mut self, ratio: f64) {
        self.calls.push(PanelCall::Progress(ratio));
    }

    fn visible_range(&self) -> Option<TimeRange> {
        self.range
    }

    fn set_visible_range(&mut self, range: TimeRange) {
        self.calls.push(PanelCall::SetRange(range));
        self.range = Some(range);
    }
}

#[derive(Debug, Default)]
pub struct RecordingHost {
    pub panel: Option<RecordingPanel>,
    /// Whether `show_panel` can create the panel.
    pub instantiable: bool,
    /// Range given to a panel created by `show_panel`.
    pub initial_range: Option<TimeRange>,
    pub show_calls: usize,
    pub mute_calls: usize,
    pub visible: Option<bool>,
    pub statuses: Vec<String>,
}

impl RecordingHost {
    pub fn ready() -> Self {
        Self {
            panel: Some(RecordingPanel::default()),
            instantiable: true,
            ..Default::default()
        }
    }

    pub fn lazy() -> Self {
        Self {
            instantiable: true,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.initial_range = Some(range);
        if let Some(panel) = self.panel.as_mut() {
            panel.range = Some(range);
        }
        self
    }

    pub fn panel_calls(&self) -> Vec<PanelCall> {
        self.panel
            .as_ref()
            .map(|p| p.calls.clone())
            .unwrap_or_default()
    }
}

impl PanelHost for RecordingHost {
    fn panel(&mut self) -> Option<&mut dyn TracePanel> {
        self.panel.as_mut().map(|p| p as &mut dyn TracePanel)
    }

    fn show_panel(&mut self) -> Result<()> {
        self.show_calls += 1;
        if !self.instantiable {
            return Err(LoadError::PanelUnavailable("inspector not ready".to_string()));
        }
        if self.panel.is_none() {
            self.panel = Some(RecordingPanel {
                calls: Vec::new(),
                range: self.initial_range,
            });
        }
        Ok(())
    }

    fn mute_auxiliary_views(&mut self) {
        self.mute_calls += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = Some(visible);
    }

    fn update_status(&mut self, status: &str) {
        self.statuses.push(status.to_string());
    }
}

/// Replays a fixed list of events, optionally pausing before each one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFetcher {
    pub events: Vec<FetchEvent>,
    pub delay: Option<Duration>,
    pub requested: Arc<Mutex<Vec<Url>>>,
}

impl ScriptedFetcher {
    pub fn new(events: Vec<FetchEvent>) -> Self {
        Self {
            events,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self) -> Vec<Url> {
        self.requested.lock().unwrap().clone()
    }
}

impl AssetFetcher for ScriptedFetcher {
    fn fetch(&self, url: &Url) -> BoxStream<'static, FetchEvent> {
        self.requested.lock().unwrap().push(url.clone());
        let delay = self.delay;
        stream::iter(self.events.clone())
            .then(move |event| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                event
            })
            .boxed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingNative {
    pub requested: Arc<Mutex<Vec<Url>>>,
}

impl RecordingNative {
    pub fn requested(&self) -> Vec<Url> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl NativeLoader for RecordingNative {
    async fn load(&self, url: &Url) -> Result<String> {
        self.requested.lock().unwrap().push(url.clone());
        Ok(format!("native:{url}"))
    }
}
