use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Visible window of a timeline, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// The trace panel that displays a loaded timeline.
pub trait TracePanel {
    fn loading_started(&mut self);

    fn loading_progress(&mut self, ratio: f64);

    /// Currently visible range, `None` until a timeline has been shown.
    fn visible_range(&self) -> Option<TimeRange>;

    fn set_visible_range(&mut self, range: TimeRange);
}

/// The environment embedding a [`TracePanel`].
///
/// The panel may not exist yet when the first progress event arrives;
/// `panel` then returns `None` and `show_panel` is asked to create it.
pub trait PanelHost {
    fn panel(&mut self) -> Option<&mut dyn TracePanel>;

    /// Makes the panel visible, instantiating it if needed.
    /// Fails with `LoadError::PanelUnavailable` while the host is not ready.
    fn show_panel(&mut self) -> Result<()>;

    /// Silences auxiliary data sources (markers, extra tracks) for the
    /// timeline being loaded.
    fn mute_auxiliary_views(&mut self);

    fn set_visible(&mut self, visible: bool);

    fn update_status(&mut self, status: &str);
}
