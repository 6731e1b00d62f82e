use serde_json::Value;
use timeline_core::{LoadError, PanelHost, TimeRange, TracePanel};

/// Trace panel that reports to the log instead of drawing.
#[derive(Debug)]
pub struct ConsolePanel {
    label: String,
    range: Option<TimeRange>,
    last_decile: Option<i64>,
    event_count: usize,
}

impl ConsolePanel {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            range: None,
            last_decile: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    /// Takes a downloaded timeline and shows its full extent.
    pub fn show_timeline(&mut self, payload: &str) {
        match timeline_extent(payload) {
            Some((range, count)) => {
                log::info!(
                    "[{}] Showing {count} events, {:.3}..{:.3} ms",
                    self.label,
                    range.start,
                    range.end
                );
                self.range = Some(range);
                self.event_count = count;
            }
            None => log::warn!("[{}] Payload has no timed trace events", self.label),
        }
    }
}

impl TracePanel for ConsolePanel {
    fn loading_started(&mut self) {
        log::info!("[{}] Loading timeline...", self.label);
    }

    fn loading_progress(&mut self, ratio: f64) {
        let decile = (ratio * 10.0).floor() as i64;
        if self.last_decile != Some(decile) {
            self.last_decile = Some(decile);
            log::info!("[{}] Received {:.0}%", self.label, ratio * 100.0);
        } else {
            log::trace!("[{}] Received {:.2}%", self.label, ratio * 100.0);
        }
    }

    fn visible_range(&self) -> Option<TimeRange> {
        self.range
    }

    fn set_visible_range(&mut self, range: TimeRange) {
        log::info!(
            "[{}] Visible range aligned to {:.3}..{:.3} ms",
            self.label,
            range.start,
            range.end
        );
        self.range = Some(range);
    }
}

/// Panel host of one viewer region on the console.
#[derive(Debug)]
pub struct ConsolePanelHost {
    label: String,
    panel: Option<ConsolePanel>,
    visible: bool,
}

impl ConsolePanelHost {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            panel: None,
            visible: false,
        }
    }

    pub fn console_panel(&self) -> Option<&ConsolePanel> {
        self.panel.as_ref()
    }

    /// Drop completion: hands the payload to the panel.
    pub fn handle_drop(&mut self, payload: &str) {
        let label = &self.label;
        self.panel
            .get_or_insert_with(|| ConsolePanel::new(label))
            .show_timeline(payload);
    }
}

impl PanelHost for ConsolePanelHost {
    fn panel(&mut self) -> Option<&mut dyn TracePanel> {
        self.panel.as_mut().map(|p| p as &mut dyn TracePanel)
    }

    fn show_panel(&mut self) -> timeline_core::Result<()> {
        if !self.visible {
            return Err(LoadError::PanelUnavailable(format!(
                "viewer {} is hidden",
                self.label
            )));
        }
        if self.panel.is_none() {
            self.panel = Some(ConsolePanel::new(&self.label));
        }
        Ok(())
    }

    fn mute_auxiliary_views(&mut self) {
        log::debug!("[{}] Muting auxiliary views", self.label);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn update_status(&mut self, status: &str) {
        log::warn!("[{}] {status}", self.label);
    }
}

/// Time span and number of timed events of a JSON trace, either a bare
/// event array or an object with `traceEvents`. Timestamps are in
/// microseconds; the range is returned in milliseconds.
pub fn timeline_extent(payload: &str) -> Option<(TimeRange, usize)> {
    let value: Value = serde_json::from_str(payload).ok()?;
    let events = match &value {
        Value::Array(events) => events,
        Value::Object(obj) => obj.get("traceEvents")?.as_array()?,
        _ => return None,
    };

    let mut start = f64::INFINITY;
    let mut end = f64::NEG_INFINITY;
    let mut count = 0;
    for event in events {
        let Some(ts) = event.get("ts").and_then(Value::as_f64) else {
            continue;
        };
        let dur = event.get("dur").and_then(Value::as_f64).unwrap_or(0.0);
        start = start.min(ts);
        end = end.max(ts + dur);
        count += 1;
    }

    (count > 0).then(|| (TimeRange::new(start / 1000.0, end / 1000.0), count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_of_trace_object() {
        let payload = r#"{"traceEvents":[
            {"name":"a","ph":"X","ts":1000,"dur":500},
            {"name":"b","ph":"X","ts":3000,"dur":2000},
            {"name":"meta","ph":"M"}
        ]}"#;
        let (range, count) = timeline_extent(payload).unwrap();
        assert_eq!(range, TimeRange::new(1.0, 5.0));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_extent_of_event_array() {
        let payload = r#"[{"ts":2000},{"ts":4000,"dur":1000}]"#;
        let (range, _) = timeline_extent(payload).unwrap();
        assert_eq!(range, TimeRange::new(2.0, 5.0));
    }

    #[test]
    fn test_extent_without_events() {
        assert!(timeline_extent(r#"{"traceEvents":[]}"#).is_none());
        assert!(timeline_extent("not json").is_none());
    }

    #[test]
    fn test_hidden_host_refuses_panel() {
        let mut host = ConsolePanelHost::new("main");
        assert!(matches!(
            host.show_panel(),
            Err(LoadError::PanelUnavailable(_))
        ));
        host.set_visible(true);
        assert!(host.show_panel().is_ok());
        assert!(host.panel().is_some());
    }

    #[test]
    fn test_drop_creates_panel_and_sets_range() {
        let mut host = ConsolePanelHost::new("main");
        host.handle_drop(r#"[{"ts":0,"dur":1000}]"#);
        let panel = host.console_panel().unwrap();
        assert_eq!(panel.visible_range(), Some(TimeRange::new(0.0, 1.0)));
        assert_eq!(panel.event_count(), 1);
    }
}
