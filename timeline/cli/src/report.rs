use anyhow::Result;
use serde::Serialize;
use tabled::{Table, Tabled};
use timeline_core::{LoadError, TracePanel};

use crate::console::ConsolePanelHost;

/// Summary of one viewer region after its load finished.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RegionReport {
    pub region: String,
    pub url: String,
    pub bytes: usize,
    pub events: usize,
    #[tabled(rename = "range (ms)")]
    pub range: String,
    pub outcome: String,
    #[serde(skip)]
    #[tabled(skip)]
    pub success: bool,
}

impl RegionReport {
    pub fn new(
        region: &str,
        url: &str,
        result: &std::result::Result<String, LoadError>,
        host: &ConsolePanelHost,
    ) -> Self {
        let panel = host.console_panel();
        let range = panel
            .and_then(|p| p.visible_range())
            .map(|r| format!("{:.3}..{:.3}", r.start, r.end))
            .unwrap_or_else(|| "-".to_string());
        let (bytes, outcome) = match result {
            Ok(body) => (body.len(), "ok".to_string()),
            Err(e) => (0, e.to_string()),
        };
        Self {
            region: region.to_string(),
            url: url.to_string(),
            bytes,
            events: panel.map(|p| p.event_count()).unwrap_or_default(),
            range,
            outcome,
            success: result.is_ok(),
        }
    }
}

pub fn render(reports: &[RegionReport], json: bool) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(reports)?)
    } else {
        Ok(Table::new(reports).to_string())
    }
}
