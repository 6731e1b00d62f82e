//! Turns fetch progress into trace panel lifecycle calls.
//!
//! Per session: auxiliary views are muted once, `loading_started` runs once
//! and before any `loading_progress`, then every event reports a ratio.
//! A panel that cannot be obtained is skipped without affecting the fetch.

use crate::error::FetchError;
use crate::panel::{PanelHost, TracePanel};
use crate::session::{LoadSession, Progress};

pub fn on_progress<H>(progress: Progress, session: &mut LoadSession, host: &mut H)
where
    H: PanelHost + ?Sized,
{
    let ratio = session.record(progress);

    if !session.muted_auxiliary {
        host.mute_auxiliary_views();
        session.muted_auxiliary = true;
    }

    let Some(panel) = acquire_panel(host) else {
        log::debug!(
            "Timeline panel not available yet, progress {ratio:.3} for {} not shown",
            session.target_url
        );
        return;
    };

    if !session.started {
        panel.loading_started();
        session.started = true;
    }
    panel.loading_progress(ratio);
}

/// Surfaces a failed download on the host's status line.
pub fn on_failure<H>(err: &FetchError, session: &LoadSession, host: &mut H)
where
    H: PanelHost + ?Sized,
{
    host.set_visible(false);
    host.update_status(&err.user_message());
    log::warn!("Download of asset {} failed: {err}", session.target_url);
}

fn acquire_panel<H>(host: &mut H) -> Option<&mut dyn TracePanel>
where
    H: PanelHost + ?Sized,
{
    if host.panel().is_none() {
        host.set_visible(true);
        if let Err(e) = host.show_panel() {
            log::debug!("Failed to show timeline panel: {e}");
            return None;
        }
    }
    host.panel()
}
