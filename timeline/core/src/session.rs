use serde::Serialize;
use url::Url;

use crate::error::FetchError;

/// One transfer-progress notification from the asset fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub loaded: u64,
    /// Total size announced by the response, `None` when unknown.
    pub total: Option<u64>,
}

impl Progress {
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        Self { loaded, total }
    }

    /// Fraction loaded, falling back to `size_hint` when no usable total is known.
    /// Not clamped: an undershooting hint yields values above 1.
    pub fn ratio(&self, size_hint: u64) -> f64 {
        let total = match self.total {
            Some(total) if total > 0 => total,
            _ => size_hint,
        };
        if total == 0 {
            return 0.0;
        }
        self.loaded as f64 / total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Pending,
    /// Size of the delivered payload in bytes; the payload itself goes to the caller.
    Success(usize),
    Failure(FetchError),
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Pending)
    }
}

/// State of one timeline load, owned by the loader of a single panel region.
#[derive(Debug, Clone)]
pub struct LoadSession {
    pub target_url: Url,
    pub total_size_hint: u64,
    pub bytes_loaded: u64,
    /// Set once the panel's "loading started" hook has run.
    pub started: bool,
    /// Set once auxiliary data views have been muted.
    pub muted_auxiliary: bool,
    pub outcome: Outcome,
}

impl LoadSession {
    pub fn new(target_url: Url, total_size_hint: u64) -> Self {
        Self {
            target_url,
            total_size_hint,
            bytes_loaded: 0,
            started: false,
            muted_auxiliary: false,
            outcome: Outcome::Pending,
        }
    }

    /// Records a progress event and returns the ratio to report.
    pub fn record(&mut self, progress: Progress) -> f64 {
        self.bytes_loaded = progress.loaded;
        progress.ratio(self.total_size_hint)
    }

    pub fn finish(&mut self, result: Result<usize, FetchError>) {
        self.outcome = match result {
            Ok(bytes) => Outcome::Success(bytes),
            Err(err) => Outcome::Failure(err),
        };
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn payload_len(&self) -> Option<usize> {
        match self.outcome {
            Outcome::Success(bytes) => Some(bytes),
            _ => None,
        }
    }
}
