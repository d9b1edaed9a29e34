//! Process-wide registry of external widget scripts.
//!
//! A script is fetched at most once per process. The first caller of
//! `begin` for a URL is told to fetch it; callers arriving while that fetch
//! is in flight wait for `finish`; later callers find it present.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use smol_str::SmolStr;

use crate::error::EmbedError;

/// Widget script for embedded tweets.
pub const TWITTER_WIDGET_SCRIPT_URL: &str = "https://platform.twitter.com/widgets.js";

static GLOBAL: LazyLock<Arc<ScriptRegistry>> = LazyLock::new(|| Arc::new(ScriptRegistry::new()));

/// What a caller of `ScriptRegistry::begin` should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    /// Nobody has the script; the caller fetches it and reports back.
    Fetch,
    /// Another caller is fetching it; wait for the finish notification.
    InFlight,
    /// Already loaded; go straight to widget creation.
    Present,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptState {
    Loading,
    Loaded,
    /// The last fetch failed. The next `begin` fetches again.
    Failed(EmbedError),
}

#[derive(Debug, Default)]
pub struct ScriptRegistry {
    scripts: DashMap<SmolStr, ScriptState>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every component in the process.
    pub fn global() -> Arc<ScriptRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Claim or join the load of `url`.
    pub fn begin(&self, url: &str) -> ScriptStatus {
        let status = match self.scripts.entry(SmolStr::new(url)) {
            Entry::Occupied(mut entry) => match entry.get() {
                ScriptState::Loaded => ScriptStatus::Present,
                ScriptState::Loading => ScriptStatus::InFlight,
                ScriptState::Failed(_) => {
                    entry.insert(ScriptState::Loading);
                    ScriptStatus::Fetch
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(ScriptState::Loading);
                ScriptStatus::Fetch
            }
        };
        tracing::debug!(target: "weft::embed", url, ?status, "script requested");
        status
    }

    /// Record the result of a fetch started by `begin`.
    pub fn finish(&self, url: &str, result: &Result<(), EmbedError>) {
        let state = match result {
            Ok(()) => ScriptState::Loaded,
            Err(e) => {
                tracing::warn!(target: "weft::embed", url, error = %e, "script failed to load");
                ScriptState::Failed(e.clone())
            }
        };
        self.scripts.insert(SmolStr::new(url), state);
    }

    pub fn state(&self, url: &str) -> Option<ScriptState> {
        self.scripts.get(url).map(|s| s.value().clone())
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        matches!(self.state(url), Some(ScriptState::Loaded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_once() {
        let registry = ScriptRegistry::new();
        assert_eq!(registry.begin(TWITTER_WIDGET_SCRIPT_URL), ScriptStatus::Fetch);
        assert_eq!(registry.begin(TWITTER_WIDGET_SCRIPT_URL), ScriptStatus::InFlight);
        registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));
        assert_eq!(registry.begin(TWITTER_WIDGET_SCRIPT_URL), ScriptStatus::Present);
        assert!(registry.is_loaded(TWITTER_WIDGET_SCRIPT_URL));
    }

    #[test]
    fn test_failed_fetch_is_retried() {
        let registry = ScriptRegistry::new();
        let url = "https://example.com/widget.js";
        registry.begin(url);
        registry.finish(url, &Err(EmbedError::script_load(url, "offline")));
        assert!(matches!(registry.state(url), Some(ScriptState::Failed(_))));
        assert_eq!(registry.begin(url), ScriptStatus::Fetch);
        assert_eq!(registry.state(url), Some(ScriptState::Loading));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&ScriptRegistry::global(), &ScriptRegistry::global()));
    }
}
