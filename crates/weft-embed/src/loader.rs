//! Load state machine for externally fetched embed content.
//!
//! The loader does no I/O. It tells its host what to do next through
//! `LoadCommand`s, each carrying a `LoadTicket`. The host reports results
//! back with that ticket; results for a ticket that is no longer current
//! (the id changed or the embed was unmounted) are dropped.

use smol_str::SmolStr;

use crate::error::EmbedError;
use crate::script::{ScriptRegistry, ScriptStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(EmbedError),
}

/// Identifies one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Work the host must perform for the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    /// Fetch the script, then report with `script_loaded`.
    FetchScript { ticket: LoadTicket, url: SmolStr },
    /// Someone else is fetching the script; report with `script_loaded`
    /// once it finishes.
    AwaitScript { ticket: LoadTicket, url: SmolStr },
    /// Render the widget for `id`, then report with `widget_created`.
    CreateWidget { ticket: LoadTicket, id: SmolStr },
}

impl LoadCommand {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            LoadCommand::FetchScript { ticket, .. }
            | LoadCommand::AwaitScript { ticket, .. }
            | LoadCommand::CreateWidget { ticket, .. } => *ticket,
        }
    }
}

/// Result of reporting a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// More work to do.
    Next(LoadCommand),
    Ready,
    Failed(EmbedError),
    /// The completion belonged to an outdated attempt and was ignored.
    Stale,
}

#[derive(Debug)]
pub struct EmbedLoader {
    script_url: SmolStr,
    id: Option<SmolStr>,
    state: LoadState,
    generation: u64,
    awaiting_script: bool,
}

impl EmbedLoader {
    pub fn new(script_url: impl Into<SmolStr>) -> Self {
        Self {
            script_url: script_url.into(),
            id: None,
            state: LoadState::Idle,
            generation: 0,
            awaiting_script: false,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn script_url(&self) -> &str {
        &self.script_url
    }

    pub fn is_mounted(&self) -> bool {
        self.id.is_some()
    }

    /// Ticket of the current attempt while it waits for the script.
    pub fn awaiting_script(&self) -> Option<LoadTicket> {
        self.awaiting_script.then_some(LoadTicket {
            generation: self.generation,
        })
    }

    /// First mount: Idle to Loading.
    pub fn mount(&mut self, id: &str, registry: &ScriptRegistry) -> LoadCommand {
        self.id = Some(SmolStr::new(id));
        self.start(registry)
    }

    /// Switch to another id. Any attempt in progress becomes stale.
    ///
    /// Returns `None` when the id did not change.
    pub fn set_id(&mut self, id: &str, registry: &ScriptRegistry) -> Option<LoadCommand> {
        if self.id.as_deref() == Some(id) {
            return None;
        }
        tracing::debug!(
            target: "weft::embed",
            from = ?self.id,
            to = id,
            "embed id changed, reloading"
        );
        self.id = Some(SmolStr::new(id));
        Some(self.start(registry))
    }

    /// Drop the current attempt. Later completions are ignored.
    pub fn unmount(&mut self) {
        self.id = None;
        self.generation += 1;
        self.state = LoadState::Idle;
        self.awaiting_script = false;
    }

    fn start(&mut self, registry: &ScriptRegistry) -> LoadCommand {
        self.generation += 1;
        self.state = LoadState::Loading;
        let ticket = LoadTicket {
            generation: self.generation,
        };
        let url = self.script_url.clone();
        match registry.begin(&url) {
            ScriptStatus::Fetch => {
                self.awaiting_script = true;
                LoadCommand::FetchScript { ticket, url }
            }
            ScriptStatus::InFlight => {
                self.awaiting_script = true;
                LoadCommand::AwaitScript { ticket, url }
            }
            ScriptStatus::Present => {
                self.awaiting_script = false;
                self.create_widget(ticket)
            }
        }
    }

    fn create_widget(&self, ticket: LoadTicket) -> LoadCommand {
        LoadCommand::CreateWidget {
            ticket,
            id: self.id.clone().unwrap_or_default(),
        }
    }

    fn is_current(&self, ticket: LoadTicket, stage: &'static str) -> bool {
        let current = ticket.generation == self.generation
            && self.is_mounted()
            && self.state == LoadState::Loading;
        if !current {
            tracing::debug!(
                target: "weft::embed",
                stage,
                ticket = ticket.generation,
                current = self.generation,
                "stale completion ignored"
            );
        }
        current
    }

    /// The script finished loading (or failed) for `ticket`.
    pub fn script_loaded(&mut self, ticket: LoadTicket, result: Result<(), EmbedError>) -> Outcome {
        if !self.awaiting_script || !self.is_current(ticket, "script") {
            return Outcome::Stale;
        }
        self.awaiting_script = false;
        match result {
            Ok(()) => Outcome::Next(self.create_widget(ticket)),
            Err(e) => self.fail(e),
        }
    }

    /// The widget was created (or failed) for `ticket`.
    pub fn widget_created(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), EmbedError>,
    ) -> Outcome {
        if self.awaiting_script || !self.is_current(ticket, "widget") {
            return Outcome::Stale;
        }
        match result {
            Ok(()) => {
                self.state = LoadState::Ready;
                tracing::debug!(target: "weft::embed", id = ?self.id, "embed ready");
                Outcome::Ready
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: EmbedError) -> Outcome {
        tracing::warn!(target: "weft::embed", id = ?self.id, error = %e, "embed failed to load");
        self.state = LoadState::Failed(e.clone());
        Outcome::Failed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::TWITTER_WIDGET_SCRIPT_URL;

    fn loader() -> EmbedLoader {
        EmbedLoader::new(TWITTER_WIDGET_SCRIPT_URL)
    }

    #[test]
    fn test_happy_path() {
        let registry = ScriptRegistry::new();
        let mut loader = loader();
        assert_eq!(loader.state(), &LoadState::Idle);

        let cmd = loader.mount("20", &registry);
        assert!(matches!(cmd, LoadCommand::FetchScript { .. }));
        assert_eq!(loader.state(), &LoadState::Loading);

        let next = loader.script_loaded(cmd.ticket(), Ok(()));
        let Outcome::Next(LoadCommand::CreateWidget { ticket, id }) = next else {
            panic!("expected widget creation, got {next:?}");
        };
        assert_eq!(id, "20");
        assert_eq!(loader.widget_created(ticket, Ok(())), Outcome::Ready);
        assert_eq!(loader.state(), &LoadState::Ready);
    }

    #[test]
    fn test_present_script_skips_fetch() {
        let registry = ScriptRegistry::new();
        registry.begin(TWITTER_WIDGET_SCRIPT_URL);
        registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));

        let mut loader = loader();
        let cmd = loader.mount("20", &registry);
        assert!(matches!(cmd, LoadCommand::CreateWidget { .. }));
        assert_eq!(loader.awaiting_script(), None);
    }

    #[test]
    fn test_id_change_in_ready_reloads() {
        let registry = ScriptRegistry::new();
        registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));
        let mut loader = loader();
        let cmd = loader.mount("1", &registry);
        loader.widget_created(cmd.ticket(), Ok(()));
        assert_eq!(loader.state(), &LoadState::Ready);

        assert_eq!(loader.set_id("1", &registry), None);
        let cmd = loader.set_id("2", &registry).unwrap();
        assert_eq!(loader.state(), &LoadState::Loading);
        assert!(matches!(&cmd, LoadCommand::CreateWidget { id, .. } if id == "2"));
    }

    #[test]
    fn test_stale_completions_are_ignored() {
        let registry = ScriptRegistry::new();
        registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));
        let mut loader = loader();
        let old = loader.mount("1", &registry);
        let new = loader.set_id("2", &registry).unwrap();

        assert_eq!(loader.widget_created(old.ticket(), Ok(())), Outcome::Stale);
        assert_eq!(loader.state(), &LoadState::Loading);
        assert_eq!(loader.widget_created(new.ticket(), Ok(())), Outcome::Ready);

        loader.unmount();
        assert_eq!(loader.widget_created(new.ticket(), Ok(())), Outcome::Stale);
        assert_eq!(loader.state(), &LoadState::Idle);
    }

    #[test]
    fn test_script_failure() {
        let registry = ScriptRegistry::new();
        let mut loader = loader();
        let cmd = loader.mount("1", &registry);
        let err = EmbedError::script_load(TWITTER_WIDGET_SCRIPT_URL, "blocked");
        assert_eq!(
            loader.script_loaded(cmd.ticket(), Err(err.clone())),
            Outcome::Failed(err.clone())
        );
        assert_eq!(loader.state(), &LoadState::Failed(err));
    }
}
