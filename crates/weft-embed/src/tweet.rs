//! Tweet embed component.
//!
//! Binds a `TweetDecoration` to an `EmbedLoader` and the script registry,
//! and runs the optional load and error callbacks as the loader settles.

use std::fmt;
use std::sync::Arc;

use weft_editor_core::{HtmlWriter, TweetDecoration, VisualElement};

use crate::error::EmbedError;
use crate::loader::{EmbedLoader, LoadCommand, LoadState, LoadTicket, Outcome};
use crate::script::{ScriptRegistry, TWITTER_WIDGET_SCRIPT_URL};

/// Inline style of the element the widget renders into.
pub const WIDGET_CONTAINER_STYLE: &str = "display: inline-block; width: 550px";

type LoadCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(&EmbedError)>;

pub struct TweetComponent {
    decoration: TweetDecoration,
    loader: EmbedLoader,
    registry: Arc<ScriptRegistry>,
    on_load: Option<LoadCallback>,
    on_error: Option<ErrorCallback>,
}

impl fmt::Debug for TweetComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweetComponent")
            .field("decoration", &self.decoration)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

/// What the component currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetView<'a> {
    pub decoration: &'a TweetDecoration,
    /// Present while the widget is loading.
    pub loading_label: Option<&'a str>,
    pub container_style: &'static str,
}

impl TweetView<'_> {
    /// Markup for the block: optional loading label followed by the widget
    /// container, aligned by the decoration's format.
    pub fn to_html(&self) -> String {
        let mut w = HtmlWriter::new();
        // HtmlWriter never fails
        let _ = self.write_html(&mut w);
        w.into_string()
    }

    fn write_html(&self, w: &mut HtmlWriter) -> fmt::Result {
        let mut block = VisualElement::new("div");
        if let Some(format) = self.decoration.format {
            block.set_attribute("style", format.css());
        }
        block.write_open(w)?;
        if let Some(label) = self.loading_label {
            let label = VisualElement::new("span").with_text(label);
            label.write_open(w)?;
            label.write_close(w)?;
        }
        let container = VisualElement::new("div").with_attribute("style", self.container_style);
        container.write_open(w)?;
        container.write_close(w)?;
        block.write_close(w)
    }
}

impl TweetComponent {
    pub fn new(decoration: TweetDecoration, registry: Arc<ScriptRegistry>) -> Self {
        Self {
            decoration,
            loader: EmbedLoader::new(TWITTER_WIDGET_SCRIPT_URL),
            registry,
            on_load: None,
            on_error: None,
        }
    }

    pub fn with_on_load(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_load = Some(Box::new(f));
        self
    }

    pub fn with_on_error(mut self, f: impl FnMut(&EmbedError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn decoration(&self) -> &TweetDecoration {
        &self.decoration
    }

    pub fn state(&self) -> &LoadState {
        self.loader.state()
    }

    pub fn awaiting_script(&self) -> Option<LoadTicket> {
        self.loader.awaiting_script()
    }

    pub fn mount(&mut self) -> LoadCommand {
        self.loader.mount(&self.decoration.tweet_id, &self.registry)
    }

    /// Take new props. Reloads only when the tweet id changed.
    pub fn update(&mut self, decoration: TweetDecoration) -> Option<LoadCommand> {
        self.decoration = decoration;
        self.loader
            .set_id(&self.decoration.tweet_id, &self.registry)
    }

    pub fn unmount(&mut self) {
        self.loader.unmount();
    }

    /// Report the script fetch. The registry is updated even when the
    /// attempt is stale, since the script itself did load (or fail).
    ///
    /// A fetch started by an earlier attempt also settles the attempt that
    /// is currently waiting on the same script.
    pub fn script_loaded(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), EmbedError>,
    ) -> Option<LoadCommand> {
        self.registry.finish(self.loader.script_url(), &result);
        let ticket = self.loader.awaiting_script().unwrap_or(ticket);
        self.script_ready(ticket, result)
    }

    pub fn widget_created(&mut self, ticket: LoadTicket, result: Result<(), EmbedError>) {
        let outcome = self.loader.widget_created(ticket, result);
        self.settle(outcome);
    }

    pub(crate) fn script_ready(
        &mut self,
        ticket: LoadTicket,
        result: Result<(), EmbedError>,
    ) -> Option<LoadCommand> {
        let outcome = self.loader.script_loaded(ticket, result);
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Outcome) -> Option<LoadCommand> {
        match outcome {
            Outcome::Next(cmd) => Some(cmd),
            Outcome::Ready => {
                if let Some(on_load) = &mut self.on_load {
                    on_load();
                }
                None
            }
            Outcome::Failed(e) => {
                if let Some(on_error) = &mut self.on_error {
                    on_error(&e);
                }
                None
            }
            Outcome::Stale => None,
        }
    }

    pub fn view(&self) -> TweetView<'_> {
        TweetView {
            decoration: &self.decoration,
            loading_label: matches!(self.loader.state(), LoadState::Loading)
                .then_some(self.decoration.loading_label.as_str()),
            container_style: WIDGET_CONTAINER_STYLE,
        }
    }
}
