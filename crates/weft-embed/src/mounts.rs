//! Mounted embed components, kept in step with the editor's decorations.

use std::collections::BTreeMap;
use std::sync::Arc;

use weft_editor_core::{Decoration, NodeKey};

use crate::error::EmbedError;
use crate::loader::{LoadCommand, LoadTicket};
use crate::script::ScriptRegistry;
use crate::tweet::TweetComponent;

/// One component per decorated node.
#[derive(Debug)]
pub struct EmbedMounts {
    components: BTreeMap<NodeKey, TweetComponent>,
    registry: Arc<ScriptRegistry>,
}

impl Default for EmbedMounts {
    fn default() -> Self {
        Self::new(ScriptRegistry::global())
    }
}

impl EmbedMounts {
    pub fn new(registry: Arc<ScriptRegistry>) -> Self {
        Self {
            components: BTreeMap::new(),
            registry,
        }
    }

    /// Mount components for new decorations, pass changed props to existing
    /// ones and unmount those whose node is gone.
    ///
    /// Returns the load commands the host has to run.
    pub fn sync(
        &mut self,
        decorations: &BTreeMap<NodeKey, Decoration>,
    ) -> Vec<(NodeKey, LoadCommand)> {
        let mut commands = Vec::new();

        self.components.retain(|key, component| {
            let keep = decorations.contains_key(key);
            if !keep {
                tracing::debug!(target: "weft::embed", key = %key, "unmount embed");
                component.unmount();
            }
            keep
        });

        for (key, decoration) in decorations {
            let Some(tweet) = decoration.as_tweet() else {
                continue;
            };
            match self.components.get_mut(key) {
                Some(component) if component.decoration() == tweet => {}
                Some(component) => {
                    if let Some(cmd) = component.update(tweet.clone()) {
                        commands.push((key.clone(), cmd));
                    }
                }
                None => {
                    tracing::debug!(
                        target: "weft::embed",
                        key = %key,
                        tweet = %tweet.tweet_id,
                        "mount embed"
                    );
                    let mut component =
                        TweetComponent::new(tweet.clone(), Arc::clone(&self.registry));
                    commands.push((key.clone(), component.mount()));
                    self.components.insert(key.clone(), component);
                }
            }
        }
        commands
    }

    /// Report a finished script fetch. Every component waiting on the
    /// script continues.
    pub fn script_loaded(
        &mut self,
        url: &str,
        result: Result<(), EmbedError>,
    ) -> Vec<(NodeKey, LoadCommand)> {
        self.registry.finish(url, &result);
        let mut commands = Vec::new();
        for (key, component) in &mut self.components {
            let Some(ticket) = component.awaiting_script() else {
                continue;
            };
            if let Some(cmd) = component.script_ready(ticket, result.clone()) {
                commands.push((key.clone(), cmd));
            }
        }
        commands
    }

    /// Report a widget creation for the component at `key`.
    pub fn widget_created(
        &mut self,
        key: &NodeKey,
        ticket: LoadTicket,
        result: Result<(), EmbedError>,
    ) {
        match self.components.get_mut(key) {
            Some(component) => component.widget_created(ticket, result),
            None => {
                tracing::debug!(target: "weft::embed", key = %key, "completion for unmounted embed")
            }
        }
    }

    pub fn get(&self, key: &NodeKey) -> Option<&TweetComponent> {
        self.components.get(key)
    }

    pub fn get_mut(&mut self, key: &NodeKey) -> Option<&mut TweetComponent> {
        self.components.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
