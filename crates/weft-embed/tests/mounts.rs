//! Embeds driven by editor decorations.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use weft_editor_core::{Editor, NodeKey, create_tweet_node};
use weft_embed::{
    EmbedError, EmbedMounts, LoadCommand, LoadState, ScriptRegistry, TWITTER_WIDGET_SCRIPT_URL,
};

fn editor_with_tweets(ids: &[&'static str]) -> (Editor, Vec<NodeKey>) {
    let mut editor = Editor::default();
    let keys = editor
        .update(|tx| {
            let mut keys = Vec::new();
            for id in ids {
                let key = create_tweet_node(tx, id)?;
                tx.append(&NodeKey::root(), &key)?;
                keys.push(key);
            }
            Ok(keys)
        })
        .unwrap();
    (editor, keys)
}

#[test]
fn script_is_fetched_once_for_many_embeds() {
    let (editor, keys) = editor_with_tweets(&["1", "2"]);
    let mut mounts = EmbedMounts::new(Arc::new(ScriptRegistry::new()));

    let commands = mounts.sync(editor.decorations());
    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0].1, LoadCommand::FetchScript { .. }));
    assert!(matches!(commands[1].1, LoadCommand::AwaitScript { .. }));

    let next = mounts.script_loaded(TWITTER_WIDGET_SCRIPT_URL, Ok(()));
    assert_eq!(next.len(), 2);
    for (key, cmd) in next {
        let LoadCommand::CreateWidget { ticket, .. } = cmd else {
            panic!("expected widget creation");
        };
        mounts.widget_created(&key, ticket, Ok(()));
    }
    for key in &keys {
        assert_eq!(mounts.get(key).unwrap().state(), &LoadState::Ready);
    }
}

#[test]
fn id_change_and_removal_follow_the_tree() {
    let (mut editor, keys) = editor_with_tweets(&["1"]);
    let registry = Arc::new(ScriptRegistry::new());
    registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));
    let mut mounts = EmbedMounts::new(registry);

    let synced = Rc::new(RefCell::new(0));
    {
        let synced = synced.clone();
        editor.register_decorator_listener(move |_| *synced.borrow_mut() += 1);
    }

    let first = mounts.sync(editor.decorations());
    let (_, stale) = &first[0];

    editor.update(|tx| tx.set_tweet_id(&keys[0], "9")).unwrap();
    assert_eq!(*synced.borrow(), 1);
    let second = mounts.sync(editor.decorations());
    assert_eq!(second.len(), 1);
    assert!(matches!(&second[0].1, LoadCommand::CreateWidget { id, .. } if id == "9"));

    // The first attempt finishing late does not settle the new one.
    mounts.widget_created(&keys[0], stale.ticket(), Err(EmbedError::widget("1", "gone")));
    assert_eq!(mounts.get(&keys[0]).unwrap().state(), &LoadState::Loading);

    editor.update(|tx| tx.remove(&keys[0])).unwrap();
    assert_eq!(*synced.borrow(), 2);
    assert!(mounts.sync(editor.decorations()).is_empty());
    assert!(mounts.is_empty());
}

#[test]
fn alignment_change_does_not_reload() {
    let (mut editor, keys) = editor_with_tweets(&["1"]);
    let registry = Arc::new(ScriptRegistry::new());
    registry.finish(TWITTER_WIDGET_SCRIPT_URL, &Ok(()));
    let mut mounts = EmbedMounts::new(registry);
    mounts.sync(editor.decorations());

    editor
        .update(|tx| tx.set_element_format(&keys[0], Some(weft_editor_core::ElementFormat::Right)))
        .unwrap();
    assert!(mounts.sync(editor.decorations()).is_empty());
    assert_eq!(
        mounts.get(&keys[0]).unwrap().decoration().format,
        Some(weft_editor_core::ElementFormat::Right)
    );
}
