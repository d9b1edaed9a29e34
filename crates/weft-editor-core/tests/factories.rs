//! Properties shared by every node factory and type predicate.

use weft_editor_core::{
    Editor, EditorError, Node, NodeKey, ReadView, Transaction, create_code_highlight_node,
    create_code_node, create_line_break_node, create_paragraph_node, create_text_node,
    create_tweet_node, is_code_highlight_node, is_code_node, is_line_break_node,
    is_paragraph_node, is_text_node, is_tweet_node,
};

struct Factory {
    node_type: &'static str,
    create: fn(&mut Transaction) -> Result<NodeKey, EditorError>,
    create_outside: fn(&mut ReadView<'_>) -> Result<NodeKey, EditorError>,
    is: fn(Option<&Node>) -> bool,
}

macro_rules! factory {
    ($node_type:literal, $is:path, |$cx:ident| $create:expr) => {
        Factory {
            node_type: $node_type,
            create: |$cx| $create,
            create_outside: |$cx| $create,
            is: $is,
        }
    };
}

fn factories() -> Vec<Factory> {
    vec![
        factory!("paragraph", is_paragraph_node, |cx| create_paragraph_node(cx)),
        factory!("text", is_text_node, |cx| create_text_node(cx, "hello")),
        factory!("linebreak", is_line_break_node, |cx| create_line_break_node(cx)),
        factory!("code", is_code_node, |cx| create_code_node(cx, Some("rust"))),
        factory!("code-highlight", is_code_highlight_node, |cx| {
            create_code_highlight_node(cx, "fn", Some("keyword"))
        }),
        factory!("tweet", is_tweet_node, |cx| create_tweet_node(cx, "1")),
    ]
}

#[test]
fn factories_build_matching_nodes_with_distinct_keys() {
    let table = factories();
    let mut editor = Editor::default();
    editor
        .update(|tx| {
            for factory in &table {
                let a = (factory.create)(tx)?;
                let b = (factory.create)(tx)?;
                assert_ne!(a, b, "{}", factory.node_type);

                let (a, b) = (tx.node(&a)?, tx.node(&b)?);
                assert_eq!(a.node_type(), factory.node_type);
                assert_eq!(a.node_type(), b.node_type());
                assert_eq!(a.kind(), b.kind());
                assert!(a.same_content(b), "{}", factory.node_type);
                assert_eq!(a.parent(), None);

                // Exactly one predicate claims the node.
                for other in &table {
                    assert_eq!(
                        (other.is)(Some(a)),
                        other.node_type == factory.node_type,
                        "{} checked against {}",
                        other.node_type,
                        factory.node_type
                    );
                }
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn predicates_reject_missing_nodes() {
    for factory in factories() {
        assert!(!(factory.is)(None), "{}", factory.node_type);
    }
}

#[test]
fn factories_fail_outside_a_transaction() {
    let editor = Editor::default();
    for factory in factories() {
        let result = editor.read(|view| (factory.create_outside)(view));
        assert_eq!(
            result,
            Err(EditorError::OutsideTransaction),
            "{}",
            factory.node_type
        );
    }
    // Nothing was allocated or attached.
    assert!(editor.state().is_empty());
}

#[test]
fn tweet_factory_checks_context_before_id() {
    let mut editor = Editor::default();
    assert_eq!(
        editor.read(|view| create_tweet_node(view, "")),
        Err(EditorError::OutsideTransaction)
    );

    let err = editor.update(|tx| create_tweet_node(tx, "  ")).unwrap_err();
    assert!(matches!(
        err,
        EditorError::InvalidAttribute {
            attribute: "tweet id",
            ..
        }
    ));
}
