//! Code block tokenization with syntect.
//!
//! `tokenize` turns source text into lines of classified tokens;
//! `Transaction::highlight_code` rebuilds a code node's children from them.

use std::sync::LazyLock;

use smol_str::SmolStr;
use syntect::parsing::{ParseState, ScopeStack, SyntaxSet};

use crate::error::EditorError;
use crate::key::NodeKey;
use crate::node::code::create_code_highlight_node;
use crate::node::text::create_line_break_node;
use crate::node::{Node, NodeKind};
use crate::selection::{Point, PointKind, RangeSelection};
use crate::state::EditorState;
use crate::transaction::Transaction;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// A run of code text with one highlight type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeToken {
    pub text: String,
    pub highlight_type: Option<SmolStr>,
}

/// Split `code` into lines of tokens.
///
/// The highlight type of a token is the first atom of its innermost scope
/// (`keyword`, `string`, `comment`, ...). Text that is only inside the
/// syntax's top-level scope is unclassified. Unknown languages fall back to
/// plain text.
pub fn tokenize(language: Option<&str>, code: &str) -> Vec<Vec<CodeToken>> {
    let syntax = language
        .and_then(|l| SYNTAX_SET.find_syntax_by_token(l))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());

    if tracing::enabled!(target: "weft::highlight", tracing::Level::TRACE) {
        tracing::trace!(
            target: "weft::highlight",
            language = ?language,
            syntax = %syntax.name,
            code = %code.escape_debug(),
            "tokenize"
        );
    }

    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut lines = Vec::new();

    for line in code.split('\n') {
        let mut tokens: Vec<CodeToken> = Vec::new();
        let source = format!("{line}\n");
        let ops = match state.parse_line(&source, &SYNTAX_SET) {
            Ok(ops) => ops,
            Err(e) => {
                tracing::warn!(
                    target: "weft::highlight",
                    error = ?e,
                    "parse failed, line left plain"
                );
                Vec::new()
            }
        };

        let mut start = 0;
        for (pos, op) in ops {
            let pos = pos.min(line.len());
            push_token(&mut tokens, &line[start..pos], highlight_type(&stack));
            start = pos;
            if let Err(e) = stack.apply(&op) {
                tracing::warn!(target: "weft::highlight", error = ?e, "bad scope op");
            }
        }
        push_token(&mut tokens, &line[start..], highlight_type(&stack));
        lines.push(tokens);
    }
    lines
}

fn highlight_type(stack: &ScopeStack) -> Option<SmolStr> {
    let scopes = stack.as_slice();
    if scopes.len() <= 1 {
        return None;
    }
    let innermost = scopes.last()?.build_string();
    innermost.split('.').next().map(SmolStr::new)
}

fn push_token(tokens: &mut Vec<CodeToken>, text: &str, highlight_type: Option<SmolStr>) {
    if text.is_empty() {
        return;
    }
    match tokens.last_mut() {
        Some(last) if last.highlight_type == highlight_type => last.text.push_str(text),
        _ => tokens.push(CodeToken {
            text: text.to_string(),
            highlight_type,
        }),
    }
}

impl Transaction {
    /// Re-tokenize a code node and replace its children with highlight and
    /// line break nodes. A caret inside the block stays at the same
    /// character offset.
    ///
    /// Returns false when the children already matched the tokens.
    pub fn highlight_code(&mut self, code: &NodeKey) -> Result<bool, EditorError> {
        let node = self.node(code)?;
        let NodeKind::Code(code_node) = node.kind() else {
            return Err(EditorError::InvalidAttribute {
                attribute: "code",
                reason: format!("{} is a {} node", code, node.node_type()),
            });
        };
        let language = code_node.language.clone();
        let old_children = node.children().to_vec();
        let text = self.state().text_content(code);
        let lines = tokenize(language.as_deref(), &text);

        if children_match(self.state(), &old_children, &lines) {
            return Ok(false);
        }

        let caret = self
            .selection()
            .filter(|s| s.is_collapsed())
            .and_then(|s| code_offset(self.state(), code, s.anchor()));

        for child in &old_children {
            self.remove(child)?;
        }
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                let br = create_line_break_node(self)?;
                self.append(code, &br)?;
            }
            for token in line {
                let key =
                    create_code_highlight_node(self, &token.text, token.highlight_type.as_deref())?;
                self.append(code, &key)?;
            }
        }

        if let Some(offset) = caret {
            let point = point_at_offset(self.state(), code, offset);
            self.set_selection(Some(RangeSelection::collapsed(point)));
        }

        tracing::debug!(
            target: "weft::highlight",
            code = %code,
            language = ?language,
            lines = lines.len(),
            "code block re-highlighted"
        );
        Ok(true)
    }
}

fn children_match(state: &EditorState, children: &[NodeKey], lines: &[Vec<CodeToken>]) -> bool {
    let mut expected = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            expected.push(None);
        }
        expected.extend(line.iter().map(Some));
    }
    if expected.len() != children.len() {
        return false;
    }
    children.iter().zip(expected).all(|(key, token)| {
        match (state.node(key).map(Node::kind), token) {
            (Some(NodeKind::LineBreak), None) => true,
            (Some(NodeKind::CodeHighlight(h)), Some(t)) => {
                h.text == t.text && h.highlight_type == t.highlight_type
            }
            _ => false,
        }
    })
}

/// Character offset of `point` within the code block's text.
fn code_offset(state: &EditorState, code: &NodeKey, point: &Point) -> Option<usize> {
    let children = state.node(code)?.children();
    let (upto, extra) = if point.key == *code && point.kind == PointKind::Element {
        (point.offset.min(children.len()), 0)
    } else {
        let index = children.iter().position(|k| *k == point.key)?;
        match point.kind {
            PointKind::Text => (index, point.offset),
            PointKind::Element => (index + 1, 0),
        }
    };
    let before: usize = children[..upto]
        .iter()
        .map(|k| state.text_content(k).chars().count())
        .sum();
    Some(before + extra)
}

/// Point at a character offset within the code block's text.
fn point_at_offset(state: &EditorState, code: &NodeKey, offset: usize) -> Point {
    let children = state.node(code).map(Node::children).unwrap_or_default();
    let mut remaining = offset;
    for (i, key) in children.iter().enumerate() {
        let Some(node) = state.node(key) else {
            continue;
        };
        match node.text() {
            Some(text) => {
                let len = text.chars().count();
                if remaining < len || (remaining == len && i + 1 == children.len()) {
                    return Point::text(key.clone(), remaining);
                }
                remaining -= len;
            }
            None => {
                if remaining == 0 {
                    return Point::element(code.clone(), i);
                }
                remaining -= 1;
            }
        }
    }
    Point::element(code.clone(), children.len())
}
