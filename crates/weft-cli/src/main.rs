use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use weft_editor_core::{
    Editor, EditorConfig, EditorError, NodeKey, SerializedNode, Transaction, export_json,
    is_code_node,
};

mod theme;

#[derive(Parser)]
#[command(version, about = "weft - render serialized editor documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a JSON document to HTML
    Render {
        /// Serialized document (`weft export` output)
        document: PathBuf,

        /// Theme file (KDL, or JSON with a .json extension)
        #[arg(long, env = "WEFT_THEME")]
        theme: Option<PathBuf>,

        /// Tokenize code blocks before rendering
        #[arg(long)]
        highlight: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the plain text content of a document
    Text {
        document: PathBuf,
    },
    /// Re-export a document, normalized (and optionally highlighted)
    Export {
        document: PathBuf,

        #[arg(long)]
        highlight: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_miette();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            document,
            theme,
            highlight,
            output,
        } => {
            let config = match theme {
                Some(path) => theme::load(&path)?,
                None => EditorConfig::default(),
            };
            let editor = load_editor(&document, config, highlight)?;
            write_output(output.as_deref(), &editor.to_html())?;
        }
        Commands::Text { document } => {
            let editor = load_editor(&document, EditorConfig::default(), false)?;
            println!("{}", editor.text_content());
        }
        Commands::Export {
            document,
            highlight,
            output,
        } => {
            let editor = load_editor(&document, EditorConfig::default(), highlight)?;
            let json = export_json(editor.state()).into_diagnostic()?;
            let pretty = serde_json::to_string_pretty(&json).into_diagnostic()?;
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

fn load_editor(path: &Path, config: EditorConfig, highlight: bool) -> Result<Editor> {
    let source = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let doc = SerializedNode::from_json(&source).into_diagnostic()?;

    let start = std::time::Instant::now();
    let editor = build_editor(&doc, config, highlight).into_diagnostic()?;
    tracing::info!(
        target: "weft::cli",
        path = %path.display(),
        nodes = editor.state().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "document loaded"
    );
    Ok(editor)
}

/// Import `doc` into a fresh editor, tokenizing code blocks when asked.
fn build_editor(
    doc: &SerializedNode,
    config: EditorConfig,
    highlight: bool,
) -> Result<Editor, EditorError> {
    let mut editor = Editor::new(config);
    editor.update(|tx| {
        let blocks = tx.import(doc)?;
        if highlight {
            highlight_blocks(tx, &blocks)?;
        }
        Ok(())
    })?;
    Ok(editor)
}

fn highlight_blocks(tx: &mut Transaction, blocks: &[NodeKey]) -> Result<(), EditorError> {
    for key in blocks {
        if is_code_node(tx.state().node(key)) {
            tx.highlight_code(key)?;
        }
    }
    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).into_diagnostic()?;
                }
            }
            std::fs::write(path, content).into_diagnostic()?;
            tracing::info!(target: "weft::cli", path = %path.display(), "wrote output");
        }
        None => println!("{content}"),
    }
    Ok(())
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}

#[cfg(test)]
mod tests {
    use weft_editor_core::{EditorTheme, NodeKind};

    use super::*;

    const DOC: &str = r#"{
        "type": "root",
        "children": [
            {"type": "paragraph", "children": [{"type": "text", "text": "hi", "format": 1}]},
            {"type": "code", "language": "rust",
             "children": [{"type": "text", "text": "let x = 1;"}]}
        ]
    }"#;

    #[test]
    fn test_render_themed_paragraph() {
        let doc = SerializedNode::from_json(
            r#"{"type":"root","children":[{"type":"paragraph","children":[{"type":"text","text":"hi"}]}]}"#,
        )
        .unwrap();
        let config = EditorConfig::with_theme(EditorTheme {
            paragraph: Some("para".into()),
            ..Default::default()
        });
        let editor = build_editor(&doc, config, false).unwrap();
        insta::assert_snapshot!(
            editor.to_html(),
            @r#"<div contenteditable="true" style="user-select: text; white-space: pre-wrap; word-break: break-word;" data-weft-editor="true"><p class="para" dir="ltr"><span>hi</span></p></div>"#
        );
    }

    #[test]
    fn test_highlight_replaces_code_children() {
        let doc = SerializedNode::from_json(DOC).unwrap();

        let plain = build_editor(&doc, EditorConfig::default(), false).unwrap();
        let highlighted = build_editor(&doc, EditorConfig::default(), true).unwrap();
        assert_eq!(plain.text_content(), highlighted.text_content());

        let state = highlighted.state();
        let code = state
            .walk()
            .into_iter()
            .find(|key| is_code_node(state.node(key)))
            .unwrap();
        let kinds: Vec<_> = state.children(&code).map(|n| n.node_type()).collect();
        assert!(!kinds.is_empty());
        assert!(kinds.iter().all(|k| *k == "code-highlight"));
        assert!(state.children(&code).any(|n| matches!(
            n.kind(),
            NodeKind::CodeHighlight(h) if h.highlight_type.is_some()
        )));
    }

    #[test]
    fn test_rejects_inline_at_top_level() {
        let doc = SerializedNode::from_json(r#"{"type":"text","text":"loose"}"#).unwrap();
        let err = build_editor(&doc, EditorConfig::default(), false).unwrap_err();
        assert!(matches!(err, EditorError::InvalidDocument(_)));
    }
}
