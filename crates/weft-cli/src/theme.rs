//! Theme files.
//!
//! A theme file is KDL:
//!
//! ```kdl
//! namespace "docs"
//! theme {
//!     paragraph "para"
//!     code "code-block"
//!     text {
//!         bold "b"
//!         italic "i"
//!     }
//!     code-highlight {
//!         keyword "tok-kw"
//!         string "tok-str"
//!     }
//!     embed-block {
//!         base "embed"
//!     }
//! }
//! ```
//!
//! Files ending in `.json` are read as a JSON `EditorConfig` instead.

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode};
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use weft_editor_core::{
    EditorConfig, EditorError, EditorTheme, EmbedBlockTheme, SmolStr, TextTheme,
};

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(config::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("theme file is not valid KDL: {message}")]
    #[diagnostic(code(config::parse))]
    Parse {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("unknown key `{key}` in {section}")]
    #[diagnostic(code(config::unknown_key))]
    UnknownKey { section: &'static str, key: String },

    #[error("invalid configuration value for {field}: {message}")]
    #[diagnostic(code(config::invalid))]
    Invalid { field: String, message: String },

    #[error("invalid JSON configuration")]
    #[diagnostic(code(config::json))]
    Json(#[source] EditorError),
}

/// Load a theme from disk, picking the format from the extension.
pub fn load(path: &Path) -> Result<EditorConfig, ConfigError> {
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => EditorConfig::from_json(&source).map_err(ConfigError::Json)?,
        _ => parse(&path.display().to_string(), source)?,
    };
    tracing::debug!(
        target: "weft::cli",
        path = %path.display(),
        namespace = %config.namespace,
        "loaded theme"
    );
    Ok(config)
}

/// Parse KDL theme source. `name` labels the source in diagnostics.
pub fn parse(name: &str, source: String) -> Result<EditorConfig, ConfigError> {
    let doc: KdlDocument = match source.parse() {
        Ok(doc) => doc,
        Err(e) => {
            let span = (e.span.offset(), e.span.len()).into();
            return Err(ConfigError::Parse {
                message: e.to_string(),
                src: NamedSource::new(name, source),
                span,
            });
        }
    };

    let mut config = EditorConfig::default();
    for node in doc.nodes() {
        match node.name().value() {
            "namespace" => config.namespace = string_arg(node, "namespace")?,
            "theme" => config.theme = parse_theme(node)?,
            other => {
                return Err(ConfigError::UnknownKey {
                    section: "the top level",
                    key: other.to_string(),
                });
            }
        }
    }
    Ok(config)
}

fn parse_theme(node: &KdlNode) -> Result<EditorTheme, ConfigError> {
    let mut theme = EditorTheme::default();
    for child in children(node) {
        match child.name().value() {
            "root" => theme.root = Some(string_arg(child, "theme.root")?),
            "paragraph" => theme.paragraph = Some(string_arg(child, "theme.paragraph")?),
            "code" => theme.code = Some(string_arg(child, "theme.code")?),
            "text" => theme.text = parse_text(child)?,
            "code-highlight" => {
                for token in children(child) {
                    let field = format!("theme.code-highlight.{}", token.name().value());
                    theme
                        .code_highlight
                        .insert(SmolStr::new(token.name().value()), string_arg(token, &field)?);
                }
            }
            "embed-block" => theme.embed_block = parse_embed_block(child)?,
            other => {
                return Err(ConfigError::UnknownKey {
                    section: "theme",
                    key: other.to_string(),
                });
            }
        }
    }
    Ok(theme)
}

fn parse_text(node: &KdlNode) -> Result<TextTheme, ConfigError> {
    let mut text = TextTheme::default();
    for child in children(node) {
        let name = child.name().value();
        let slot = match name {
            "bold" => &mut text.bold,
            "italic" => &mut text.italic,
            "underline" => &mut text.underline,
            "strikethrough" => &mut text.strikethrough,
            "code" => &mut text.code,
            other => {
                return Err(ConfigError::UnknownKey {
                    section: "theme.text",
                    key: other.to_string(),
                });
            }
        };
        *slot = Some(string_arg(child, &format!("theme.text.{name}"))?);
    }
    Ok(text)
}

fn parse_embed_block(node: &KdlNode) -> Result<EmbedBlockTheme, ConfigError> {
    let mut embed = EmbedBlockTheme::default();
    for child in children(node) {
        match child.name().value() {
            "base" => embed.base = Some(string_arg(child, "theme.embed-block.base")?),
            "focus" => embed.focus = Some(string_arg(child, "theme.embed-block.focus")?),
            other => {
                return Err(ConfigError::UnknownKey {
                    section: "theme.embed-block",
                    key: other.to_string(),
                });
            }
        }
    }
    Ok(embed)
}

fn children(node: &KdlNode) -> &[KdlNode] {
    node.children().map(|doc| doc.nodes()).unwrap_or(&[])
}

/// The node's first positional argument, which must be a string.
fn string_arg(node: &KdlNode, field: &str) -> Result<SmolStr, ConfigError> {
    let entry = node
        .entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .ok_or_else(|| ConfigError::Invalid {
            field: field.to_string(),
            message: "expected a string argument".to_string(),
        })?;
    entry
        .value()
        .as_string()
        .map(SmolStr::new)
        .ok_or_else(|| ConfigError::Invalid {
            field: field.to_string(),
            message: format!("expected a string, found {}", entry.value()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_theme() {
        let config = parse(
            "theme.kdl",
            r#"
namespace "docs"
theme {
    root "editor"
    paragraph "para"
    code "code-block"
    text {
        bold "b"
        code "inline-code"
    }
    code-highlight {
        keyword "tok-kw"
        string "tok-str"
    }
    embed-block {
        base "embed"
        focus "embed-focus"
    }
}
"#
            .to_string(),
        )
        .unwrap();

        assert_eq!(config.namespace, "docs");
        assert_eq!(config.theme.root.as_deref(), Some("editor"));
        assert_eq!(config.theme.paragraph.as_deref(), Some("para"));
        assert_eq!(config.theme.code.as_deref(), Some("code-block"));
        assert_eq!(config.theme.text.bold.as_deref(), Some("b"));
        assert_eq!(config.theme.text.italic, None);
        assert_eq!(config.theme.text.code.as_deref(), Some("inline-code"));
        assert_eq!(
            config.theme.code_highlight.get("string").map(|s| s.as_str()),
            Some("tok-str")
        );
        assert_eq!(config.theme.embed_block.focus.as_deref(), Some("embed-focus"));
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse("empty.kdl", String::new()).unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_unknown_key() {
        let err = parse("t.kdl", "theme {\n  heading \"h\"\n}".to_string()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownKey { section: "theme", ref key } if key == "heading"
        ));
    }

    #[test]
    fn test_non_string_value() {
        let err = parse("t.kdl", "theme {\n  code 3\n}".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "theme.code"));

        let err = parse("t.kdl", "namespace".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "namespace"));
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("t.kdl", "theme {".to_string()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
