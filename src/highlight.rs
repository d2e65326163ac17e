//! Syntax coloring of replay buffers with `syntect`'s bundled syntaxes and themes.

use std::ops::Range;
use std::path::Path;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{RetypeError, RetypeResult};

pub const DEFAULT_THEME: &str = "base16-ocean.dark";

/// Language tag for files without a recognizable extension.
pub const PLAIN_LANGUAGE: &str = "text";

/// A colored byte range of the buffer. Tokens returned by [`Highlighter::tokenize`] tile the
/// buffer: they are contiguous, non-empty and cover it exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub range: Range<usize>,
    pub color: Rgba8,
}

/// Language tag for a repository path: its lowercased extension, the file name for
/// extensionless build files, or [`PLAIN_LANGUAGE`].
pub fn language_for_path(path: &str) -> String {
    let p = Path::new(path);
    if let Some(ext) = p.extension().and_then(|e| e.to_str()) {
        return ext.to_ascii_lowercase();
    }
    match p.file_name().and_then(|n| n.to_str()) {
        Some("Makefile" | "makefile" | "GNUmakefile") => "makefile".to_string(),
        Some("Dockerfile") => "dockerfile".to_string(),
        _ => PLAIN_LANGUAGE.to_string(),
    }
}

pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    theme_name: String,
}

impl Highlighter {
    /// Load the bundled syntaxes and the theme `theme`, which is either a bundled theme name or a
    /// path to a `.tmTheme` file.
    pub fn new(theme: &str) -> RetypeResult<Self> {
        let resolved = if theme.ends_with(".tmTheme") {
            ThemeSet::get_theme(theme)
                .map_err(|e| RetypeError::config(format!("failed to load theme '{theme}': {e}")))?
        } else {
            let mut themes = ThemeSet::load_defaults().themes;
            themes.remove(theme).ok_or_else(|| {
                RetypeError::config(format!(
                    "unknown theme '{theme}' (available: {})",
                    Self::theme_names().join(", ")
                ))
            })?
        };

        Ok(Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme: resolved,
            theme_name: theme.to_string(),
        })
    }

    /// Names of the bundled themes.
    pub fn theme_names() -> Vec<String> {
        ThemeSet::load_defaults().themes.into_keys().collect()
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn background(&self) -> Rgba8 {
        self.theme
            .settings
            .background
            .map(to_rgba8)
            .unwrap_or(Rgba8::opaque(0x2b, 0x30, 0x3b))
    }

    pub fn foreground(&self) -> Rgba8 {
        self.theme
            .settings
            .foreground
            .map(to_rgba8)
            .unwrap_or(Rgba8::opaque(0xc0, 0xc5, 0xce))
    }

    /// Color for gutter line numbers, falling back to a dimmed foreground.
    pub fn gutter_foreground(&self) -> Rgba8 {
        self.theme
            .settings
            .gutter_foreground
            .map(to_rgba8)
            .unwrap_or_else(|| self.foreground().with_alpha_scaled(0.45))
    }

    /// Caret color, falling back to the foreground.
    pub fn caret(&self) -> Rgba8 {
        self.theme
            .settings
            .caret
            .map(to_rgba8)
            .unwrap_or_else(|| self.foreground())
    }

    pub fn supports(&self, language: &str) -> bool {
        self.syntax(language).is_some()
    }

    fn syntax(&self, language: &str) -> Option<&SyntaxReference> {
        let lang = language.to_ascii_lowercase();
        if lang == PLAIN_LANGUAGE {
            return None;
        }
        self.syntax_set
            .find_syntax_by_token(&lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(&lang))
            .or_else(|| self.syntax_set.find_syntax_by_name(language))
    }

    /// Color `text` as `language`. Unknown languages and lexer failures yield a single token in
    /// the theme foreground.
    pub fn tokenize(&self, language: Option<&str>, text: &str) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        let Some(syntax) = language.and_then(|l| self.syntax(l)) else {
            return self.plain(text);
        };

        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let mut tokens: Vec<Token> = Vec::new();
        let mut offset = 0usize;
        for line in LinesWithEndings::from(text) {
            let regions = match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(regions) => regions,
                Err(err) => {
                    tracing::debug!(%err, "lexer failed, falling back to plain text");
                    return self.plain(text);
                }
            };
            for (style, piece) in regions {
                if piece.is_empty() {
                    continue;
                }
                let color = to_rgba8(style.foreground);
                let range = offset..offset + piece.len();
                offset = range.end;
                match tokens.last_mut() {
                    Some(last) if last.color == color => last.range.end = range.end,
                    _ => tokens.push(Token { range, color }),
                }
            }
        }

        if offset != text.len() {
            return self.plain(text);
        }
        tokens
    }

    fn plain(&self, text: &str) -> Vec<Token> {
        vec![Token {
            range: 0..text.len(),
            color: self.foreground(),
        }]
    }
}

fn to_rgba8(c: Color) -> Rgba8 {
    Rgba8::new(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../tests/unit/highlight.rs"]
mod tests;
