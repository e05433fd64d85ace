//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::{BTreeMap, HashMap};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::SiteConfig;

/// Turns a fenced code block into HTML, given its language tag
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: &str) -> String;
}

impl<F> Highlighter for F
where
    F: Fn(&str, &str) -> String + Send + Sync,
{
    fn highlight(&self, code: &str, lang: &str) -> String {
        self(code, lang)
    }
}

/// syntect-backed highlighter
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl SyntectHighlighter {
    pub fn new(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Add line numbers to highlighted code
    fn add_line_numbers(&self, code: &str, lang: &str) -> String {
        let lines: Vec<&str> = code.lines().collect();

        let gutter = (1..=lines.len())
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            html_escape(lang),
            gutter,
            lines.join("\n")
        )
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: &str) -> String {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let Some(theme) = theme else {
            return plain_code_block(code, Some(lang));
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => self.add_line_numbers(&highlighted, lang),
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                html_escape(lang),
                highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                plain_code_block(code, Some(lang))
            }
        }
    }
}

/// Markdown renderer with a pluggable code highlighter and link aliases
pub struct MarkdownRenderer {
    highlighter: Option<Box<dyn Highlighter>>,
    languages: HashMap<String, String>,
    /// Sorted longest prefix first
    aliases: Vec<(String, String)>,
}

impl MarkdownRenderer {
    /// Create a renderer with syntect highlighting and no aliases
    pub fn new() -> Self {
        Self {
            highlighter: Some(Box::new(SyntectHighlighter::new(
                "base16-ocean.dark",
                false,
            ))),
            languages: HashMap::new(),
            aliases: Vec::new(),
        }
    }

    /// Create a renderer from site settings
    pub fn from_config(config: &SiteConfig) -> Self {
        let highlighter: Option<Box<dyn Highlighter>> = if config.highlight.enable {
            Some(Box::new(SyntectHighlighter::new(
                &config.highlight.theme,
                config.highlight.line_number,
            )))
        } else {
            None
        };

        Self {
            highlighter,
            languages: config.highlight.languages.clone(),
            aliases: sort_aliases(&config.alias),
        }
    }

    /// Replace the code highlighter
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    /// Replace the link aliases
    pub fn with_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        self.aliases = sort_aliases(aliases);
        self
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is stripped before rendering, so no metadata blocks here
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        // Some(lang) while inside a code block
        let mut code_block: Option<Option<String>> = None;
        let mut code_content = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|s| s.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let rendered = self.highlight_code(&code_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(rendered)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_content.push_str(&text);
                }
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Link {
                        link_type,
                        dest_url: self.resolve_alias(dest_url),
                        title,
                        id,
                    }));
                }
                Event::Start(Tag::Image {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    events.push(Event::Start(Tag::Image {
                        link_type,
                        dest_url: self.resolve_alias(dest_url),
                        title,
                        id,
                    }));
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Dispatch a code block to the highlighter by language tag
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let Some(lang) = lang else {
            return plain_code_block(code, None);
        };
        let lang = self
            .languages
            .get(lang)
            .map(String::as_str)
            .unwrap_or(lang);

        match &self.highlighter {
            Some(highlighter) => highlighter.highlight(code, lang),
            None => plain_code_block(code, Some(lang)),
        }
    }

    fn resolve_alias<'a>(&self, dest: CowStr<'a>) -> CowStr<'a> {
        match resolve_alias(&dest, &self.aliases) {
            Some(resolved) => CowStr::from(resolved),
            None => dest,
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_aliases(aliases: &BTreeMap<String, String>) -> Vec<(String, String)> {
    let mut sorted: Vec<_> = aliases
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    sorted
}

/// Rewrite `dest` if it starts with an alias on a segment boundary
fn resolve_alias(dest: &str, aliases: &[(String, String)]) -> Option<String> {
    for (alias, target) in aliases {
        if dest == alias {
            return Some(target.clone());
        }
        if let Some(rest) = dest.strip_prefix(alias.as_str()) {
            if let Some(rest) = rest.strip_prefix('/') {
                return Some(format!("{}/{}", target.trim_end_matches('/'), rest));
            }
        }
    }
    None
}

fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    match lang {
        Some(lang) => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            html_escape(lang),
            html_escape(code)
        ),
        None => format!("<pre><code>{}</code></pre>", html_escape(code)),
    }
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
