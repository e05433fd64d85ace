//! Content module - handles posts, front-matter and markdown processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;
pub mod select;

pub use frontmatter::{parse_date_string, Frontmatter, Meta};
pub use markdown::{Highlighter, MarkdownRenderer, SyntectHighlighter};
pub use post::Post;
