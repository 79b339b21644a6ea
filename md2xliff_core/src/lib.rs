//! `md2xliff_core` converts markdown documents into XLIFF 1.2 translation
//! packages and back. Every translatable span of a document becomes a
//! `trans-unit`, and a skeleton keeps everything else byte for byte with
//! `%%%id%%%` tokens where the units were taken from.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Markdown document
//!   → Tokenizer (mdast with byte offsets, GFM + YAML front matter)
//!   → Block walker (front matter, headings, paragraphs, tables, code, raw HTML, link definitions)
//!   → Inline writer (emphasis, links, images, inline code and template syntax as <bpt>/<ept>/<ph>)
//!   → Segment accumulator (sequential ids, offset based skeleton splicing)
//!   → Exchange document (XLIFF 1.2)
//! ```
//!
//! Reconstruction reads the units back with an XML parser and fills the
//! skeleton with the target (or source) text of each unit.
//!
//! ## Modules
//!
//! - [`template`]: FreeMarker and Handlebars detection inside text runs.
//! - [`inline`]: Inline markup serialization into XLIFF placeholders.
//! - [`html`]: Raw HTML scanning and tag attribute parsing.
//! - [`comments`]: Comment mining for `css` and JavaScript code blocks.
//! - [`front_matter`]: Translatable values of a YAML front matter block.
//! - [`config`]: Configuration loading from `md2xliff.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use md2xliff_core::ExtractOptions;
//! use md2xliff_core::ReconstructOptions;
//! use md2xliff_core::extract;
//! use md2xliff_core::reconstruct;
//!
//! let markdown = "# Hello\n\nSome **bold** text.\n";
//! let extraction = extract(markdown, &ExtractOptions::default())?;
//! assert_eq!(extraction.skeleton, "# %%%1%%%\n\n%%%2%%%\n");
//!
//! let rebuilt = reconstruct(
//! 	&extraction.xliff,
//! 	&extraction.skeleton,
//! 	&ReconstructOptions::source(),
//! )?;
//! assert_eq!(rebuilt, markdown);
//! # Ok::<(), md2xliff_core::Md2XliffError>(())
//! ```

pub use config::*;
pub use error::*;
pub use extract::*;
pub use reconstruct::*;
pub use segments::*;
pub use template::DirectiveMode;
pub use template::TemplateSyntax;
pub use xliff::*;

pub mod comments;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod extract;
pub mod front_matter;
pub mod html;
pub mod inline;
mod position;
mod reconstruct;
mod segments;
pub mod template;
mod xliff;

#[cfg(test)]
mod __fixtures;
