//! Mining translatable comments out of fenced code blocks.
//!
//! Stylesheets are scanned with a small [`logos`] lexer that understands
//! strings, comments and brace nesting. Scripts are parsed with tree-sitter's
//! JavaScript grammar. Both return the byte ranges of the comment *bodies*
//! (delimiters and surrounding whitespace removed) relative to the code they
//! were given, so callers can substitute them in place.

use std::ops::Range;

use logos::Logos;
use tree_sitter::Language;
use tree_sitter::Node;
use tree_sitter::Parser;

use crate::Md2XliffError;
use crate::Md2XliffResult;
use crate::position::trim_range;

/// Code block languages with comment mining support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLanguage {
	Css,
	JavaScript,
}

impl CodeLanguage {
	/// Map the info string language of a fenced block to a supported
	/// language.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag.to_ascii_lowercase().as_str() {
			"css" => Some(Self::Css),
			"js" | "javascript" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Css => "css",
			Self::JavaScript => "javascript",
		}
	}
}

/// Byte ranges of every non-empty comment body in `code`, in source order.
pub fn find_comments(code: &str, language: CodeLanguage) -> Md2XliffResult<Vec<Range<usize>>> {
	let comments = match language {
		CodeLanguage::Css => css_comments(code),
		CodeLanguage::JavaScript => script_comments(code),
	}
	.map_err(|reason| {
		Md2XliffError::CodeComments {
			language: language.name().to_string(),
			reason,
		}
	})?;

	Ok(comments
		.into_iter()
		.map(|comment| comment_body(code, comment))
		.filter(|body| !body.is_empty())
		.collect())
}

/// Strip the delimiters of a single comment and trim what remains.
fn comment_body(code: &str, comment: Range<usize>) -> Range<usize> {
	let raw = &code[comment.clone()];
	let (start, end) = if raw.starts_with("//") {
		(comment.start + 2, comment.end)
	} else if raw.starts_with("/*") && raw.ends_with("*/") && raw.len() >= 4 {
		let inner = &raw[2..raw.len() - 2];
		let leading = inner.len() - inner.trim_start_matches('*').len();
		let trailing = inner.len() - inner.trim_end_matches('*').len();
		if leading + trailing >= inner.len() {
			return comment.start..comment.start;
		}
		(comment.start + 2 + leading, comment.end - 2 - trailing)
	} else {
		(comment.start, comment.end)
	};

	if start >= end {
		return start..start;
	}

	trim_range(code, start..end)
}

#[derive(Logos, Debug, PartialEq)]
enum CssToken {
	#[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
	Comment,
	#[token("/*")]
	UnterminatedComment,
	#[regex(r#""([^"\\\n]|\\.)*""#)]
	#[regex(r"'([^'\\\n]|\\.)*'")]
	String,
	#[token("\"")]
	#[token("'")]
	UnterminatedString,
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[regex(r#"[^/*"'{}]+"#)]
	Other,
	#[token("/")]
	#[token("*")]
	Punctuation,
}

fn css_comments(code: &str) -> Result<Vec<Range<usize>>, String> {
	let mut comments = Vec::new();
	let mut depth: usize = 0;

	for (token, span) in CssToken::lexer(code).spanned() {
		match token {
			Ok(CssToken::Comment) => comments.push(span),
			Ok(CssToken::UnterminatedComment) => {
				return Err(format!("unterminated comment at byte {}", span.start));
			}
			Ok(CssToken::UnterminatedString) => {
				return Err(format!("unterminated string at byte {}", span.start));
			}
			Ok(CssToken::BraceOpen) => depth += 1,
			Ok(CssToken::BraceClose) => {
				depth = depth
					.checked_sub(1)
					.ok_or_else(|| format!("unexpected `}}` at byte {}", span.start))?;
			}
			Ok(CssToken::String | CssToken::Other | CssToken::Punctuation) => {}
			Err(()) => return Err(format!("unrecognised input at byte {}", span.start)),
		}
	}

	if depth > 0 {
		return Err(format!("{depth} unclosed `{{`"));
	}

	Ok(comments)
}

fn script_comments(code: &str) -> Result<Vec<Range<usize>>, String> {
	let mut parser = Parser::new();
	let language: Language = tree_sitter_javascript::LANGUAGE.into();
	parser
		.set_language(&language)
		.map_err(|error| error.to_string())?;

	if let Some(comments) = parse_script(&mut parser, code) {
		return Ok(comments);
	}

	// Object literals and bare expressions only parse inside parentheses.
	let prefix = "(\n";
	let wrapped = format!("{prefix}{code}\n)");
	let comments = parse_script(&mut parser, &wrapped)
		.ok_or_else(|| "script does not parse, even wrapped in parentheses".to_string())?;

	Ok(comments
		.into_iter()
		.filter(|comment| comment.start >= prefix.len() && comment.end <= prefix.len() + code.len())
		.map(|comment| comment.start - prefix.len()..comment.end - prefix.len())
		.collect())
}

fn parse_script(parser: &mut Parser, code: &str) -> Option<Vec<Range<usize>>> {
	let tree = parser.parse(code, None)?;
	let root = tree.root_node();
	if root.has_error() {
		return None;
	}

	let mut comments = Vec::new();
	collect_comments(root, &mut comments);
	comments.sort_by_key(|comment| comment.start);

	Some(comments)
}

fn collect_comments(node: Node<'_>, comments: &mut Vec<Range<usize>>) {
	if node.kind() == "comment" {
		comments.push(node.byte_range());
		return;
	}

	let mut cursor = node.walk();
	for child in node.children(&mut cursor) {
		collect_comments(child, comments);
	}
}
