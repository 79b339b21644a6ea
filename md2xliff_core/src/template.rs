//! Detection of embedded template syntax inside translatable text.
//!
//! Two template languages are recognised:
//!
//! - FreeMarker variables (`${user.name}`) and directive pairs
//!   (`<#list items as item>...</#list>`).
//! - Handlebars expressions (`{{ title }}`, `{{> partial }}`).
//!
//! Directive detection accepts both raw angle brackets and their escaped form
//! (`&lt;#if ...&gt;`) so it gives the same answer before and after an
//! escaping pass. All functions are pure and return byte ranges into the text
//! they were given.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

static FREEMARKER_VARIABLE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{[^}]*\}").expect("valid freemarker variable pattern"));

static HANDLEBARS_EXPRESSION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").expect("valid handlebars pattern"));

static DIRECTIVE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?:<|&lt;)#([A-Za-z_][\w.-]*)").expect("valid directive open pattern")
});

static DIRECTIVE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?:<|&lt;)/#([A-Za-z_][\w.-]*)\s*(?:>|&gt;)").expect("valid directive close pattern")
});

static MARKUP_START: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"<|&lt;").expect("valid markup start pattern"));

/// Closing HTML tags directly after the last directive belong to the wrapper
/// that opened before it.
static TRAILING_CLOSE_TAGS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\A(?:\s*(?:<|&lt;)/[A-Za-z][\w:-]*\s*(?:>|&gt;))+").expect("valid close tag pattern")
});

/// The template language a protected region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TemplateSyntax {
	/// `${variable}` references and `<#directive>` pairs.
	FreeMarker,
	/// `{{ expression }}`, `{{> partial }}` and friends.
	Handlebars,
}

impl TemplateSyntax {
	/// The `ctype` attribute value used on the placeholder that protects this
	/// syntax.
	pub fn ctype(self) -> &'static str {
		match self {
			Self::FreeMarker => "x-freemarker-template",
			Self::Handlebars => "x-handlebars-template",
		}
	}
}

/// How extraction treats a FreeMarker closing directive that does not close
/// a directive opened earlier in the same block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectiveMode {
	/// Protect the span with the ordinary directive detection.
	#[default]
	Lenient,
	/// Abort extraction with [`Md2XliffError::AmbiguousDirective`](crate::Md2XliffError::AmbiguousDirective).
	Strict,
}

/// A FreeMarker directive region found in a text run.
///
/// `prefix`, `directive` and `suffix` are adjacent and together cover the
/// whole run. The prefix is the plain text before the first piece of markup,
/// the directive runs from that markup through the last closing directive
/// (including HTML closing tags that immediately follow it), and the suffix
/// is whatever remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch {
	pub prefix: Range<usize>,
	pub directive: Range<usize>,
	pub suffix: Range<usize>,
}

/// A closing directive that has no matching opening directive before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMismatch {
	/// Name of the innermost directive open at that point, if any.
	pub open: Option<String>,
	/// Name used by the offending closing directive.
	pub close: String,
	/// Byte range of the closing directive.
	pub span: Range<usize>,
}

/// Find the FreeMarker directive pair in `text`, if it contains one.
pub fn find_directive(text: &str) -> Option<DirectiveMatch> {
	let open = DIRECTIVE_OPEN.find(text)?;
	let close = DIRECTIVE_CLOSE.find_iter(&text[open.end()..]).last()?;
	let mut end = open.end() + close.end();
	if let Some(wrapper) = TRAILING_CLOSE_TAGS.find(&text[end..]) {
		end += wrapper.end();
	}

	let start = MARKUP_START
		.find(&text[..open.end()])
		.map_or(open.start(), |markup| markup.start());

	Some(DirectiveMatch {
		prefix: 0..start,
		directive: start..end,
		suffix: end..text.len(),
	})
}

/// Byte ranges of all FreeMarker `${...}` variable references.
pub fn find_variables(text: &str) -> Vec<Range<usize>> {
	FREEMARKER_VARIABLE
		.find_iter(text)
		.map(|found| found.range())
		.collect()
}

/// Byte ranges of all Handlebars `{{...}}` expressions.
pub fn find_handlebars(text: &str) -> Vec<Range<usize>> {
	HANDLEBARS_EXPRESSION
		.find_iter(text)
		.map(|found| found.range())
		.collect()
}

pub fn has_variable(text: &str) -> bool {
	FREEMARKER_VARIABLE.is_match(text)
}

pub fn has_handlebars(text: &str) -> bool {
	HANDLEBARS_EXPRESSION.is_match(text)
}

/// Classify a whole text run. FreeMarker wins over Handlebars so that a
/// directive wrapping a partial is protected as one region.
pub fn classify(text: &str) -> Option<TemplateSyntax> {
	if find_directive(text).is_some() || has_variable(text) {
		return Some(TemplateSyntax::FreeMarker);
	}

	has_handlebars(text).then_some(TemplateSyntax::Handlebars)
}

/// Find the first closing directive that does not close a directive opened
/// before it in `text`.
///
/// Directives such as `<#else>` or `<#assign>` never get a closing tag, so a
/// close pops every directive above its match.
pub fn find_directive_mismatch(text: &str) -> Option<DirectiveMismatch> {
	let mut events: Vec<(Range<usize>, bool, &str)> = DIRECTIVE_OPEN
		.captures_iter(text)
		.filter_map(|captures| Some((captures.get(0)?.range(), true, captures.get(1)?.as_str())))
		.chain(DIRECTIVE_CLOSE.captures_iter(text).filter_map(|captures| {
			Some((captures.get(0)?.range(), false, captures.get(1)?.as_str()))
		}))
		.collect();
	events.sort_by_key(|(span, ..)| span.start);

	let mut stack: Vec<&str> = vec![];
	for (span, is_open, name) in events {
		if is_open {
			stack.push(name);
			continue;
		}

		match stack.iter().rposition(|open| *open == name) {
			Some(idx) => stack.truncate(idx),
			None => {
				return Some(DirectiveMismatch {
					open: stack.last().map(ToString::to_string),
					close: name.to_string(),
					span,
				});
			}
		}
	}

	None
}
