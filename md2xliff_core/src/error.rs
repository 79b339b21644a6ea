use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Md2XliffError {
	#[error(transparent)]
	#[diagnostic(code(md2xliff::io_error))]
	Io(#[from] std::io::Error),

	#[error("failure to load markdown: {0}")]
	#[diagnostic(code(md2xliff::markdown))]
	Markdown(String),

	#[error("failed to parse front matter: {0}")]
	#[diagnostic(
		code(md2xliff::front_matter),
		help("front matter must be a YAML mapping between two `---` lines")
	)]
	FrontMatter(String),

	#[error("freemarker directive `{close}` does not close an open directive (line {line}): `{snippet}`")]
	#[diagnostic(
		code(md2xliff::ambiguous_directive),
		help(
			"every `</#name>` must close a `<#name ...>` opened earlier in the same block; \
			 extract with lenient directives to protect the span as-is"
		)
	)]
	AmbiguousDirective {
		close: String,
		line: usize,
		snippet: String,
	},

	#[error("failed to extract comments from `{language}` code: {reason}")]
	#[diagnostic(code(md2xliff::code_comments))]
	CodeComments { language: String, reason: String },

	#[error("failed to parse exchange document: {0}")]
	#[diagnostic(
		code(md2xliff::xliff_parse),
		help("the exchange document must be well-formed XLIFF 1.2")
	)]
	XliffParse(String),

	#[error("exchange document root is `<{0}>`, expected `<xliff>`")]
	#[diagnostic(code(md2xliff::not_xliff))]
	NotXliff(String),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(md2xliff::config_parse),
		help("check that md2xliff.toml is valid TOML with [languages], [extract] and/or [reconstruct] sections")
	)]
	ConfigParse(String),
}

pub type Md2XliffResult<T> = Result<T, Md2XliffError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
