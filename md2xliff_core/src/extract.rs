use std::collections::HashSet;
use std::ops::Range;

use markdown::ParseOptions;
use markdown::mdast::Code;
use markdown::mdast::Node;
use markdown::to_mdast;
use serde::Deserialize;
use serde::Serialize;

use crate::Md2XliffError;
use crate::Md2XliffResult;
use crate::comments::CodeLanguage;
use crate::comments::find_comments;
use crate::front_matter::front_matter_entries;
use crate::html::HtmlPiece;
use crate::html::HtmlTag;
use crate::html::parse_tag;
use crate::html::scan_html;
use crate::inline::InlineWriter;
use crate::position::LineTable;
use crate::position::children_span;
use crate::position::node_span;
use crate::position::trim_range;
use crate::segments::SegmentAccumulator;
use crate::segments::TransUnit;
use crate::template::DirectiveMode;
use crate::template::find_directive;
use crate::template::find_directive_mismatch;
use crate::xliff::ExchangeMetadata;
use crate::xliff::escape_text;
use crate::xliff::write_exchange_document;

pub const DEFAULT_SOURCE_LANGUAGE: &str = "ru-RU";
pub const DEFAULT_TARGET_LANGUAGE: &str = "en-US";
pub const DEFAULT_FILE_NAME: &str = "source.md";
pub const FRONT_MATTER_CTYPE: &str = "x-yaml-front-matter";

/// Tokenizer switches passed through to the markdown parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownOptions {
	/// Enable GitHub flavored constructs: tables, strikethrough, autolink
	/// literals and footnotes.
	pub gfm: bool,
	/// Recognise a leading YAML front matter block.
	pub front_matter: bool,
}

impl Default for MarkdownOptions {
	fn default() -> Self {
		Self {
			gfm: true,
			front_matter: true,
		}
	}
}

impl MarkdownOptions {
	pub fn parse_options(self) -> ParseOptions {
		let mut options = if self.gfm {
			ParseOptions::gfm()
		} else {
			ParseOptions::default()
		};
		options.constructs.frontmatter = self.front_matter;
		options
	}
}

/// Parameters for a single extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
	/// Name of the document, recorded as `original` in the exchange document.
	pub file_name: String,
	/// Name of the skeleton file. Derived from `file_name` when `None`.
	pub skeleton_file_name: Option<String>,
	pub source_language: String,
	pub target_language: String,
	pub directive_mode: DirectiveMode,
	/// Log comment mining failures at debug level instead of warn.
	pub quiet_parse_errors: bool,
	pub markdown: MarkdownOptions,
}

impl Default for ExtractOptions {
	fn default() -> Self {
		Self {
			file_name: DEFAULT_FILE_NAME.to_string(),
			skeleton_file_name: None,
			source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
			target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
			directive_mode: DirectiveMode::default(),
			quiet_parse_errors: false,
			markdown: MarkdownOptions::default(),
		}
	}
}

impl ExtractOptions {
	pub fn skeleton_file_name(&self) -> String {
		self.skeleton_file_name
			.clone()
			.unwrap_or_else(|| default_skeleton_name(&self.file_name))
	}

	pub fn metadata(&self) -> ExchangeMetadata {
		ExchangeMetadata {
			original: self.file_name.clone(),
			skeleton: self.skeleton_file_name(),
			source_language: self.source_language.clone(),
			target_language: self.target_language.clone(),
		}
	}
}

/// The part of a file name before its first `.`, or the whole name when
/// that part is empty.
pub fn document_stem(name: &str) -> &str {
	match name.split('.').next() {
		Some(stem) if !stem.is_empty() => stem,
		_ => name,
	}
}

/// `docs/guide.en.md` becomes `docs/guide.skl.md`.
pub fn default_skeleton_name(file_name: &str) -> String {
	let (directory, name) = file_name
		.rsplit_once('/')
		.map_or(("", file_name), |(directory, name)| (directory, name));
	let stem = document_stem(name);

	if directory.is_empty() {
		format!("{stem}.skl.md")
	} else {
		format!("{directory}/{stem}.skl.md")
	}
}

/// The result of extracting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
	/// The document with every translatable span replaced by `%%%id%%%`.
	pub skeleton: String,
	/// The XLIFF 1.2 exchange document.
	pub xliff: String,
	/// The units written to `xliff`, in identifier order.
	pub units: Vec<TransUnit>,
}

/// Split `markdown` into a skeleton and an exchange document.
pub fn extract(markdown: &str, options: &ExtractOptions) -> Md2XliffResult<Extraction> {
	let root = to_mdast(markdown, &options.markdown.parse_options())
		.map_err(|e| Md2XliffError::Markdown(e.to_string()))?;

	let mut walker = BlockWalker::new(markdown, options);
	walker.block(&root)?;
	walker.drain_definitions();

	let (skeleton, units) = walker.accumulator.finish();
	let xliff = write_exchange_document(&options.metadata(), &units);
	tracing::debug!(units = units.len(), file = %options.file_name, "extracted document");

	Ok(Extraction {
		skeleton,
		xliff,
		units,
	})
}

/// A `[key]: url "title"` definition waiting to be emitted.
#[derive(Debug)]
struct LinkDefinition {
	url: Range<usize>,
	title: Option<Range<usize>>,
}

struct BlockWalker<'a> {
	document: &'a str,
	options: &'a ExtractOptions,
	accumulator: SegmentAccumulator<'a>,
	lines: LineTable,
	definitions: Vec<LinkDefinition>,
	identifiers: HashSet<String>,
}

impl<'a> BlockWalker<'a> {
	fn new(document: &'a str, options: &'a ExtractOptions) -> Self {
		Self {
			document,
			options,
			accumulator: SegmentAccumulator::new(document),
			lines: LineTable::new(document),
			definitions: vec![],
			identifiers: HashSet::new(),
		}
	}

	fn block(&mut self, node: &Node) -> Md2XliffResult<()> {
		let Some(span) = node_span(node) else {
			return Ok(());
		};

		match node {
			Node::Root(_)
			| Node::Blockquote(_)
			| Node::List(_)
			| Node::ListItem(_)
			| Node::FootnoteDefinition(_) => {
				for child in node.children().into_iter().flatten() {
					self.block(child)?;
				}
			}
			Node::Yaml(_) => self.front_matter(span)?,
			Node::Heading(heading) => self.text_block(&heading.children)?,
			Node::Paragraph(paragraph) => self.text_block(&paragraph.children)?,
			Node::Html(_) => self.html_block(span)?,
			Node::Table(table) => {
				for row in &table.children {
					for cell in row.children().into_iter().flatten() {
						if let Some(cell_span) = cell.children().and_then(|c| children_span(c)) {
							self.accumulator.add_unit(cell_span, None);
						}
					}
				}
			}
			Node::Code(code) => self.code(code, span),
			Node::Definition(definition) => self.definition(&definition.identifier, span),
			_ => tracing::debug!(?span, "skipping block without translatable text"),
		}

		Ok(())
	}

	fn front_matter(&mut self, span: Range<usize>) -> Md2XliffResult<()> {
		for entry in front_matter_entries(self.document, span)? {
			let xml = format!(
				"<ph id=\"1\" ctype=\"{FRONT_MATTER_CTYPE}\"></ph>{}",
				escape_text(&self.document[entry.value.clone()])
			);
			self.accumulator
				.add_named_unit(entry.value, Some(xml), Some(entry.key));
		}

		Ok(())
	}

	/// Fail in strict mode when a closing directive does not match.
	fn check_directives(&self, span: &Range<usize>) -> Md2XliffResult<()> {
		if self.options.directive_mode != DirectiveMode::Strict {
			return Ok(());
		}

		let Some(mismatch) = find_directive_mismatch(&self.document[span.clone()]) else {
			return Ok(());
		};

		let start = span.start + mismatch.span.start;
		Err(Md2XliffError::AmbiguousDirective {
			close: mismatch.close,
			line: self.lines.line(start),
			snippet: self.document[start..span.start + mismatch.span.end].to_string(),
		})
	}

	/// Emit `span` as one opaque text token when it holds a directive.
	fn directive_unit(&mut self, span: &Range<usize>) -> bool {
		if find_directive(&self.document[span.clone()]).is_none() {
			return false;
		}

		let mut writer = InlineWriter::new(self.document);
		writer.text(span.clone());
		self.accumulator
			.add_unit(span.clone(), Some(writer.finish()));
		true
	}

	fn text_block(&mut self, children: &[Node]) -> Md2XliffResult<()> {
		let Some(span) = children_span(children) else {
			return Ok(());
		};

		self.check_directives(&span)?;
		if self.directive_unit(&span) {
			return Ok(());
		}

		let mut run: Vec<&Node> = vec![];
		for child in children {
			if let Node::Html(_) = child {
				if let Some((tag_span, tag)) = self.media_tag(child) {
					self.inline_run(&run);
					run.clear();
					self.media(tag_span.start, &tag);
					continue;
				}
			}

			run.push(child);
		}

		self.inline_run(&run);
		Ok(())
	}

	fn media_tag(&self, node: &Node) -> Option<(Range<usize>, HtmlTag)> {
		let span = node_span(node)?;
		let tag = parse_tag(&self.document[span.clone()])?;
		tag.is_media().then_some((span, tag))
	}

	fn inline_run(&mut self, run: &[&Node]) {
		let start = run.iter().find_map(|node| node_span(node));
		let end = run.iter().rev().find_map(|node| node_span(node));
		let (Some(start), Some(end)) = (start, end) else {
			return;
		};

		let span = trim_range(self.document, start.start..end.end);
		if span.is_empty() {
			return;
		}

		let mut writer = InlineWriter::new(self.document);
		writer.nodes(run.iter().copied(), span.clone());
		self.accumulator.add_unit(span, Some(writer.finish()));
	}

	/// Turn the `src` and `alt`/`title` of a media tag starting at `offset`
	/// into their own units.
	fn media(&mut self, offset: usize, tag: &HtmlTag) {
		for attribute in tag.media_attributes() {
			if let Some(value) = &attribute.value_span {
				self.accumulator
					.add_unit(offset + value.start..offset + value.end, None);
			}
		}
	}

	fn html_block(&mut self, span: Range<usize>) -> Md2XliffResult<()> {
		self.check_directives(&span)?;
		if self.directive_unit(&span) {
			return Ok(());
		}

		let mut run: Vec<HtmlPiece> = vec![];
		for piece in scan_html(&self.document[span.clone()]) {
			if let HtmlPiece::Tag(range) = &piece {
				let tag_span = span.start + range.start..span.start + range.end;
				if let Some(tag) = parse_tag(&self.document[tag_span.clone()]).filter(HtmlTag::is_media) {
					self.html_run(span.start, &run);
					run.clear();
					self.media(tag_span.start, &tag);
					continue;
				}
			}

			run.push(piece);
		}

		self.html_run(span.start, &run);
		Ok(())
	}

	/// Emit a run of HTML pieces as one unit if it has any text.
	fn html_run(&mut self, offset: usize, run: &[HtmlPiece]) {
		let has_text = run.iter().any(|piece| {
			matches!(piece, HtmlPiece::Text(range)
				if !self.document[offset + range.start..offset + range.end].trim().is_empty())
		});
		let (Some(first), Some(last)) = (run.first(), run.last()) else {
			return;
		};
		if !has_text {
			return;
		}

		let span = trim_range(
			self.document,
			offset + first.span().start..offset + last.span().end,
		);
		let mut writer = InlineWriter::new(self.document);
		writer.html(span.clone());
		self.accumulator.add_unit(span, Some(writer.finish()));
	}

	fn code(&mut self, code: &Code, span: Range<usize>) {
		let Some(content) = code_content(self.document, span) else {
			return;
		};

		let Some(language) = code.lang.as_deref().and_then(CodeLanguage::from_tag) else {
			self.accumulator.add_unit(content, None);
			return;
		};

		match find_comments(&self.document[content.clone()], language) {
			Ok(comments) => {
				for comment in comments {
					self.accumulator
						.add_unit(content.start + comment.start..content.start + comment.end, None);
				}
			}
			Err(error) => {
				if self.options.quiet_parse_errors {
					tracing::debug!(%error, "using the whole code block as one segment");
				} else {
					tracing::warn!(%error, "using the whole code block as one segment");
				}
				self.accumulator.add_unit(content, None);
			}
		}
	}

	fn definition(&mut self, identifier: &str, span: Range<usize>) {
		if !self.identifiers.insert(identifier.to_string()) {
			tracing::debug!(identifier, "ignoring duplicate link definition");
			return;
		}

		match parse_definition(self.document, span) {
			Some(definition) => self.definitions.push(definition),
			None => tracing::debug!(identifier, "link definition without a destination"),
		}
	}

	/// Emit the registered link definitions: the destination, then the title.
	fn drain_definitions(&mut self) {
		for definition in std::mem::take(&mut self.definitions) {
			self.accumulator.add_unit(definition.url, None);
			if let Some(title) = definition.title {
				self.accumulator.add_unit(title, None);
			}
		}
	}
}

/// The content of a code block without its fences.
fn code_content(document: &str, span: Range<usize>) -> Option<Range<usize>> {
	let raw = &document[span.clone()];
	let opening = raw.trim_start();
	let indented = || Some(trim_range(document, span.clone())).filter(|content| !content.is_empty());
	let Some(fence) = opening.chars().next().filter(|ch| matches!(ch, '`' | '~')) else {
		return indented();
	};
	let fence_len = opening.len() - opening.trim_start_matches(fence).len();
	if fence_len < 3 {
		return indented();
	}

	let first_newline = raw.find('\n')?;
	let start = span.start + first_newline + 1;
	let last_newline = raw.rfind('\n').unwrap_or(first_newline);
	let closing = raw[last_newline + 1..].trim();
	let closed = closing.len() >= fence_len && closing.chars().all(|ch| ch == fence);

	let end = if closed {
		span.start + last_newline
	} else {
		span.end
	};

	(start < end && !document[start..end].trim().is_empty()).then_some(start..end)
}

fn parse_definition(document: &str, span: Range<usize>) -> Option<LinkDefinition> {
	let raw = &document[span.clone()];
	let label_end = raw.find("]:")?;
	let mut cursor = label_end + 2;
	cursor += raw[cursor..].len() - raw[cursor..].trim_start().len();

	let rest = &raw[cursor..];
	let url = if let Some(inner) = rest.strip_prefix('<') {
		let end = inner.find('>')?;
		cursor + 1..cursor + 1 + end
	} else {
		let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
		cursor..cursor + end
	};
	cursor = url.end + usize::from(rest.starts_with('<'));

	// A title on a continuation line follows the block quote markers.
	let after_url = &raw[cursor..];
	let title_open = cursor + after_url.len()
		- after_url
			.trim_start_matches(|ch: char| ch.is_whitespace() || ch == '>')
			.len();
	let title = raw[title_open..].chars().next().and_then(|open| {
		let close = match open {
			'"' => '"',
			'\'' => '\'',
			'(' => ')',
			_ => return None,
		};
		let title_start = title_open + 1;
		let title_end = title_open + raw[title_open..].rfind(close)?;
		(title_start < title_end).then_some(title_start..title_end)
	});

	Some(LinkDefinition {
		url: span.start + url.start..span.start + url.end,
		title: title.map(|title| span.start + title.start..span.start + title.end),
	})
}
