//! Serialization of inline markdown into the markup annotated XML of a
//! `<source>` element.
//!
//! The writer works on byte ranges of the original document rather than on
//! the decoded node values. Every byte of a serialized range ends up in the
//! XML, either as translatable text or inside a `<ph>`, `<bpt>` or `<ept>`
//! element, so the text content of the fragment is exactly the slice it came
//! from.
//!
//! Inline ids start at 1 for every unit and are handed out in pre-order: a
//! container takes its id before its children, and its closing `<ept>`
//! reuses that id after they are written.

use std::fmt::Write;
use std::ops::Range;

use markdown::mdast::Node;

use crate::html::HtmlPiece;
use crate::html::scan_html;
use crate::position::children_span;
use crate::position::node_span;
use crate::template::TemplateSyntax;
use crate::template::classify;
use crate::template::find_directive;
use crate::xliff::escape_attribute;
use crate::xliff::escape_template;
use crate::xliff::escape_text;

pub const CTYPE_BOLD: &str = "bold";
pub const CTYPE_ITALIC: &str = "italic";
pub const CTYPE_LINK: &str = "link";
pub const CTYPE_LINE_BREAK: &str = "lb";

/// Builds the XML for a single unit.
#[derive(Debug)]
pub struct InlineWriter<'a> {
	source: &'a str,
	next_id: u32,
	xml: String,
}

impl<'a> InlineWriter<'a> {
	pub fn new(source: &'a str) -> Self {
		Self {
			source,
			next_id: 1,
			xml: String::new(),
		}
	}

	pub fn finish(self) -> String {
		self.xml
	}

	fn take_id(&mut self) -> u32 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}

	/// A run of plain text. Template syntax turns the run into a protected
	/// placeholder, everything else is escaped and left translatable.
	pub fn text(&mut self, span: Range<usize>) {
		let source = self.source;
		let text = &source[span];
		if text.is_empty() {
			return;
		}

		let id = self.take_id();

		let Some(syntax) = classify(text) else {
			self.xml.push_str(&escape_text(text));
			return;
		};

		// Markup around a directive pair stays outside the placeholder.
		let directive = find_directive(text).filter(|_| syntax == TemplateSyntax::FreeMarker);
		match directive {
			Some(directive) => {
				self.xml.push_str(&escape_text(&text[directive.prefix]));
				self.write_placeholder(id, &text[directive.directive], Some(syntax.ctype()));
				self.xml.push_str(&escape_text(&text[directive.suffix]));
			}
			None => self.write_placeholder(id, text, Some(syntax.ctype())),
		}
	}

	/// Protect `span` as a single placeholder.
	pub fn protected(&mut self, span: Range<usize>, ctype: Option<&str>) {
		if span.is_empty() {
			return;
		}

		let source = self.source;
		let id = self.take_id();
		self.write_placeholder(id, &source[span], ctype);
	}

	/// Serialize a raw HTML run: tags and comments are protected, the text
	/// between them stays translatable.
	pub fn html(&mut self, span: Range<usize>) {
		let offset = span.start;
		let source = self.source;
		for piece in scan_html(&source[span]) {
			match piece {
				HtmlPiece::Comment(range) | HtmlPiece::Tag(range) => {
					self.protected(offset + range.start..offset + range.end, None);
				}
				HtmlPiece::Text(range) => self.text(offset + range.start..offset + range.end),
			}
		}
	}

	/// Serialize `children` within `span`. Bytes between children, such as
	/// escapes the tokenizer folded away, are written as text and text nodes
	/// are clipped to `span`.
	pub fn nodes<'n>(&mut self, children: impl IntoIterator<Item = &'n Node>, span: Range<usize>) {
		let mut cursor = span.start;

		for child in children {
			let Some(child_span) = node_span(child) else {
				continue;
			};

			// Text may be trimmed by the caller, other nodes are kept whole.
			let clipped = child_span.start.max(cursor)..child_span.end.min(span.end);
			if clipped.is_empty() {
				continue;
			}

			if clipped.start > cursor {
				self.text(cursor..clipped.start);
			}

			let end = if let Node::Text(_) = child {
				self.text(clipped.clone());
				clipped.end
			} else {
				self.node(child);
				child_span.end
			};
			cursor = cursor.max(end);
		}

		if cursor < span.end {
			self.text(cursor..span.end);
		}
	}

	/// Serialize a single inline node.
	pub fn node(&mut self, node: &Node) {
		let Some(span) = node_span(node) else {
			return;
		};

		match node {
			Node::Text(_) => self.text(span),
			Node::Strong(strong) => self.container(span, &strong.children, Some(CTYPE_BOLD)),
			Node::Emphasis(emphasis) => {
				self.container(span, &emphasis.children, Some(CTYPE_ITALIC));
			}
			Node::Delete(delete) => self.container(span, &delete.children, None),
			Node::Link(link) => self.link(span, &link.children),
			Node::LinkReference(reference) => {
				self.container(span, &reference.children, Some(CTYPE_LINK));
			}
			Node::Image(_) => self.image(span, true),
			Node::ImageReference(_) => self.image(span, false),
			Node::InlineCode(_) => self.inline_code(span),
			Node::Break(_) => self.protected(span, Some(CTYPE_LINE_BREAK)),
			_ => self.protected(span, None),
		}
	}

	/// Markup wrapped around children: the bytes before the first child open
	/// a `<bpt>`, the bytes after the last child close it with an `<ept>`.
	fn container(&mut self, span: Range<usize>, children: &[Node], ctype: Option<&str>) {
		let Some(inner) = children_span(children) else {
			return self.protected(span, ctype);
		};

		let open = span.start..inner.start;
		let close = inner.end..span.end;

		if open.is_empty() && close.is_empty() {
			return self.nodes(children, inner);
		}

		let id = self.take_id();
		self.write_begin(id, open, ctype);
		self.nodes(children, inner);
		self.write_end(id, close);
	}

	fn link(&mut self, span: Range<usize>, children: &[Node]) {
		if self.source[span.clone()].starts_with('<') {
			return self.container(span, children, None);
		}

		let Some(inner) = children_span(children) else {
			return self.protected(span, Some(CTYPE_LINK));
		};

		// `[label](destination "title")`: one pair around the label and one
		// around the destination.
		let source = self.source;
		let tail = &source[inner.end..span.end];
		if !(tail.starts_with("](") && tail.ends_with(')')) {
			return self.container(span, children, Some(CTYPE_LINK));
		}

		let id = self.take_id();
		self.write_begin(id, span.start..inner.start, Some(CTYPE_LINK));
		self.nodes(children, inner.clone());
		self.write_end(id, inner.end..inner.end + 1);
		self.destination(inner.end + 1..span.end);
	}

	/// `(destination "title")` as a pair whose content stays editable.
	fn destination(&mut self, span: Range<usize>) {
		let id = self.take_id();
		self.write_begin(id, span.start..span.start + 1, None);
		self.xml
			.push_str(&escape_text(&self.source[span.start + 1..span.end - 1]));
		self.write_end(id, span.end - 1..span.end);
	}

	fn image(&mut self, span: Range<usize>, inline: bool) {
		let source = self.source;
		let raw = &source[span.clone()];
		let Some(alt_end) = raw.strip_prefix("![").and_then(find_label_end) else {
			return self.protected(span, None);
		};

		let alt = span.start + 2..span.start + 2 + alt_end;
		let tail = alt.end..span.end;
		let tail_raw = &source[tail.clone()];
		let id = self.take_id();
		self.write_begin(id, span.start..alt.start, None);
		self.text(alt.clone());

		if inline && tail_raw.starts_with("](") && tail_raw.ends_with(')') {
			self.write_end(id, alt.end..alt.end + 1);
			self.destination(alt.end + 1..span.end);
		} else {
			self.write_end(id, tail);
		}
	}

	fn inline_code(&mut self, span: Range<usize>) {
		let source = self.source;
		let raw = &source[span.clone()];
		let leading = raw.len() - raw.trim_start_matches('`').len();
		let trailing = raw.len() - raw.trim_end_matches('`').len();

		if leading == 0 || leading + trailing >= raw.len() {
			return self.protected(span, None);
		}

		let inner = span.start + leading..span.end - trailing;
		let id = self.take_id();
		self.write_begin(id, span.start..inner.start, None);
		self.text(inner.clone());
		self.write_end(id, inner.end..span.end);
	}

	fn write_placeholder(&mut self, id: u32, raw: &str, ctype: Option<&str>) {
		let content = match ctype {
			Some(ctype) if ctype.starts_with("x-") => escape_template(raw),
			_ => escape_text(raw),
		};

		let _ = write!(self.xml, "<ph id=\"{id}\"{}>{content}</ph>", ctype_attribute(ctype));
	}

	fn write_begin(&mut self, id: u32, span: Range<usize>, ctype: Option<&str>) {
		let _ = write!(
			self.xml,
			"<bpt id=\"{id}\"{}>{}</bpt>",
			ctype_attribute(ctype),
			escape_text(&self.source[span])
		);
	}

	fn write_end(&mut self, id: u32, span: Range<usize>) {
		let _ = write!(
			self.xml,
			"<ept id=\"{id}\">{}</ept>",
			escape_text(&self.source[span])
		);
	}
}

fn ctype_attribute(ctype: Option<&str>) -> String {
	ctype
		.map(|ctype| format!(" ctype=\"{}\"", escape_attribute(ctype)))
		.unwrap_or_default()
}

/// Length of a bracketed label up to (not including) its closing `]`.
/// `label` starts right after the opening bracket.
fn find_label_end(label: &str) -> Option<usize> {
	let mut depth = 0_usize;
	let mut escaped = false;

	for (idx, byte) in label.bytes().enumerate() {
		match byte {
			_ if escaped => escaped = false,
			b'\\' => escaped = true,
			b'[' => depth += 1,
			b']' if depth == 0 => return Some(idx),
			b']' => depth -= 1,
			_ => {}
		}
	}

	None
}
