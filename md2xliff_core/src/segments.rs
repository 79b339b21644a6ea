use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::position::trim_range;
use crate::xliff::escape_text;
use crate::xliff::is_xml_char;

/// Document text that the reconstruction scan could mistake for a
/// placeholder, including a trailing partial `%%%`.
static SKELETON_TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"%%%\d+%{0,3}").expect("valid skeleton token pattern"));

/// One translatable segment of the exchange document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransUnit {
	/// 1-based identifier, also used in the skeleton placeholder.
	pub id: u32,
	/// Optional resource name, used for the key of a front matter entry.
	pub resname: Option<String>,
	/// Markup annotated XML content of `<source>`.
	pub source: String,
	/// XML content of `<target>`, empty after extraction.
	pub target: String,
}

/// The token written into the skeleton in place of unit `id`.
pub fn placeholder(id: u32) -> String {
	format!("%%%{id}%%%")
}

/// Collects units for one document and remembers which byte range each one
/// replaces.
///
/// Ranges are recorded against the original document and spliced into the
/// skeleton only when [`SegmentAccumulator::finish`] runs, so repeated text
/// never confuses which occurrence a unit belongs to.
#[derive(Debug)]
pub struct SegmentAccumulator<'a> {
	document: &'a str,
	units: Vec<TransUnit>,
	/// Replaced ranges keyed by start offset, mapped to `(end, id)`.
	replacements: BTreeMap<usize, (usize, u32)>,
}

impl<'a> SegmentAccumulator<'a> {
	pub fn new(document: &'a str) -> Self {
		Self {
			document,
			units: vec![],
			replacements: BTreeMap::new(),
		}
	}

	/// Create a unit for `span`. The source is `xml` when supplied, otherwise
	/// the escaped text of the span.
	///
	/// Returns `None` and consumes no identifier when the span is blank, does
	/// not fall on character boundaries or overlaps a span that was already
	/// taken. A span holding characters XML cannot carry is split around
	/// them into plain text units, and the id of the first one is returned.
	pub fn add_unit(&mut self, span: Range<usize>, xml: Option<String>) -> Option<u32> {
		self.add_named_unit(span, xml, None)
	}

	pub fn add_named_unit(
		&mut self,
		span: Range<usize>,
		xml: Option<String>,
		resname: Option<String>,
	) -> Option<u32> {
		let Some(text) = self.document.get(span.clone()) else {
			tracing::warn!(?span, "segment is outside the document or splits a character");
			return None;
		};

		if text.trim().is_empty() {
			return None;
		}

		if self.overlaps(&span) {
			tracing::warn!(?span, text, "segment overlaps an earlier segment, leaving it in place");
			return None;
		}

		if text.contains(|ch: char| !is_xml_char(ch)) {
			return self.add_split_units(span, resname);
		}

		let id = self.units.len() as u32 + 1;
		self.replacements.insert(span.start, (span.end, id));
		self.units.push(TransUnit {
			id,
			resname,
			source: xml.unwrap_or_else(|| escape_text(text)),
			target: String::new(),
		});

		Some(id)
	}

	fn add_split_units(&mut self, span: Range<usize>, resname: Option<String>) -> Option<u32> {
		tracing::debug!(?span, "splitting segment around characters XML cannot carry");
		let document = self.document;
		let mut first = None;
		let mut start = span.start;

		for (offset, ch) in document[span.clone()]
			.char_indices()
			.filter(|(_, ch)| !is_xml_char(*ch))
		{
			let piece = trim_range(document, start..span.start + offset);
			first = first.or(self.add_named_unit(piece, None, resname.clone()));
			start = span.start + offset + ch.len_utf8();
		}

		let rest = trim_range(document, start..span.end);
		first.or(self.add_named_unit(rest, None, resname))
	}

	fn overlaps(&self, span: &Range<usize>) -> bool {
		let before = self
			.replacements
			.range(..=span.start)
			.next_back()
			.is_some_and(|(_, (end, _))| *end > span.start);
		let after = self
			.replacements
			.range(span.start..span.end)
			.next()
			.is_some();

		before || after
	}

	/// Splice every placeholder into the document and return the skeleton
	/// together with the units in identifier order.
	pub fn finish(mut self) -> (String, Vec<TransUnit>) {
		self.protect_skeleton_tokens();

		let mut skeleton = String::with_capacity(self.document.len());
		let mut cursor = 0;

		for (start, (end, id)) in &self.replacements {
			skeleton.push_str(&self.document[cursor..*start]);
			skeleton.push_str(&placeholder(*id));
			cursor = *end;
		}

		skeleton.push_str(&self.document[cursor..]);

		(skeleton, self.units)
	}

	/// Turn document text left in the skeleton that looks like a placeholder
	/// into units of its own, so reconstruction writes it back verbatim.
	fn protect_skeleton_tokens(&mut self) {
		let document = self.document;
		let mut gaps = vec![];
		let mut cursor = 0;
		for (start, (end, _)) in &self.replacements {
			gaps.push(cursor..*start);
			cursor = *end;
		}
		gaps.push(cursor..document.len());

		let tokens: Vec<Range<usize>> = gaps
			.into_iter()
			.flat_map(|gap| {
				let offset = gap.start;
				SKELETON_TOKEN
					.find_iter(&document[gap])
					.map(move |found| offset + found.start()..offset + found.end())
			})
			.collect();

		for token in tokens {
			tracing::debug!(?token, "protecting placeholder-like text left in the skeleton");
			self.add_unit(token, None);
		}
	}
}
