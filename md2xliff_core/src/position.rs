use std::ops::Range;

use markdown::mdast::Node;

/// Byte range of a node in the original document, if the tokenizer recorded
/// one.
pub fn node_span(node: &Node) -> Option<Range<usize>> {
	node.position()
		.map(|position| position.start.offset..position.end.offset)
}

/// Byte range covering all of `children`, from the start of the first child to
/// the end of the last.
pub fn children_span(children: &[Node]) -> Option<Range<usize>> {
	let start = children.iter().find_map(node_span)?.start;
	let end = children.iter().rev().find_map(node_span)?.end;
	(start < end).then_some(start..end)
}

/// Pre-computed table of line-start byte offsets for offset-to-line
/// conversion. Built once per document (O(n)); each lookup is a binary search.
pub struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	/// Convert a byte offset to a 1-indexed `(line, column)` pair.
	pub fn line_column(&self, offset: usize) -> (usize, usize) {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};

		(line_idx + 1, offset - self.line_starts[line_idx] + 1)
	}

	/// 1-indexed line number of a byte offset.
	pub fn line(&self, offset: usize) -> usize {
		self.line_column(offset).0
	}
}

/// Shrink `range` within `content` so it excludes leading and trailing
/// whitespace. Returns an empty range at the original start when the slice is
/// blank.
pub fn trim_range(content: &str, range: Range<usize>) -> Range<usize> {
	let slice = &content[range.clone()];
	let leading = slice.len() - slice.trim_start().len();
	let trimmed = slice.trim();
	if trimmed.is_empty() {
		return range.start..range.start;
	}

	let start = range.start + leading;
	start..start + trimmed.len()
}
