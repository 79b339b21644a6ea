use std::ops::Range;

use serde_yaml_ng::Mapping;
use serde_yaml_ng::Value;

use crate::Md2XliffError;
use crate::Md2XliffResult;

/// A translatable front matter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatterEntry {
	pub key: String,
	/// Byte range of the value in the document. Quotes are excluded.
	pub value: Range<usize>,
}

/// Locate the translatable values of the YAML front matter block that spans
/// `block` in `document`.
///
/// The block must be a YAML mapping. Only top-level keys whose value is a
/// single-line string are returned; nested mappings, sequences, block
/// scalars, numbers and booleans stay in the skeleton untouched.
pub fn front_matter_entries(
	document: &str,
	block: Range<usize>,
) -> Md2XliffResult<Vec<FrontMatterEntry>> {
	let raw = &document[block.clone()];
	let Some(first_newline) = raw.find('\n') else {
		return Ok(vec![]);
	};
	let content_start = block.start + first_newline + 1;
	let content_end = raw
		.rfind('\n')
		.map_or(block.end, |idx| block.start + idx)
		.max(content_start);
	let content = &document[content_start..content_end];

	if content.trim().is_empty() {
		return Ok(vec![]);
	}

	let mapping: Mapping =
		serde_yaml_ng::from_str(content).map_err(|e| Md2XliffError::FrontMatter(e.to_string()))?;

	let mut entries = vec![];
	let mut line_start = content_start;
	for line in content.split_inclusive('\n') {
		let offset = line_start;
		line_start += line.len();

		let Some((key, value)) = split_entry(line) else {
			continue;
		};
		let Some(Value::String(expected)) = mapping.get(key) else {
			continue;
		};

		let value = offset + value.start..offset + value.end;
		if unquote(&document[value.clone()]) != *expected {
			tracing::debug!(key, "front matter value spans multiple lines or uses escapes, skipping");
			continue;
		}

		let value = strip_quotes(&document[value.clone()], value);
		if value.is_empty() {
			continue;
		}

		entries.push(FrontMatterEntry {
			key: key.to_string(),
			value,
		});
	}

	Ok(entries)
}

/// Split a top-level `key: value` line. The returned range is relative to the
/// line and still includes any quotes.
fn split_entry(line: &str) -> Option<(&str, Range<usize>)> {
	let first = line.chars().next()?;
	if first.is_whitespace() || matches!(first, '#' | '-' | '?' | '"' | '\'') {
		return None;
	}

	let colon = line.find(": ")?;
	let key = line[..colon].trim_end();
	let after = colon + 2;
	let rest = &line[after..];
	let leading = rest.len() - rest.trim_start().len();
	let start = after + leading;
	let value = &line[start..];

	let end = match value.chars().next()? {
		'|' | '>' | '[' | '{' | '&' | '*' | '!' | '#' => return None,
		quote @ ('"' | '\'') => start + value[1..].rfind(quote)? + 2,
		_ => start + value.find(" #").unwrap_or(value.len()).min(value.trim_end().len()),
	};

	(start < end).then_some((key, start..end))
}

/// The string value YAML would read for a single-line scalar.
fn unquote(raw: &str) -> String {
	if let Some(inner) = raw.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
		return inner.replace("''", "'");
	}

	if let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
		return inner.to_string();
	}

	raw.to_string()
}

fn strip_quotes(raw: &str, span: Range<usize>) -> Range<usize> {
	let quoted = raw.len() >= 2
		&& ((raw.starts_with('"') && raw.ends_with('"'))
			|| (raw.starts_with('\'') && raw.ends_with('\'')));

	if quoted {
		span.start + 1..span.end - 1
	} else {
		span
	}
}
