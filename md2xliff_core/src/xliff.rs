use std::fmt::Write;

use crate::segments::TransUnit;

pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";

/// Metadata written to the `<file>` envelope of an exchange document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeMetadata {
	/// Name of the markdown document the units were extracted from.
	pub original: String,
	/// Name of the skeleton file referenced from the header.
	pub skeleton: String,
	pub source_language: String,
	pub target_language: String,
}

/// Render units as an XLIFF 1.2 document. Unit sources are inserted as-is,
/// they must already be valid XML fragments.
pub fn write_exchange_document(metadata: &ExchangeMetadata, units: &[TransUnit]) -> String {
	let mut xliff = String::new();
	let source_language = escape_attribute(&metadata.source_language);
	let target_language = escape_attribute(&metadata.target_language);

	xliff.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
	let _ = writeln!(xliff, "<xliff xmlns=\"{XLIFF_NAMESPACE}\" version=\"1.2\">");
	let _ = writeln!(
		xliff,
		"  <file original=\"{}\" source-language=\"{source_language}\" \
		 target-language=\"{target_language}\" datatype=\"markdown\">",
		escape_attribute(&metadata.original),
	);
	xliff.push_str("    <header>\n      <skl>\n");
	let _ = writeln!(
		xliff,
		"        <external-file href=\"{}\"/>",
		escape_attribute(&metadata.skeleton)
	);
	xliff.push_str("      </skl>\n    </header>\n    <body>\n");

	for unit in units {
		let resname = unit
			.resname
			.as_deref()
			.map(|name| format!(" resname=\"{}\"", escape_attribute(name)))
			.unwrap_or_default();

		let _ = writeln!(
			xliff,
			"      <trans-unit id=\"{}\"{resname} xml:space=\"preserve\"><source \
			 xml:lang=\"{source_language}\">{}</source><target \
			 xml:lang=\"{target_language}\">{}</target></trans-unit>",
			unit.id, unit.source, unit.target,
		);
	}

	xliff.push_str("    </body>\n  </file>\n</xliff>\n");
	xliff
}

/// Escape text content: `&`, `<` and `>`. Carriage returns become a
/// character reference so XML line ending normalization keeps them.
pub fn escape_text(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'\r' => escaped.push_str("&#13;"),
			_ => escaped.push(ch),
		}
	}
	escaped
}

/// Escape an attribute value, quotes included. Characters XML cannot carry
/// become U+FFFD.
pub fn escape_attribute(text: &str) -> String {
	let text: String = text
		.chars()
		.map(|ch| if is_xml_char(ch) { ch } else { '\u{FFFD}' })
		.collect();

	escape_text(&text)
		.replace('"', "&quot;")
		.replace('\'', "&apos;")
}

/// Whether `ch` may appear in an XML 1.0 document, either literally or as a
/// character reference.
pub fn is_xml_char(ch: char) -> bool {
	matches!(
		ch,
		'\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
	)
}

/// Escape template syntax with the minimum XML requires so expressions such
/// as `{{> partial }}` stay readable. `>` is only escaped as part of `]]>`.
pub fn escape_template(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace("]]>", "]]&gt;")
		.replace('\r', "&#13;")
}
