use std::ops::Range;

use logos::Logos;

/// Tags whose attributes are extracted as standalone segments instead of
/// being protected inline.
const MEDIA_TAGS: [&str; 2] = ["img", "iframe"];

/// One piece of a raw HTML run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlPiece {
	/// `<!-- ... -->`
	Comment(Range<usize>),
	/// An opening, closing or self-closing tag, a doctype or a processing
	/// instruction.
	Tag(Range<usize>),
	/// Everything between tags and comments.
	Text(Range<usize>),
}

impl HtmlPiece {
	pub fn span(&self) -> Range<usize> {
		match self {
			Self::Comment(span) | Self::Tag(span) | Self::Text(span) => span.clone(),
		}
	}
}

/// Split raw HTML into comments, tags and text. Ranges are relative to
/// `content`. A `<` that does not start a well-formed tag stays part of the
/// surrounding text.
pub fn scan_html(content: &str) -> Vec<HtmlPiece> {
	let bytes = content.as_bytes();
	let mut pieces = Vec::new();
	let mut text_start = 0;
	let mut cursor = 0;

	while cursor < bytes.len() {
		if bytes[cursor] != b'<' {
			cursor += 1;
			continue;
		}

		let rest = &bytes[cursor..];
		let piece = if rest.starts_with(b"<!--") {
			memstr(&rest[4..], b"-->").map(|offset| HtmlPiece::Comment(cursor..cursor + 4 + offset + 3))
		} else if is_tag_start(rest) {
			find_tag_end(bytes, cursor).map(|end| HtmlPiece::Tag(cursor..end))
		} else {
			None
		};

		let Some(piece) = piece else {
			cursor += 1;
			continue;
		};

		if text_start < cursor {
			pieces.push(HtmlPiece::Text(text_start..cursor));
		}

		cursor = piece.span().end;
		text_start = cursor;
		pieces.push(piece);
	}

	if text_start < bytes.len() {
		pieces.push(HtmlPiece::Text(text_start..bytes.len()));
	}

	pieces
}

fn is_tag_start(rest: &[u8]) -> bool {
	match rest.get(1) {
		Some(byte) if byte.is_ascii_alphabetic() || *byte == b'!' || *byte == b'?' => true,
		Some(b'/') => rest.get(2).is_some_and(u8::is_ascii_alphabetic),
		_ => false,
	}
}

/// Offset just past the `>` that closes the tag starting at `start`. Quoted
/// attribute values may contain `>`.
fn find_tag_end(bytes: &[u8], start: usize) -> Option<usize> {
	let mut quote: Option<u8> = None;

	for (idx, byte) in bytes.iter().enumerate().skip(start + 1) {
		match (quote, *byte) {
			(Some(open), current) if open == current => quote = None,
			(Some(_), _) => {}
			(None, b'"' | b'\'') => quote = Some(*byte),
			(None, b'>') => return Some(idx + 1),
			(None, b'<') => return None,
			_ => {}
		}
	}

	None
}

fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum TagToken {
	#[token("</")]
	CloseOpen,
	#[token("<")]
	Open,
	#[token("/>")]
	SelfClose,
	#[token(">")]
	End,
	#[token("=")]
	Equals,
	#[regex(r#""[^"]*""#)]
	DoubleQuoted,
	#[regex(r"'[^']*'")]
	SingleQuoted,
	#[regex(r#"[^\s"'=<>`/]+"#)]
	Word,
	#[token("/")]
	Slash,
}

/// A single attribute of a parsed tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	/// Lowercased attribute name.
	pub name: String,
	/// Raw attribute value, without quotes.
	pub value: String,
	/// Byte range of the value inside the raw tag. `None` for attributes
	/// written without a value.
	pub value_span: Option<Range<usize>>,
}

/// A parsed HTML tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTag {
	/// Lowercased element name.
	pub name: String,
	pub closing: bool,
	pub attributes: Vec<Attribute>,
}

impl HtmlTag {
	pub fn attribute(&self, name: &str) -> Option<&Attribute> {
		self.attributes.iter().find(|attribute| attribute.name == name)
	}

	/// Whether this is an opening `<img>` or `<iframe>`.
	pub fn is_media(&self) -> bool {
		!self.closing && MEDIA_TAGS.contains(&self.name.as_str())
	}

	/// The attributes extracted from a media tag, in emission order: `src`,
	/// then `alt` for images or `title` for iframes.
	pub fn media_attributes(&self) -> Vec<&Attribute> {
		let label = if self.name == "iframe" { "title" } else { "alt" };
		["src", label]
			.iter()
			.filter_map(|name| self.attribute(name))
			.collect()
	}
}

/// Parse a single raw tag such as `<img src="a.png" alt='A'>`. Returns `None`
/// when `raw` is not exactly one well-formed tag.
pub fn parse_tag(raw: &str) -> Option<HtmlTag> {
	let tokens: Vec<_> = TagToken::lexer(raw).spanned().collect();
	let mut cursor = 0;

	let closing = match tokens.first()? {
		(Ok(TagToken::Open), _) => false,
		(Ok(TagToken::CloseOpen), _) => true,
		_ => return None,
	};
	cursor += 1;

	let (Ok(TagToken::Word), name_span) = tokens.get(cursor)? else {
		return None;
	};
	if name_span.start != tokens[0].1.end
		|| !raw[name_span.clone()].starts_with(|ch: char| ch.is_ascii_alphabetic())
	{
		return None;
	}
	let name = raw[name_span.clone()].to_ascii_lowercase();
	cursor += 1;

	let mut attributes = Vec::new();
	loop {
		match tokens.get(cursor)? {
			(Ok(TagToken::End | TagToken::SelfClose), span) => {
				return (span.end == raw.len()).then_some(HtmlTag {
					name,
					closing,
					attributes,
				});
			}
			(Ok(TagToken::Slash), _) => cursor += 1,
			(Ok(TagToken::Word), span) => {
				let attribute_name = raw[span.clone()].to_ascii_lowercase();
				cursor += 1;

				if !matches!(tokens.get(cursor), Some((Ok(TagToken::Equals), _))) {
					attributes.push(Attribute {
						name: attribute_name,
						value: String::new(),
						value_span: None,
					});
					continue;
				}
				cursor += 1;

				let value_span = match tokens.get(cursor)? {
					(Ok(TagToken::DoubleQuoted | TagToken::SingleQuoted), span) => {
						cursor += 1;
						span.start + 1..span.end - 1
					}
					(Ok(TagToken::Word), span) => {
						let start = span.start;
						let mut end = span.end;
						cursor += 1;
						while let Some((Ok(TagToken::Word | TagToken::Slash), next)) = tokens.get(cursor) {
							if next.start != end {
								break;
							}
							end = next.end;
							cursor += 1;
						}
						start..end
					}
					_ => return None,
				};

				attributes.push(Attribute {
					name: attribute_name,
					value: raw[value_span.clone()].to_string(),
					value_span: Some(value_span),
				});
			}
			_ => return None,
		}
	}
}
