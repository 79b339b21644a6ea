use std::collections::HashMap;

use roxmltree::Node;
use serde::Deserialize;
use serde::Serialize;

use crate::Md2XliffError;
use crate::Md2XliffResult;

/// Which side of each unit fills the skeleton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSide {
	/// The translated `<target>` text.
	#[default]
	Target,
	/// The original `<source>` text. Reconstructing from the source side
	/// reproduces the extracted document.
	Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconstructOptions {
	pub side: TextSide,
	/// Use the source text for units whose target is missing or blank.
	pub fallback_to_source: bool,
}

impl ReconstructOptions {
	/// Options that rebuild the original document.
	pub fn source() -> Self {
		Self {
			side: TextSide::Source,
			fallback_to_source: false,
		}
	}
}

/// A unit read back from an exchange document. Texts are the concatenated
/// character data of the element, inline markup removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeEntry {
	pub id: u32,
	pub source: String,
	/// `None` when the unit has no `<target>` element.
	pub target: Option<String>,
}

impl ExchangeEntry {
	/// The text this unit contributes to the reconstructed document.
	pub fn text(&self, options: &ReconstructOptions) -> &str {
		if options.side == TextSide::Source {
			return &self.source;
		}

		let target = self.target.as_deref().unwrap_or_default();
		if options.fallback_to_source && target.trim().is_empty() {
			tracing::info!(id = self.id, "target is blank, falling back to the source text");
			return &self.source;
		}

		target
	}
}

/// Read every `trans-unit` of an XLIFF document.
pub fn read_entries(xliff: &str) -> Md2XliffResult<Vec<ExchangeEntry>> {
	let document =
		roxmltree::Document::parse(xliff).map_err(|e| Md2XliffError::XliffParse(e.to_string()))?;

	let root = document.root_element();
	if root.tag_name().name() != "xliff" {
		return Err(Md2XliffError::NotXliff(root.tag_name().name().to_string()));
	}

	let mut entries = vec![];
	let bodies = root
		.children()
		.filter(|node| node.has_tag_name("file"))
		.flat_map(|file| file.children().filter(|node| node.has_tag_name("body")));

	for body in bodies {
		for unit in body.descendants().filter(|node| node.has_tag_name("trans-unit")) {
			let Some(id) = unit.attribute("id").and_then(|id| id.trim().parse::<u32>().ok()) else {
				tracing::warn!(
					id = unit.attribute("id").unwrap_or_default(),
					"skipping trans-unit without a numeric id"
				);
				continue;
			};

			entries.push(ExchangeEntry {
				id,
				source: child_text(unit, "source").unwrap_or_default(),
				target: child_text(unit, "target"),
			});
		}
	}

	Ok(entries)
}

fn child_text(unit: Node<'_, '_>, name: &str) -> Option<String> {
	let element = unit.children().find(|node| node.has_tag_name(name))?;
	Some(
		element
			.descendants()
			.filter(Node::is_text)
			.filter_map(|node| node.text())
			.collect(),
	)
}

/// Rebuild a document from an exchange document and its skeleton.
///
/// Fails only when the exchange document is not well-formed XLIFF. Units
/// that are missing from it leave their placeholder in the output.
pub fn reconstruct(
	xliff: &str,
	skeleton: &str,
	options: &ReconstructOptions,
) -> Md2XliffResult<String> {
	let mut texts = HashMap::new();
	for entry in read_entries(xliff)? {
		let text = entry.text(options).to_string();
		if texts.insert(entry.id, text).is_some() {
			tracing::warn!(id = entry.id, "duplicate trans-unit id, the last one wins");
		}
	}

	Ok(fill_skeleton(skeleton, &texts))
}

/// Replace each `%%%id%%%` token in one left-to-right pass. Inserted text is
/// never rescanned and tokens with unknown ids are kept.
pub fn fill_skeleton(skeleton: &str, texts: &HashMap<u32, String>) -> String {
	let mut output = String::with_capacity(skeleton.len());
	let mut rest = skeleton;

	while let Some(start) = rest.find("%%%") {
		let after = &rest[start + 3..];
		let digits = after.len() - after.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
		let text = (digits > 0 && after[digits..].starts_with("%%%"))
			.then(|| after[..digits].parse::<u32>().ok())
			.flatten()
			.and_then(|id| texts.get(&id));

		if let Some(text) = text {
			output.push_str(&rest[..start]);
			output.push_str(text);
			rest = &after[digits + 3..];
		} else {
			output.push_str(&rest[..=start]);
			rest = &rest[start + 1..];
		}
	}

	output.push_str(rest);
	output
}
