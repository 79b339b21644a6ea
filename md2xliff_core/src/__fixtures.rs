use std::collections::BTreeSet;

use crate::ExtractOptions;
use crate::Extraction;
use crate::Md2XliffResult;
use crate::ReconstructOptions;
use crate::extract;
use crate::reconstruct;

/// A document touching every block kind the walker handles.
pub const KITCHEN_SINK: &str = r#"---
title: Release notes
draft: false
summary: 'Everything new: in one place'
---

# Release notes for {{ product }}

Some **bold**, *italic* and ~~struck~~ text with a [link](https://example.com "Example").

Hello

Hello

- First item with `inline code`
- Second item
  > Nested quote

| Name | Role |
| ---- | ---- |
| Ann  | Dev  |

Intro <img src="logo.png" alt="Company logo"> outro

<div class="note">Careful <iframe src="https://video.example/embed" title="Demo video"></iframe> now</div>

```css
/* Primary colour */
body { color: red; }
```

```js
// Greets the user
const greet = (name) => `Hello ${name}`;
```

```text
Plain block
```

<#list customer.contactroles as contact>{{> normalContact }}</#list>

See [the docs][docs] for details.

[docs]: https://example.com/docs "Documentation"
"#;

/// Extract with default options.
pub fn extract_default(markdown: &str) -> Md2XliffResult<Extraction> {
	extract(markdown, &ExtractOptions::default())
}

/// Extract `markdown` and rebuild it from the source side of every unit.
pub fn round_trip(markdown: &str) -> Md2XliffResult<String> {
	let extraction = extract_default(markdown)?;
	reconstruct(
		&extraction.xliff,
		&extraction.skeleton,
		&ReconstructOptions::source(),
	)
}

/// Ids of every `%%%id%%%` token in a skeleton, in order of appearance.
pub fn skeleton_ids(skeleton: &str) -> Vec<u32> {
	let pattern = regex::Regex::new(r"%%%(\d+)%%%").unwrap();
	pattern
		.captures_iter(skeleton)
		.map(|captures| captures[1].parse().unwrap())
		.collect()
}

pub fn unit_ids(extraction: &Extraction) -> BTreeSet<u32> {
	extraction.units.iter().map(|unit| unit.id).collect()
}

/// The source of each unit, in id order.
pub fn sources(extraction: &Extraction) -> Vec<&str> {
	extraction
		.units
		.iter()
		.map(|unit| unit.source.as_str())
		.collect()
}

/// Minimal exchange document with `(id, source, target)` units.
pub fn exchange_document(units: &[(&str, &str, Option<&str>)]) -> String {
	let mut xliff = String::from(
		"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<xliff \
		 xmlns=\"urn:oasis:names:tc:xliff:document:1.2\" version=\"1.2\">\n<file \
		 original=\"doc.md\" source-language=\"ru-RU\" target-language=\"en-US\" \
		 datatype=\"markdown\">\n<body>\n",
	);

	for (id, source, target) in units {
		let target = target
			.map(|target| format!("<target>{target}</target>"))
			.unwrap_or_default();
		xliff.push_str(&format!(
			"<trans-unit id=\"{id}\"><source>{source}</source>{target}</trans-unit>\n"
		));
	}

	xliff.push_str("</body>\n</file>\n</xliff>\n");
	xliff
}
