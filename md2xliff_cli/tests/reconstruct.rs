mod common;

use std::path::Path;

use md2xliff_core::AnyEmptyResult;
use similar_asserts::assert_eq;

const LETTER: &str = "# Привет\n\nДобрый день, ${customer.name}!\n\nСпасибо.\n";

fn extract_letter(root: &Path) -> AnyEmptyResult {
	std::fs::write(root.join("letter.md"), LETTER)?;
	common::md2xliff_cmd()
		.arg("extract")
		.arg(root.join("letter.md"))
		.arg("--path")
		.arg(root)
		.assert()
		.success();

	Ok(())
}

/// Fill the `<target>` of every unit from `translations`, in id order.
fn translate(xliff: &str, translations: &[&str]) -> String {
	let mut translated = String::new();
	let mut rest = xliff;
	let mut next = translations.iter();

	while let Some(start) = rest.find("</target>") {
		let (head, tail) = rest.split_at(start);
		translated.push_str(head);
		if let Some(text) = next.next() {
			translated.push_str(text);
		}
		translated.push_str("</target>");
		rest = &tail["</target>".len()..];
	}

	translated.push_str(rest);
	translated
}

#[test]
fn reconstruct_from_source_prints_the_original() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	extract_letter(tmp.path())?;

	let output = common::md2xliff_cmd()
		.arg("reconstruct")
		.arg(tmp.path().join("letter.xlf"))
		.arg(tmp.path().join("letter.skl.md"))
		.arg("--use-source")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	assert_eq!(String::from_utf8(output.stdout)?, LETTER);

	Ok(())
}

#[test]
fn reconstruct_writes_translations_to_a_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	extract_letter(tmp.path())?;

	let xliff = std::fs::read_to_string(tmp.path().join("letter.xlf"))?;
	let translated = translate(
		&xliff,
		&[
			"Hello",
			"Good afternoon, <ph id=\"1\" ctype=\"x-freemarker-template\">${customer.name}</ph>!",
			"Thank you.",
		],
	);
	std::fs::write(tmp.path().join("letter.en.xlf"), translated)?;

	common::md2xliff_cmd()
		.arg("reconstruct")
		.arg(tmp.path().join("letter.en.xlf"))
		.arg(tmp.path().join("letter.skl.md"))
		.arg("--output")
		.arg(tmp.path().join("letter.en.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Wrote"));

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("letter.en.md"))?,
		"# Hello\n\nGood afternoon, ${customer.name}!\n\nThank you.\n"
	);

	Ok(())
}

#[test]
fn reconstruct_falls_back_to_source_for_untranslated_units() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	extract_letter(tmp.path())?;

	let xliff = std::fs::read_to_string(tmp.path().join("letter.xlf"))?;
	std::fs::write(
		tmp.path().join("letter.en.xlf"),
		translate(&xliff, &["Hello"]),
	)?;

	let output = common::md2xliff_cmd()
		.arg("reconstruct")
		.arg(tmp.path().join("letter.en.xlf"))
		.arg(tmp.path().join("letter.skl.md"))
		.arg("--fallback-to-source")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	assert_eq!(
		String::from_utf8(output.stdout)?,
		"# Hello\n\nДобрый день, ${customer.name}!\n\nСпасибо.\n"
	);

	Ok(())
}

#[test]
fn reconstruct_reads_the_side_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	extract_letter(tmp.path())?;
	std::fs::write(
		tmp.path().join("md2xliff.toml"),
		"[reconstruct]\nuse_source = true\n",
	)?;

	let output = common::md2xliff_cmd()
		.arg("reconstruct")
		.arg(tmp.path().join("letter.xlf"))
		.arg(tmp.path().join("letter.skl.md"))
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	assert_eq!(String::from_utf8(output.stdout)?, LETTER);

	Ok(())
}

#[test]
fn reconstruct_rejects_documents_that_are_not_xliff() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.xlf"), "<html><body/></html>")?;
	std::fs::write(tmp.path().join("page.skl.md"), "%%%1%%%\n")?;

	common::md2xliff_cmd()
		.arg("reconstruct")
		.arg(tmp.path().join("page.xlf"))
		.arg(tmp.path().join("page.skl.md"))
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("md2xliff::not_xliff"));

	Ok(())
}
