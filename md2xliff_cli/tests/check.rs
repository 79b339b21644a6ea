mod common;

use md2xliff_core::AnyEmptyResult;
use rstest::rstest;
use serde_json::Value;

#[rstest]
#[case::plain("# Title\n\nA paragraph.\n")]
#[case::front_matter("---\ntitle: Notes\n---\n\n# Notes\n")]
#[case::crlf("# Title\r\n\r\nFirst line\r\nsecond line\r\n")]
#[case::html("<div class=\"note\">Careful <img src=\"a.png\" alt=\"Alert\"> now</div>\n")]
#[case::templates("<#list roles as role>{{> contact }}</#list>\n\nDear ${name},\n")]
fn check_passes_for_documents(#[case] document: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.md");
	std::fs::write(&input, document)?;

	common::md2xliff_cmd()
		.arg("check")
		.arg(&input)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed"));

	Ok(())
}

#[test]
fn check_verbose_lists_units() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.md");
	std::fs::write(&input, "# Title\n\nA paragraph.\n")?;

	common::md2xliff_cmd()
		.arg("check")
		.arg(&input)
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("round-trips through 2 units"))
		.stdout(predicates::str::contains("A paragraph."));

	Ok(())
}

#[test]
fn check_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.md");
	std::fs::write(&input, "# Title\n\n- one\n- two\n")?;

	let output = common::md2xliff_cmd()
		.arg("check")
		.arg(&input)
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert!(output.status.success());
	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], Value::Bool(true));
	assert_eq!(json["units"], Value::from(3));
	assert_eq!(json["first_difference"], Value::Null);

	Ok(())
}

#[test]
fn check_reports_extraction_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = tmp.path().join("doc.md");
	std::fs::write(&input, "---\n- not\n- a mapping\n---\n\nBody\n")?;

	common::md2xliff_cmd()
		.arg("check")
		.arg(&input)
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("md2xliff::front_matter"));

	Ok(())
}
