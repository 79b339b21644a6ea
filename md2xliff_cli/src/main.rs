use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use md2xliff_cli::Commands;
use md2xliff_cli::Md2XliffCli;
use md2xliff_cli::OutputFormat;
use md2xliff_core::AnyResult;
use md2xliff_core::CONFIG_FILE_CANDIDATES;
use md2xliff_core::DEFAULT_FILE_NAME;
use md2xliff_core::DirectiveMode;
use md2xliff_core::Md2XliffConfig;
use md2xliff_core::ReconstructOptions;
use md2xliff_core::TextSide;
use md2xliff_core::default_skeleton_name;
use md2xliff_core::document_stem;
use md2xliff_core::extract;
use md2xliff_core::reconstruct;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

const SAMPLE_CONFIG: &str = "# md2xliff configuration\n\n[languages]\n# Language of the \
                             documents you extract.\nsource = \"ru-RU\"\n# Language they are \
                             translated into.\ntarget = \"en-US\"\n\n[extract]\n# \"strict\" \
                             rejects closing directives such as </#if> that do not match an \
                             opening\n# directive in the same block. \"lenient\" protects the \
                             whole span instead.\ndirectives = \"lenient\"\n# Log unparsable \
                             code block comments at debug level instead of warning.\n# \
                             quiet_parse_errors = false\n# gfm = true\n# front_matter = \
                             true\n\n[reconstruct]\n# Fill the skeleton with the source text \
                             instead of the translations.\n# use_source = false\n# Use the \
                             source text of units that have no translation yet.\n# \
                             fallback_to_source = false\n";

fn main() {
	let args = Md2XliffCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_logging(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Extract {
			input,
			xliff,
			skeleton,
			source_lang,
			target_lang,
			strict_directives,
			quiet_parse_errors,
		}) => {
			run_extract(
				&args,
				&ExtractArgs {
					input,
					xliff: xliff.as_deref(),
					skeleton: skeleton.as_deref(),
					source_lang: source_lang.as_deref(),
					target_lang: target_lang.as_deref(),
					strict_directives: *strict_directives,
					quiet_parse_errors: *quiet_parse_errors,
				},
			)
		}
		Some(Commands::Reconstruct {
			xliff,
			skeleton,
			output,
			use_source,
			fallback_to_source,
		}) => {
			run_reconstruct(
				&args,
				xliff,
				skeleton,
				output.as_deref(),
				*use_source,
				*fallback_to_source,
			)
		}
		Some(Commands::Check {
			input,
			diff,
			format,
		}) => run_check(&args, input, *diff, *format),
		None => {
			eprintln!("No subcommand specified. Run `md2xliff --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<md2xliff_core::Md2XliffError>() {
			Ok(error) => {
				let report: miette::Report = (*error).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init();
}

fn resolve_root(args: &Md2XliffCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_config(args: &Md2XliffCli) -> AnyResult<Md2XliffConfig> {
	let root = resolve_root(args);
	let config = Md2XliffConfig::load(&root)?.unwrap_or_default();
	Ok(config)
}

fn file_name_of(path: &Path) -> String {
	path.file_name()
		.map_or_else(|| DEFAULT_FILE_NAME.to_string(), |name| name.to_string_lossy().into_owned())
}

fn run_init(args: &Md2XliffCli) -> AnyResult<()> {
	let root = resolve_root(args);

	if let Some(existing) = Md2XliffConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created {}", config_path.display());
	println!();
	println!("Next steps:");
	println!("  1. Set the source and target languages in {}", CONFIG_FILE_CANDIDATES[0]);
	println!("  2. Run `md2xliff extract <document.md>` to create the exchange file");
	println!("  3. Run `md2xliff reconstruct <document.xlf> <document.skl.md>` once translated");

	Ok(())
}

struct ExtractArgs<'a> {
	input: &'a Path,
	xliff: Option<&'a Path>,
	skeleton: Option<&'a Path>,
	source_lang: Option<&'a str>,
	target_lang: Option<&'a str>,
	strict_directives: bool,
	quiet_parse_errors: bool,
}

fn run_extract(args: &Md2XliffCli, extract_args: &ExtractArgs<'_>) -> AnyResult<()> {
	let input = extract_args.input;
	let markdown = std::fs::read_to_string(input)?;
	let file_name = file_name_of(input);

	let xliff_path = extract_args.xliff.map_or_else(
		|| input.with_file_name(format!("{}.xlf", document_stem(&file_name))),
		Path::to_path_buf,
	);
	let skeleton_path = extract_args.skeleton.map_or_else(
		|| input.with_file_name(default_skeleton_name(&file_name)),
		Path::to_path_buf,
	);

	let mut options = load_config(args)?.extract_options(file_name);
	options.skeleton_file_name = Some(file_name_of(&skeleton_path));
	if let Some(language) = extract_args.source_lang {
		options.source_language = language.to_string();
	}
	if let Some(language) = extract_args.target_lang {
		options.target_language = language.to_string();
	}
	if extract_args.strict_directives {
		options.directive_mode = DirectiveMode::Strict;
	}
	if extract_args.quiet_parse_errors {
		options.quiet_parse_errors = true;
	}

	let extraction = extract(&markdown, &options)?;
	std::fs::write(&xliff_path, &extraction.xliff)?;
	std::fs::write(&skeleton_path, &extraction.skeleton)?;

	println!(
		"Extracted {} units from {}",
		extraction.units.len(),
		input.display()
	);
	println!("  exchange file: {}", xliff_path.display());
	println!("  skeleton:      {}", skeleton_path.display());

	Ok(())
}

fn run_reconstruct(
	args: &Md2XliffCli,
	xliff_path: &Path,
	skeleton_path: &Path,
	output: Option<&Path>,
	use_source: bool,
	fallback_to_source: bool,
) -> AnyResult<()> {
	let xliff = std::fs::read_to_string(xliff_path)?;
	let skeleton = std::fs::read_to_string(skeleton_path)?;

	let mut options = load_config(args)?.reconstruct_options();
	if use_source {
		options.side = TextSide::Source;
	}
	if fallback_to_source {
		options.fallback_to_source = true;
	}

	let document = reconstruct(&xliff, &skeleton, &options)?;

	match output {
		Some(path) => {
			std::fs::write(path, &document)?;
			println!("Wrote {}", path.display());
		}
		None => print!("{document}"),
	}

	Ok(())
}

fn run_check(
	args: &Md2XliffCli,
	input: &Path,
	show_diff: bool,
	format: OutputFormat,
) -> AnyResult<()> {
	let markdown = std::fs::read_to_string(input)?;
	let options = load_config(args)?.extract_options(file_name_of(input));
	let extraction = extract(&markdown, &options)?;
	let rebuilt = reconstruct(
		&extraction.xliff,
		&extraction.skeleton,
		&ReconstructOptions::source(),
	)?;

	let ok = rebuilt == markdown;
	let units = extraction.units.len();

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": ok,
				"file": input.display().to_string(),
				"units": units,
				"first_difference": first_difference(&markdown, &rebuilt),
			});
			println!("{output}");
		}
		OutputFormat::Text if ok => {
			println!(
				"{} {} round-trips through {units} units.",
				colored!("Check passed:", green),
				input.display()
			);
			if args.verbose {
				for unit in &extraction.units {
					println!("  {:>4}  {}", unit.id, unit.source);
				}
			}
		}
		OutputFormat::Text => {
			eprintln!(
				"{} {} does not survive extraction and reconstruction.",
				colored!("Check failed:", red),
				input.display()
			);
			if let Some(line) = first_difference(&markdown, &rebuilt) {
				eprintln!("  first difference on line {line}");
			}
			if show_diff {
				eprintln!();
				eprintln!("{}", colored!("Diff (input -> rebuilt):", bold));
				print_diff(&markdown, &rebuilt);
			}
		}
	}

	if !ok {
		process::exit(1);
	}

	Ok(())
}

/// 1-based number of the first line that differs.
fn first_difference(expected: &str, actual: &str) -> Option<usize> {
	if expected == actual {
		return None;
	}

	let mut expected_lines = expected.split_inclusive('\n');
	let mut actual_lines = actual.split_inclusive('\n');
	let mut line = 1;
	loop {
		match (expected_lines.next(), actual_lines.next()) {
			(Some(left), Some(right)) if left == right => line += 1,
			_ => return Some(line),
		}
	}
}

fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
