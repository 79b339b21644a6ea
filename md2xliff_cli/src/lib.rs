use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Split markdown into an XLIFF exchange file and a skeleton, and merge translations back.",
	long_about = "md2xliff extracts the translatable text of a markdown document into an XLIFF \
	              1.2 exchange file and leaves a skeleton with numbered placeholders behind. \
	              Once the exchange file is translated, the skeleton is filled back in to \
	              produce the translated document.\n\nQuick start:\n  md2xliff extract \
	              guide.md          Write guide.xlf and guide.skl.md\n  md2xliff reconstruct \
	              guide.xlf guide.skl.md\n  md2xliff check guide.md            Verify the \
	              document survives a round trip"
)]
pub struct Md2XliffCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Project root used to discover `md2xliff.toml`.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create a sample `md2xliff.toml` in the project root.
	///
	/// Does nothing when a configuration file already exists.
	Init,
	/// Extract the translatable text of a markdown document.
	///
	/// Writes the exchange document and the skeleton next to the input unless
	/// other destinations are given. Options not passed on the command line
	/// come from `md2xliff.toml`.
	Extract {
		/// The markdown document to extract.
		input: PathBuf,

		/// Where to write the XLIFF exchange document. Defaults to
		/// `<stem>.xlf` beside the input.
		#[arg(long)]
		xliff: Option<PathBuf>,

		/// Where to write the skeleton. Defaults to `<stem>.skl.md` beside
		/// the input.
		#[arg(long)]
		skeleton: Option<PathBuf>,

		/// Language of the document, e.g. `ru-RU`.
		#[arg(long)]
		source_lang: Option<String>,

		/// Language the document is translated into, e.g. `en-US`.
		#[arg(long)]
		target_lang: Option<String>,

		/// Fail on closing template directives that do not match an opening
		/// directive in the same block.
		#[arg(long, default_value_t = false)]
		strict_directives: bool,

		/// Do not warn when comments in a code block cannot be parsed.
		#[arg(long, default_value_t = false)]
		quiet_parse_errors: bool,
	},
	/// Rebuild a document from an exchange document and its skeleton.
	Reconstruct {
		/// The (translated) XLIFF exchange document.
		xliff: PathBuf,

		/// The skeleton written by `extract`.
		skeleton: PathBuf,

		/// Write the document here instead of standard output.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Fill the skeleton with the source text instead of the targets.
		#[arg(long, default_value_t = false)]
		use_source: bool,

		/// Use the source text of units whose target is missing or blank.
		#[arg(long, default_value_t = false)]
		fallback_to_source: bool,
	},
	/// Verify that a document survives extraction and reconstruction.
	///
	/// Extracts the document, rebuilds it from the source text of every unit
	/// and compares the result with the input. Exits with a non-zero status
	/// code when they differ.
	Check {
		/// The markdown document to check.
		input: PathBuf,

		/// Show a line diff between the input and the rebuilt document.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
