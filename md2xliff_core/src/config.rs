use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::DEFAULT_SOURCE_LANGUAGE;
use crate::DEFAULT_TARGET_LANGUAGE;
use crate::DirectiveMode;
use crate::ExtractOptions;
use crate::MarkdownOptions;
use crate::Md2XliffError;
use crate::Md2XliffResult;
use crate::ReconstructOptions;
use crate::TextSide;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"md2xliff.toml",
	".md2xliff.toml",
	".config/md2xliff.toml",
];

/// Configuration loaded from an `md2xliff.toml` file. Every field is
/// optional and falls back to the built-in default.
///
/// ```toml
/// [languages]
/// source = "ru-RU"
/// target = "en-US"
///
/// [extract]
/// directives = "lenient"
/// quiet_parse_errors = false
/// gfm = true
/// front_matter = true
///
/// [reconstruct]
/// use_source = false
/// fallback_to_source = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Md2XliffConfig {
	#[serde(default)]
	pub languages: LanguagesConfig,
	#[serde(default)]
	pub extract: ExtractConfig,
	#[serde(default)]
	pub reconstruct: ReconstructConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct LanguagesConfig {
	/// Language tag of the documents being extracted.
	pub source: Option<String>,
	/// Language tag translators produce.
	pub target: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExtractConfig {
	/// How unmatched FreeMarker closing directives are handled.
	pub directives: Option<DirectiveMode>,
	/// Log code comment parse failures at debug level.
	pub quiet_parse_errors: Option<bool>,
	pub gfm: Option<bool>,
	pub front_matter: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReconstructConfig {
	/// Fill the skeleton from `<source>` instead of `<target>`.
	pub use_source: Option<bool>,
	/// Use `<source>` for units with a blank `<target>`.
	pub fallback_to_source: Option<bool>,
}

impl Md2XliffConfig {
	/// Return the first existing config file path at `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if the file does not exist.
	pub fn load(root: &Path) -> Md2XliffResult<Option<Md2XliffConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	pub fn parse(content: &str) -> Md2XliffResult<Md2XliffConfig> {
		toml::from_str(content).map_err(|e| Md2XliffError::ConfigParse(e.to_string()))
	}

	/// Extraction options for the document named `file_name`.
	pub fn extract_options(&self, file_name: impl Into<String>) -> ExtractOptions {
		let markdown = MarkdownOptions::default();

		ExtractOptions {
			file_name: file_name.into(),
			skeleton_file_name: None,
			source_language: self
				.languages
				.source
				.clone()
				.unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string()),
			target_language: self
				.languages
				.target
				.clone()
				.unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string()),
			directive_mode: self.extract.directives.unwrap_or_default(),
			quiet_parse_errors: self.extract.quiet_parse_errors.unwrap_or(false),
			markdown: MarkdownOptions {
				gfm: self.extract.gfm.unwrap_or(markdown.gfm),
				front_matter: self.extract.front_matter.unwrap_or(markdown.front_matter),
			},
		}
	}

	pub fn reconstruct_options(&self) -> ReconstructOptions {
		let side = if self.reconstruct.use_source.unwrap_or(false) {
			TextSide::Source
		} else {
			TextSide::Target
		};

		ReconstructOptions {
			side,
			fallback_to_source: self.reconstruct.fallback_to_source.unwrap_or(false),
		}
	}
}
