use crate::category::ThresholdTable;
use crate::output::OutputFormat;
use crate::tokenize::{Strategy, DEFAULT_MAX_LINE_CHARS};
use std::path::PathBuf;

/// Upper bound on how many discovered files take part in a run. A larger
/// `Config::max_files` is clamped to it.
pub const DEFAULT_MAX_FILES: usize = 50;

/// Extensions eligible for comparison when no `--include` list is given
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // Code
    "go", "py", "js", "cpp", "java", "rs", "c", "rb", "html", "css", "php", "swift", "ts",
    // Text and data
    "yaml", "json", "xml", "csv", "txt", "md",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub include_extensions: Vec<String>,
    pub exclude_extensions: Option<Vec<String>>,
    pub respect_ignore: bool,
    pub max_files: usize,
    pub max_line_chars: usize,
    pub strategy: Strategy,
    pub thresholds: ThresholdTable,
    pub jobs: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: OutputFormat::Text,
            output_file: None,
            include_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            exclude_extensions: None,
            respect_ignore: true,
            max_files: DEFAULT_MAX_FILES,
            max_line_chars: DEFAULT_MAX_LINE_CHARS,
            strategy: Strategy::default(),
            thresholds: ThresholdTable::default(),
            jobs: None,
        }
    }
}

impl Config {
    pub fn should_include_extension(&self, ext: &str) -> bool {
        // Extension must be on the allowlist
        if !self
            .include_extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
        {
            return false;
        }

        // If exclude list is specified, extension must not be in it
        if let Some(ref exclude) = self.exclude_extensions {
            if exclude
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
            {
                return false;
            }
        }

        true
    }

    /// `max_files`, never above [`DEFAULT_MAX_FILES`].
    pub fn file_limit(&self) -> usize {
        self.max_files.min(DEFAULT_MAX_FILES)
    }

    /// Where the report goes: `--output`, or the format's default file name
    /// in the current directory.
    pub fn report_path(&self) -> PathBuf {
        self.output_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.format.default_file_name()))
    }
}
