use crate::config::Config;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoExtension,
    Extension,
    OverLimit,
    Report,
    WalkError,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoExtension => write!(f, "no extension"),
            SkipReason::Extension => write!(f, "extension"),
            SkipReason::OverLimit => write!(f, "over file limit"),
            SkipReason::Report => write!(f, "previous report"),
            SkipReason::WalkError => write!(f, "walk error"),
        }
    }
}

/// Check whether a file is eligible for comparison, returning the reason if not
pub fn should_skip(path: &Path, config: &Config) -> Option<SkipReason> {
    let Some(ext) = path.extension() else {
        return Some(SkipReason::NoExtension);
    };

    if !config.should_include_extension(&ext.to_string_lossy()) {
        return Some(SkipReason::Extension);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_extension() {
        let config = Config::default();
        assert_eq!(
            should_skip(Path::new("Makefile"), &config),
            Some(SkipReason::NoExtension)
        );
    }

    #[test]
    fn test_extension_filter() {
        let config = Config {
            include_extensions: vec!["rs".to_string()],
            ..Default::default()
        };

        assert_eq!(
            should_skip(Path::new("file.json"), &config),
            Some(SkipReason::Extension)
        );
        assert_eq!(should_skip(Path::new("src/file.rs"), &config), None);
    }

    #[test]
    fn test_default_rejects_binary_extensions() {
        let config = Config::default();
        assert_eq!(
            should_skip(Path::new("logo.png"), &config),
            Some(SkipReason::Extension)
        );
        assert_eq!(should_skip(Path::new("notes.txt"), &config), None);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::OverLimit.to_string(), "over file limit");
        assert_eq!(SkipReason::Extension.to_string(), "extension");
        assert_eq!(SkipReason::Report.to_string(), "previous report");
    }
}
