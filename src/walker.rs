use crate::config::Config;
use crate::error::SimilarityError;
use crate::filters::{should_skip, SkipReason};
use ignore::WalkBuilder;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A file queued for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path
    pub path: PathBuf,
    /// Path relative to the analyzed directory, `/`-separated
    pub name: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, root: &Path) -> Self {
        let name = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        Self { path, name }
    }
}

#[derive(Debug, Default)]
pub struct DiscoveryStats {
    pub total_files: usize,
    pub included_files: usize,
    pub skipped_by_reason: HashMap<String, usize>,
    pub included_by_extension: HashMap<String, usize>,
}

impl DiscoveryStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_included(&mut self, extension: Option<&str>) {
        self.total_files += 1;
        self.included_files += 1;
        let ext = extension.unwrap_or("no extension").to_string();
        *self.included_by_extension.entry(ext).or_insert(0) += 1;
    }

    pub fn add_skipped(&mut self, reason: SkipReason) {
        self.total_files += 1;
        *self.skipped_by_reason.entry(reason.to_string()).or_insert(0) += 1;
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_by_reason.values().sum()
    }

    /// `3 (2 .rs, 1 .py)`: included count with extension breakdown.
    pub fn format_included(&self) -> String {
        let mut summary = self.included_files.to_string();

        if !self.included_by_extension.is_empty() {
            let mut extensions: Vec<_> = self.included_by_extension.iter().collect();
            extensions.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));

            let ext_str = extensions
                .iter()
                .map(|(ext, count)| format!("{} .{}", count, ext))
                .collect::<Vec<_>>()
                .join(", ");

            summary.push_str(&format!(" ({})", ext_str));
        }

        summary
    }

    /// `4 (3 extension, 1 walk error)`, or `None` when nothing was skipped.
    pub fn format_skipped(&self) -> Option<String> {
        if self.total_skipped() == 0 {
            return None;
        }

        let mut reasons: Vec<_> = self.skipped_by_reason.iter().collect();
        reasons.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));

        let reason_str = reasons
            .iter()
            .map(|(reason, count)| format!("{} {}", count, reason))
            .collect::<Vec<_>>()
            .join(", ");

        Some(format!("{} ({})", self.total_skipped(), reason_str))
    }
}

/// Outcome of walking the target directory.
#[derive(Debug)]
pub struct Discovery {
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
    pub stats: DiscoveryStats,
}

/// Walk `config.directory` and collect the files to compare.
///
/// Files come back in walk order (sorted by name at each level), capped at
/// `config.max_files`. Fewer than two eligible files is an error. The report
/// this run is about to write is never an input, even when it already exists
/// inside the directory from an earlier run.
pub fn discover_files(config: &Config) -> Result<Discovery, SimilarityError> {
    if !config.directory.is_dir() {
        return Err(SimilarityError::DirectoryNotFound(config.directory.clone()));
    }
    let root = fs::canonicalize(&config.directory)?;

    let mut stats = DiscoveryStats::new();
    let report = fs::canonicalize(config.report_path()).ok();

    let mut builder = WalkBuilder::new(&root);
    builder.standard_filters(config.respect_ignore);
    builder.sort_by_file_name(|a, b| a.cmp(b));

    let mut eligible = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                let path = entry.path();

                // Skip directories
                if path.is_dir() {
                    continue;
                }

                if is_report(path, report.as_deref()) {
                    debug!("Skipping {}: {}", path.display(), SkipReason::Report);
                    stats.add_skipped(SkipReason::Report);
                    continue;
                }

                if let Some(reason) = should_skip(path, config) {
                    debug!("Skipping {}: {}", path.display(), reason);
                    stats.add_skipped(reason);
                    continue;
                }

                eligible.push(path.to_path_buf());
            }
            Err(e) => {
                warn!("Error walking directory: {}", e);
                stats.add_skipped(SkipReason::WalkError);
            }
        }
    }

    if eligible.len() < 2 {
        return Err(SimilarityError::InsufficientInput {
            dir: root,
            found: eligible.len(),
        });
    }

    let limit = config.file_limit();
    if eligible.len() > limit {
        let dropped = eligible.split_off(limit);
        info!(
            "Found {} eligible files, comparing the first {} only",
            limit + dropped.len(),
            limit
        );
        for path in &dropped {
            debug!("Skipping {}: {}", path.display(), SkipReason::OverLimit);
            stats.add_skipped(SkipReason::OverLimit);
        }
    }

    let files = eligible
        .into_iter()
        .map(|path| {
            stats.add_included(path.extension().and_then(|e| e.to_str()));
            SourceFile::new(path, &root)
        })
        .collect();

    Ok(Discovery { root, files, stats })
}

fn is_report(path: &Path, report: Option<&Path>) -> bool {
    let Some(report) = report else {
        return false;
    };
    path.file_name() == report.file_name()
        && fs::canonicalize(path).is_ok_and(|canonical| canonical == report)
}
