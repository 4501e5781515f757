use crate::config::Config;
use crate::tokenize::Tokenizer;
use crate::walker::SourceFile;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use tracing::{debug, warn};

/// Score and label for one unordered pair of files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    pub file1: String,
    pub file2: String,
    pub similarity: f64,
    pub category: String,
}

/// Everything the driver produced for one run.
#[derive(Debug, Default)]
pub struct Comparison {
    /// Results in `(i, j)` order over the input files
    pub results: Vec<SimilarityResult>,
    /// Pairs dropped because a file could not be read or parsed
    pub omitted: usize,
}

/// Compare every unordered pair of `files`.
///
/// Each file is read once. A pair is left out of the results when either
/// file is unreadable or fails to tokenize; that never aborts the run.
/// Callers hand in at least two and at most `config.max_files` files.
pub fn compare_files(files: &[SourceFile], config: &Config) -> Comparison {
    let contents: Vec<Option<String>> = files.iter().map(read_content).collect();

    let pairs: Vec<(usize, usize)> = (0..files.len())
        .flat_map(|i| (i + 1..files.len()).map(move |j| (i, j)))
        .collect();

    let score_pair = |&(i, j): &(usize, usize)| -> Option<SimilarityResult> {
        let a = contents[i].as_deref()?;
        let b = contents[j].as_deref()?;
        compare_pair(&files[i], a, &files[j], b, config)
    };

    let outcomes: Vec<Option<SimilarityResult>> = match config.jobs {
        Some(1) => pairs.iter().map(score_pair).collect(),
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| pairs.par_iter().map(score_pair).collect::<Vec<_>>()),
            Err(e) => {
                warn!("Failed to build a {}-thread pool, running sequentially: {}", threads, e);
                pairs.iter().map(score_pair).collect()
            }
        },
        None => pairs.par_iter().map(score_pair).collect(),
    };

    let total = outcomes.len();
    let results: Vec<SimilarityResult> = outcomes.into_iter().flatten().collect();
    Comparison {
        omitted: total - results.len(),
        results,
    }
}

fn read_content(file: &SourceFile) -> Option<String> {
    match fs::read(&file.path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            warn!("Error reading {}: {}, skipping its pairs", file.path.display(), e);
            None
        }
    }
}

fn compare_pair(
    a: &SourceFile,
    content_a: &str,
    b: &SourceFile,
    content_b: &str,
    config: &Config,
) -> Option<SimilarityResult> {
    let tokenizer = Tokenizer::for_pair(config.strategy, &a.path, &b.path, config.max_line_chars);

    let tokenize = |file: &SourceFile, content: &str| {
        tokenizer
            .tokenize(&file.path, content)
            .map_err(|e| warn!("Skipping pair {} / {}: {}: {}", a.name, b.name, file.name, e))
            .ok()
    };

    let repr_a = tokenize(a, content_a)?;
    let repr_b = tokenize(b, content_b)?;
    let similarity = repr_a.similarity(&repr_b)?;
    let category = config.thresholds.categorize(similarity).to_string();

    debug!(
        "{} / {}: {:.2} ({}) via {:?}",
        a.name, b.name, similarity, category, tokenizer
    );

    Some(SimilarityResult {
        file1: a.name.clone(),
        file2: b.name.clone(),
        similarity,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ThresholdTable;
    use crate::tokenize::Strategy;
    use std::collections::HashSet;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<SourceFile> {
        files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                SourceFile::new(path, dir)
            })
            .collect()
    }

    #[test]
    fn test_identical_files_top_tier() {
        let temp = TempDir::new().unwrap();
        let files = write_files(temp.path(), &[("a.txt", "x = 1"), ("b.txt", "x = 1")]);

        let comparison = compare_files(&files, &Config::default());
        assert_eq!(comparison.omitted, 0);
        assert_eq!(
            comparison.results,
            vec![SimilarityResult {
                file1: "a.txt".to_string(),
                file2: "b.txt".to_string(),
                similarity: 100.0,
                category: "Very High".to_string(),
            }]
        );
    }

    #[test]
    fn test_unrelated_files_bottom_tier() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[("a.go", "func f(){}"), ("b.go", "package main")],
        );

        let comparison = compare_files(&files, &Config::default());
        let result = &comparison.results[0];
        assert!(result.similarity < 30.0);
        assert_eq!(result.category, "Very Low");
    }

    #[test]
    fn test_pair_order_and_count() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[
                ("a.txt", "a"),
                ("b.txt", "b"),
                ("c.txt", "c"),
                ("d.txt", "d"),
                ("e.txt", "e"),
            ],
        );

        for jobs in [Some(1), Some(3), None] {
            let config = Config {
                jobs,
                ..Default::default()
            };
            let results = compare_files(&files, &config).results;
            assert_eq!(results.len(), 10);

            let order: Vec<(String, String)> = results
                .iter()
                .map(|r| (r.file1.clone(), r.file2.clone()))
                .collect();
            let mut expected = Vec::new();
            for i in 0..files.len() {
                for j in i + 1..files.len() {
                    expected.push((files[i].name.clone(), files[j].name.clone()));
                }
            }
            assert_eq!(order, expected);

            let unique: HashSet<_> = order.iter().cloned().collect();
            assert_eq!(unique.len(), order.len());
            assert!(order.iter().all(|(a, b)| a != b));
        }
    }

    #[test]
    fn test_unreadable_file_omits_its_pairs() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[("a.txt", "same"), ("b.txt", "same"), ("c.txt", "same")],
        );
        fs::remove_file(&files[1].path).unwrap();

        let comparison = compare_files(&files, &Config::default());
        assert_eq!(comparison.omitted, 2);
        assert_eq!(comparison.results.len(), 1);
        assert_eq!(comparison.results[0].file1, "a.txt");
        assert_eq!(comparison.results[0].file2, "c.txt");
    }

    #[test]
    fn test_parse_failure_omits_pair() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[
                ("a.go", "package main\nfunc f() int { return 1 }\n"),
                ("b.go", "package main\nfunc g() int { return 2 }\n"),
                ("broken.go", "package main\nfunc (\n"),
            ],
        );
        let config = Config {
            strategy: Strategy::Syntax,
            ..Default::default()
        };

        let comparison = compare_files(&files, &config);
        assert_eq!(comparison.omitted, 2);
        assert_eq!(comparison.results.len(), 1);
        assert_eq!(comparison.results[0].similarity, 100.0);
    }

    #[test]
    fn test_auto_falls_back_to_generic() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[("a.go", "package main\nfunc (\n"), ("b.txt", "package main")],
        );
        let config = Config {
            strategy: Strategy::Auto,
            ..Default::default()
        };

        // b.txt has no grammar, so the broken Go file is lexed, not parsed
        let comparison = compare_files(&files, &config);
        assert_eq!(comparison.omitted, 0);
        assert_eq!(comparison.results.len(), 1);
    }

    #[test]
    fn test_auto_lexes_pairs_across_languages() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[
                ("a.go", "package main\nfunc add(a int, b int) int { return a + b }\n"),
                ("b.py", "def totally_different(items):\n    print(len(items))\n"),
            ],
        );
        let run = |strategy| {
            let config = Config {
                strategy,
                ..Default::default()
            };
            compare_files(&files, &config).results
        };

        let auto = run(Strategy::Auto);
        assert_eq!(auto, run(Strategy::Generic));
        assert_ne!(auto, run(Strategy::Syntax));
        assert_eq!(auto[0].category, "Very Low");
    }

    #[test]
    fn test_line_strategy_with_custom_table() {
        let temp = TempDir::new().unwrap();
        let files = write_files(
            temp.path(),
            &[("a.txt", "one\ntwo\nthree\nfour"), ("b.txt", "one\ntwo\nfive\nsix")],
        );
        let config = Config {
            strategy: Strategy::Lines,
            thresholds: ThresholdTable::coarse(),
            ..Default::default()
        };

        let result = &compare_files(&files, &config).results[0];
        assert_eq!(result.similarity, 50.0);
        assert_eq!(result.category, "Medium");
    }

    #[test]
    fn test_result_count_is_n_choose_2() {
        let temp = TempDir::new().unwrap();
        let specs: Vec<(String, String)> = (0..12)
            .map(|i| (format!("f{:02}.txt", i), format!("value_{} = {}", i, i)))
            .collect();
        let borrowed: Vec<(&str, &str)> = specs
            .iter()
            .map(|(n, c)| (n.as_str(), c.as_str()))
            .collect();
        let files = write_files(temp.path(), &borrowed);

        let comparison = compare_files(&files, &Config::default());
        assert_eq!(comparison.results.len(), 12 * 11 / 2);
        assert!(comparison
            .results
            .iter()
            .all(|r| (0.0..=100.0).contains(&r.similarity)));
    }
}
