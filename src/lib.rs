pub mod category;
pub mod compare;
pub mod config;
pub mod error;
pub mod filters;
pub mod output;
pub mod pdf;
pub mod score;
pub mod syntax;
pub mod tokenize;
pub mod walker;

pub use category::{Scale, ThresholdTable};
pub use compare::{compare_files, Comparison, SimilarityResult};
pub use config::Config;
pub use error::SimilarityError;
pub use output::{write_report, OutputFormat};
pub use tokenize::{Strategy, Tokenizer};
pub use walker::{discover_files, Discovery, SourceFile};
