use anyhow::Result;
use clap::Parser;
use simcheck::{
    compare_files, discover_files, write_report, Config, OutputFormat, Scale, SimilarityError,
    Strategy, ThresholdTable,
};
use simcheck::config::DEFAULT_MAX_FILES;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simcheck")]
#[command(about = "Report pairwise similarity between the files in a directory", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory to analyze (default: current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the report here instead of file_similarity_report.<ext>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How file contents are turned into comparable tokens
    #[arg(short, long, value_enum, default_value_t = Strategy::Generic)]
    tokenizer: Strategy,

    /// Built-in category thresholds
    #[arg(long, value_enum, default_value_t = Scale::Fine)]
    scale: Scale,

    /// Custom category thresholds, e.g. "80:High,50:Medium,>0:Low,None"
    #[arg(long, conflicts_with = "scale")]
    thresholds: Option<ThresholdTable>,

    /// Compare only these file extensions (comma-separated, e.g., go,rs,py)
    #[arg(long, value_delimiter = ',')]
    include: Option<Vec<String>>,

    /// Never compare these file extensions (comma-separated, e.g., json,md)
    #[arg(long, value_delimiter = ',')]
    exclude: Option<Vec<String>>,

    /// Also walk hidden and git-ignored files
    #[arg(long)]
    no_ignore: bool,

    /// Maximum number of files compared (2-50)
    #[arg(long, default_value_t = DEFAULT_MAX_FILES as u64,
          value_parser = clap::value_parser!(u64).range(2..=DEFAULT_MAX_FILES as u64))]
    max_files: u64,

    /// Characters of each file the line tokenizer reads
    #[arg(long, default_value_t = simcheck::tokenize::DEFAULT_MAX_LINE_CHARS)]
    max_line_chars: usize,

    /// Worker threads for comparisons (1 = sequential, default: all cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            directory: self.path,
            format: self.format,
            output_file: self.output,
            include_extensions: self.include.unwrap_or(defaults.include_extensions),
            exclude_extensions: self.exclude,
            respect_ignore: !self.no_ignore,
            max_files: self.max_files as usize,
            max_line_chars: self.max_line_chars,
            strategy: self.tokenizer,
            thresholds: self
                .thresholds
                .unwrap_or_else(|| ThresholdTable::from(self.scale)),
            jobs: self.jobs.filter(|&n| n > 0),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &Config) -> Result<()> {
    let discovery = discover_files(config)?;

    println!("Analyzing files in directory: {}", discovery.root.display());
    println!("Total files found: {}", discovery.stats.format_included());
    if let Some(skipped) = discovery.stats.format_skipped() {
        println!("Skipped: {}", skipped);
    }

    let comparison = compare_files(&discovery.files, config);

    let report_path = config.report_path();
    write_report(&comparison.results, config.format, &report_path)?;

    println!("File similarity report generated at {}", report_path.display());
    println!("Total comparisons: {}", comparison.results.len());
    if comparison.omitted > 0 {
        println!("Omitted pairs: {}", comparison.omitted);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.into_config();

    match run(&config) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<SimilarityError>() {
            Some(err) => {
                eprintln!("Error: {}", err);
                std::process::exit(err.exit_code());
            }
            None => Err(e),
        },
    }
}
