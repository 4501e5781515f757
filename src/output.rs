use crate::compare::SimilarityResult;
use crate::error::SimilarityError;
use crate::pdf::PdfRenderer;
use clap::ValueEnum;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const REPORT_TITLE: &str = "Code Similarity Report";

/// Column headings shared by every report format
pub const COLUMNS: [&str; 4] = ["File 1", "File 2", "Similarity %", "Category"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width text table
    #[default]
    Text,
    /// HTML table
    Html,
    /// Paginated PDF table
    Pdf,
    /// JSON array of results
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Html => "html",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Json => "json",
        }
    }

    pub fn default_file_name(&self) -> String {
        format!("file_similarity_report.{}", self.extension())
    }

    pub fn renderer(&self) -> Box<dyn ReportRenderer> {
        match self {
            OutputFormat::Text => Box::new(TextRenderer),
            OutputFormat::Html => Box::new(HtmlRenderer),
            OutputFormat::Pdf => Box::new(PdfRenderer::default()),
            OutputFormat::Json => Box::new(JsonRenderer),
        }
    }
}

/// Serializes comparison results. Implementations must keep the input order.
pub trait ReportRenderer {
    fn render(&self, results: &[SimilarityResult], out: &mut dyn Write) -> std::io::Result<()>;
}

/// Render `results` in `format` and write them to `path`.
pub fn write_report(
    results: &[SimilarityResult],
    format: OutputFormat,
    path: &Path,
) -> Result<(), SimilarityError> {
    let to_error = |source| SimilarityError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = fs::File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    format
        .renderer()
        .render(results, &mut writer)
        .map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    Ok(())
}

pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn render(&self, results: &[SimilarityResult], out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(
            out,
            "{:<30} {:<30} {:<15} {:<15}",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3]
        )?;
        writeln!(out, "{}", "-".repeat(90))?;
        for result in results {
            writeln!(
                out,
                "{:<30} {:<30} {:<15.2} {:<15}",
                result.file1, result.file2, result.similarity, result.category
            )?;
        }
        Ok(())
    }
}

pub struct HtmlRenderer;

const HTML_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
	<meta charset="UTF-8">
	<title>Code Similarity Report</title>
	<style>
		body { font-family: Arial, sans-serif; }
		table { width: 100%; border-collapse: collapse; margin-top: 20px; }
		th, td { border: 1px solid #ccc; padding: 8px; text-align: left; }
		th { background-color: #f4f4f4; }
		tr:nth-child(even) { background-color: #f9f9f9; }
	</style>
</head>
<body>
"#;

impl ReportRenderer for HtmlRenderer {
    fn render(&self, results: &[SimilarityResult], out: &mut dyn Write) -> std::io::Result<()> {
        write!(out, "{}", HTML_HEAD)?;
        writeln!(out, "\t<h2>{}</h2>", REPORT_TITLE)?;
        writeln!(out, "\t<table>")?;
        writeln!(
            out,
            "\t\t<tr><th>{}</th><th>{}</th><th>{}</th><th>{}</th></tr>",
            COLUMNS[0], COLUMNS[1], COLUMNS[2], COLUMNS[3]
        )?;
        for result in results {
            writeln!(
                out,
                "\t\t<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td></tr>",
                escape_html(&result.file1),
                escape_html(&result.file2),
                result.similarity,
                escape_html(&result.category)
            )?;
        }
        writeln!(out, "\t</table>")?;
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        Ok(())
    }
}

pub struct JsonRenderer;

impl ReportRenderer for JsonRenderer {
    fn render(&self, results: &[SimilarityResult], out: &mut dyn Write) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, results)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Escape HTML special characters in strings
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
