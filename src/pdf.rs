//! Paginated PDF table output.
//!
//! Writes a plain PDF 1.4 file by hand: built-in Helvetica fonts, one content
//! stream per page, and a cross-reference table with byte offsets. Cells wrap
//! instead of truncating, so every file name survives in full. Text is
//! WinAnsi-encoded; characters outside that code page are spelled as `[U+XXXX]`.

use crate::compare::SimilarityResult;
use crate::output::{ReportRenderer, COLUMNS, REPORT_TITLE};
use std::fmt::Write as _;
use std::io::Write;

/// Page geometry in PDF points (1/72 inch). Defaults to A4 portrait.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,
    pub row_height: f64,
    pub font_size: f64,
    pub column_widths: [f64; 4],
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            margin: 40.0,
            row_height: 20.0,
            font_size: 10.0,
            column_widths: [150.0, 150.0, 110.0, 105.0],
        }
    }
}

const TITLE_SIZE: f64 = 14.0;
const TITLE_BLOCK: f64 = 30.0;
const FOOTER_SIZE: f64 = 9.0;
const CELL_PADDING: f64 = 4.0;
/// Rough Helvetica advance width, as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.55;

/// One table row, each cell already split into display lines.
struct LaidOutRow {
    cells: [Vec<String>; 4],
    height: f64,
}

impl PdfRenderer {
    fn line_height(&self) -> f64 {
        self.font_size * 1.2
    }

    /// Top edge of the column header row on a given page.
    fn table_top(&self, first_page: bool) -> f64 {
        let top = self.page_height - self.margin;
        if first_page {
            top - TITLE_BLOCK
        } else {
            top
        }
    }

    /// Vertical space left for data rows below the header row.
    fn body_height(&self, first_page: bool) -> f64 {
        self.table_top(first_page) - self.row_height - self.margin
    }

    fn lay_out(&self, cells: [String; 4]) -> LaidOutRow {
        let cells = cells.map(|cell| winansi_text(&cell));
        let mut lines: [Vec<String>; 4] = Default::default();
        for ((slot, cell), width) in lines.iter_mut().zip(&cells).zip(self.column_widths) {
            *slot = wrap_text(cell, self.chars_per_line(width));
        }
        let tallest = lines.iter().map(Vec::len).max().unwrap_or(1) as f64;
        let height = self
            .row_height
            .max(tallest * self.line_height() + 2.0 * CELL_PADDING);
        LaidOutRow {
            cells: lines,
            height,
        }
    }

    fn chars_per_line(&self, width: f64) -> usize {
        let usable = width - 2.0 * CELL_PADDING;
        ((usable / (self.font_size * GLYPH_WIDTH)).floor() as usize).max(1)
    }

    /// Split rows into pages by height. A page always gets at least one row,
    /// and there is always at least one page.
    fn paginate(&self, rows: Vec<LaidOutRow>) -> Vec<Vec<LaidOutRow>> {
        let mut pages = vec![Vec::new()];
        let mut remaining = self.body_height(true);
        for row in rows {
            let current = pages.len() - 1;
            if row.height > remaining && !pages[current].is_empty() {
                pages.push(Vec::new());
                remaining = self.body_height(false);
            }
            remaining -= row.height;
            let last = pages.len() - 1;
            pages[last].push(row);
        }
        pages
    }

    fn page_content(&self, rows: &[LaidOutRow], page_index: usize, page_count: usize) -> String {
        let mut content = String::from("0.5 w\n");
        let first_page = page_index == 0;

        if first_page {
            let y = self.page_height - self.margin - TITLE_SIZE;
            push_text(&mut content, "F2", TITLE_SIZE, self.margin, y, REPORT_TITLE);
        }

        let mut top = self.table_top(first_page);
        let header = self.lay_out(COLUMNS.map(String::from));
        self.push_row(&mut content, "F2", top, &header);
        top -= header.height;
        for row in rows {
            self.push_row(&mut content, "F1", top, row);
            top -= row.height;
        }

        let footer = format!("Page {} of {}", page_index + 1, page_count);
        push_text(
            &mut content,
            "F1",
            FOOTER_SIZE,
            self.margin,
            self.margin / 2.0,
            &footer,
        );
        content
    }

    /// Bordered cells for one row whose top edge sits at `top`.
    fn push_row(&self, content: &mut String, font: &str, top: f64, row: &LaidOutRow) {
        let bottom = top - row.height;
        let mut x = self.margin;
        for (lines, width) in row.cells.iter().zip(self.column_widths) {
            let _ = writeln!(
                content,
                "{:.2} {:.2} {:.2} {:.2} re S",
                x, bottom, width, row.height
            );
            let mut baseline = top - CELL_PADDING - self.font_size;
            for line in lines {
                push_text(content, font, self.font_size, x + CELL_PADDING, baseline, line);
                baseline -= self.line_height();
            }
            x += width;
        }
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, results: &[SimilarityResult], out: &mut dyn Write) -> std::io::Result<()> {
        let rows = results
            .iter()
            .map(|row| {
                self.lay_out([
                    row.file1.clone(),
                    row.file2.clone(),
                    format!("{:.2}", row.similarity),
                    row.category.clone(),
                ])
            })
            .collect();
        let pages = self.paginate(rows);
        let mut doc = PdfDocument::new();

        // Fixed object numbers: 1 catalog, 2 page tree, 3-4 fonts, then a
        // (page, content) pair per page
        let page_ids: Vec<usize> = (0..pages.len()).map(|i| 5 + 2 * i).collect();
        let kids = page_ids
            .iter()
            .map(|id| format!("{id} 0 R"))
            .collect::<Vec<_>>()
            .join(" ");

        doc.add_object(b"<< /Type /Catalog /Pages 2 0 R >>");
        doc.add_object(
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()).as_bytes(),
        );
        for font in ["Helvetica", "Helvetica-Bold"] {
            doc.add_object(
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{font} /Encoding /WinAnsiEncoding >>"
                )
                .as_bytes(),
            );
        }

        for (index, rows) in pages.iter().enumerate() {
            let content_id = page_ids[index] + 1;
            doc.add_object(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    self.page_width, self.page_height, content_id
                )
                .as_bytes(),
            );
            let stream = self.page_content(rows, index, pages.len());
            doc.add_stream(stream.as_bytes());
        }

        out.write_all(&doc.finish())
    }
}

/// Byte buffer plus the offsets the cross-reference table needs.
struct PdfDocument {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfDocument {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn begin_object(&mut self) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    }

    fn add_object(&mut self, body: &[u8]) {
        self.begin_object();
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn add_stream(&mut self, data: &[u8]) {
        self.begin_object();
        self.buf
            .extend_from_slice(format!("<< /Length {} >>\nstream\n", data.len()).as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.buf.len();
        let size = self.offsets.len() + 1;
        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {size} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        );
        self.buf.extend_from_slice(xref.as_bytes());
        self.buf
    }
}

fn push_text(content: &mut String, font: &str, size: f64, x: f64, y: f64, text: &str) {
    let _ = writeln!(
        content,
        "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET",
        font,
        size,
        x,
        y,
        escape_pdf_text(text)
    );
}

/// Break `text` into lines of at most `max_chars` characters, preferring to
/// break after a path separator, space, `_` or `-`.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + max_chars).min(chars.len());
        if end < chars.len() {
            if let Some(pos) = chars[start..end]
                .iter()
                .rposition(|c| matches!(c, '/' | '\\' | ' ' | '_' | '-'))
            {
                if pos > 0 {
                    end = start + pos + 1;
                }
            }
        }
        lines.push(chars[start..end].iter().collect());
        start = end;
    }
    lines
}

/// Replace characters the WinAnsi fonts cannot show with `[U+XXXX]`.
fn winansi_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if winansi_byte(c).is_some() {
            out.push(c);
        } else {
            let _ = write!(out, "[U+{:04X}]", c as u32);
        }
    }
    out
}

/// The WinAnsiEncoding (Windows-1252) byte for `c`, if it has one.
fn winansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Escape string-literal delimiters and write non-ASCII WinAnsi bytes as
/// octal escapes, keeping the content stream ASCII.
fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => match winansi_byte(c) {
                Some(byte) => {
                    let _ = write!(escaped, "\\{:03o}", byte);
                }
                None => escaped.push('?'),
            },
        }
    }
    escaped
}
