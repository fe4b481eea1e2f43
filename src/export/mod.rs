use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::history::HistoryItem;

pub const EXPORT_FILENAME: &str = "nlp-history.pdf";

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 20.0;
const BODY_INDENT_MM: f64 = 25.0;
/// Minimum vertical room required before starting a new item. Below this
/// the item moves to a fresh page, so its header is never orphaned at the
/// bottom of a page.
const ITEM_BREAK_THRESHOLD_MM: f64 = 50.0;
const WRAP_COLUMNS: usize = 95;

const TITLE_SIZE: f64 = 20.0;
const META_SIZE: f64 = 10.0;
const HEADER_SIZE: f64 = 12.0;
const BODY_SIZE: f64 = 8.0;

/// One positioned line of text. `y` is measured from the top edge in
/// millimetres; the renderer flips it into PDF coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub spans: Vec<TextSpan>,
}

struct LayoutCursor {
    done: Vec<PageLayout>,
    current: PageLayout,
    y: f64,
}

impl LayoutCursor {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: PageLayout::default(),
            y: MARGIN_MM,
        }
    }

    fn remaining(&self) -> f64 {
        PAGE_HEIGHT_MM - self.y
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = MARGIN_MM;
    }

    fn line(&mut self, x: f64, size: f64, text: impl Into<String>, advance: f64) {
        if self.y > PAGE_HEIGHT_MM - MARGIN_MM {
            self.break_page();
        }
        self.current.spans.push(TextSpan {
            x,
            y: self.y,
            size,
            text: text.into(),
        });
        self.y += advance;
    }

    fn gap(&mut self, advance: f64) {
        self.y += advance;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.done.push(self.current);
        self.done
    }
}

/// Deterministic layout of the export document: title block, export date,
/// then a numbered block per item in input order.
pub fn layout_document(items: &[HistoryItem], exported_at: DateTime<Utc>) -> Vec<PageLayout> {
    let mut cursor = LayoutCursor::new();

    cursor.line(MARGIN_MM, TITLE_SIZE, "NLP History Export", 20.0);
    cursor.line(
        MARGIN_MM,
        META_SIZE,
        format!("Exported on: {}", exported_at.format("%Y-%m-%d")),
        20.0,
    );

    for (index, item) in items.iter().enumerate() {
        if cursor.remaining() < ITEM_BREAK_THRESHOLD_MM {
            cursor.break_page();
        }

        cursor.line(
            MARGIN_MM,
            HEADER_SIZE,
            format!("{}. {}", index + 1, item.kind.display_upper()),
            10.0,
        );
        cursor.line(
            MARGIN_MM,
            BODY_SIZE,
            format!("Date: {}", item.timestamp.format("%Y-%m-%d %H:%M:%S")),
            10.0,
        );

        cursor.line(MARGIN_MM, BODY_SIZE, "Input:", 5.0);
        for line in wrap_text(&item.input, WRAP_COLUMNS) {
            cursor.line(BODY_INDENT_MM, BODY_SIZE, line, 4.0);
        }
        cursor.gap(5.0);

        cursor.line(MARGIN_MM, BODY_SIZE, "Output:", 5.0);
        for line in wrap_text(&item.output, WRAP_COLUMNS) {
            cursor.line(BODY_INDENT_MM, BODY_SIZE, line, 4.0);
        }
        cursor.gap(15.0);
    }

    cursor.finish()
}

/// Renders laid-out pages to PDF bytes. No side effects beyond the
/// returned artifact.
pub fn render_pdf(pages: &[PageLayout]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        "NLP History Export",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "content",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load built-in PDF font: {e}"))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            layer = doc.get_page(page_index).get_layer(layer_index);
        }
        for span in &page.spans {
            layer.use_text(
                span.text.clone(),
                span.size,
                Mm(span.x),
                Mm(PAGE_HEIGHT_MM - span.y),
                &font,
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to serialize PDF: {e}"))
}

pub fn export_pdf(items: &[HistoryItem], exported_at: DateTime<Utc>) -> Result<Vec<u8>> {
    render_pdf(&layout_document(items, exported_at))
}

/// Greedy word wrap at a fixed column width. Words longer than the width
/// are split hard.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            for chunk in split_long_word(word, columns) {
                let chunk_len = chunk.chars().count();
                if !line.is_empty() && line.chars().count() + 1 + chunk_len > columns {
                    lines.push(std::mem::take(&mut line));
                }
                if line.is_empty() {
                    line.push_str(&chunk);
                } else {
                    line.push(' ');
                    line.push_str(&chunk);
                }
            }
        }
        lines.push(line);
    }
    lines
}

fn split_long_word(word: &str, columns: usize) -> Vec<String> {
    if word.chars().count() <= columns {
        return vec![word.to_string()];
    }
    word.chars()
        .collect::<Vec<_>>()
        .chunks(columns)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
