//! Report as a multi-page A4 table, drawn with `pdf-writer` and the
//! built-in Helvetica font.

use crate::export::report::Report;
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 20.0;

const FONT_SIZE: f32 = 10.0;
const HEADER_FONT_SIZE: f32 = 11.0;
const TITLE_FONT_SIZE: f32 = 14.0;

/// Gray levels for the table background.
const HEADER_FILL: (f32, f32, f32) = (0.85, 0.87, 0.90);
const BAND_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

pub struct ReportPdf {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
}

impl Default for ReportPdf {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPdf {
    pub fn new() -> Self {
        let mut pdf = Pdf::new();

        // fixed ids for the document skeleton
        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            page_refs: Vec::new(),
            next_id: 4,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    /// Draw every row of `report`, repeating the header on each page. The
    /// totals line closes the table with the header shading.
    pub fn write_report(&mut self, report: &Report) {
        let headers: Vec<String> = report.headers().iter().map(|h| h.to_string()).collect();
        let rows = report.table();
        let widths = column_widths(&headers, &rows);
        let subtitle = format!(
            "{} to {}  |  worked {}  |  break {}",
            report.first_day.format("%Y-%m-%d"),
            report.to.format("%Y-%m-%d %H:%M UTC"),
            report.total_worked,
            report.total_break
        );

        let mut remaining: &[Vec<String>] = &rows;
        let mut page_no = 1;

        while !remaining.is_empty() {
            let mut content = Content::new();
            draw_text(&mut content, MARGIN, PAGE_H - MARGIN + 15.0, TITLE_FONT_SIZE, &report.title);
            draw_text(&mut content, MARGIN, PAGE_H - MARGIN, FONT_SIZE, &subtitle);
            draw_text(
                &mut content,
                PAGE_W - MARGIN - 60.0,
                MARGIN - 35.0,
                FONT_SIZE,
                &format!("Page {page_no}"),
            );

            let mut y = PAGE_H - MARGIN - 40.0;
            draw_row(&mut content, y, &widths, &headers, HEADER_FONT_SIZE, Some(HEADER_FILL));
            y -= ROW_H;

            let mut consumed = 0;
            for (i, row) in remaining.iter().enumerate() {
                if y - ROW_H < MARGIN {
                    break;
                }

                let fill = if remaining.len() - i == 1 {
                    Some(HEADER_FILL)
                } else if i % 2 == 0 {
                    Some(BAND_FILL)
                } else {
                    None
                };
                draw_row(&mut content, y, &widths, row, FONT_SIZE, fill);

                y -= ROW_H;
                consumed += 1;
            }

            self.add_page(content);
            remaining = &remaining[consumed..];
            page_no += 1;
        }
    }

    fn add_page(&mut self, content: Content) {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();
        self.page_refs.push(page_id);

        {
            let mut page = self.pdf.page(page_id);
            page.parent(self.pages_id)
                .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
                .contents(content_id);
            page.resources().fonts().pair(Name(b"F1"), self.font_id);
        }

        self.pdf.stream(content_id, &content.finish());
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);

        {
            let mut pages = self.pdf.pages(self.pages_id);
            pages.count(self.page_refs.len() as i32);
            pages.kids(self.page_refs.iter().copied());
        }

        self.pdf.finish()
    }
}

fn draw_text(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
    content.begin_text();
    content.set_font(Name(b"F1"), size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(text.as_bytes()));
    content.end_text();
}

fn draw_row(
    content: &mut Content,
    y: f32,
    widths: &[f32],
    cells: &[String],
    font_size: f32,
    fill: Option<(f32, f32, f32)>,
) {
    if let Some((r, g, b)) = fill {
        content.save_state();
        content.set_fill_rgb(r, g, b);
        content.rect(MARGIN, y, widths.iter().sum(), ROW_H);
        content.fill_nonzero();
        content.restore_state();
    }

    let mut x = MARGIN;
    for (text, w) in cells.iter().zip(widths) {
        draw_text(content, x + 4.0, y + 5.0, font_size, text);

        content.save_state();
        content.set_stroke_rgb(0.65, 0.65, 0.65);
        content.rect(x, y, *w, ROW_H);
        content.stroke();
        content.restore_state();

        x += w;
    }
}

/// Widths from header and cell lengths, scaled down to fit the page.
fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<f32> {
    let mut widths: Vec<f32> = headers.iter().map(|h| h.len() as f32 * 6.5).collect();

    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = w.max(cell.len() as f32 * 6.2 + 8.0);
        }
    }

    let total: f32 = widths.iter().sum();
    let max = PAGE_W - 2.0 * MARGIN;
    if total > max {
        let scale = max / total;
        for w in &mut widths {
            *w *= scale;
        }
    }
    widths
}
