//! The rendered flipbook document and the sinks that persist it.
//!
//! [`FlipbookDocument`] is the in-memory result of a render: one shared set
//! of sheet margins and an ordered list of [`PageElement`]s, each a finished
//! card (PNG bytes) with its number and display height. The layout is a
//! single run of inline images, so the word processor places cards side by
//! side and wraps them onto new lines and sheets; [`PageFit`] estimates that
//! flow for reporting.
//!
//! Persisting is behind the [`DocumentSink`] trait; [`docx::DocxSink`] is the
//! production implementation.

pub mod docx;

use crate::config::PaperSize;
use crate::error::FlipbookError;
use serde::Serialize;
use std::path::Path;

/// One card placed in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageElement {
    /// 1-based card number; equals the frame's position in the batch.
    pub number: usize,
    /// Encoded card (PNG).
    pub png: Vec<u8>,
    /// Card width in pixels, margin and cut guide included.
    pub width_px: u32,
    /// Card height in pixels, cut guide included.
    pub height_px: u32,
    /// Width of the white binding margin in pixels.
    pub left_margin_px: u32,
    /// Printed height; the width scales proportionally.
    pub display_height_cm: f64,
}

impl PageElement {
    /// Printed width implied by the display height and the pixel aspect ratio.
    pub fn display_width_cm(&self) -> f64 {
        if self.height_px == 0 {
            return 0.0;
        }
        self.display_height_cm * f64::from(self.width_px) / f64::from(self.height_px)
    }
}

/// Ordered cards inside one set of sheet margins.
#[derive(Debug, Clone, PartialEq)]
pub struct FlipbookDocument {
    pub paper: PaperSize,
    /// Margin on all four sides of every sheet.
    pub sheet_margin_cm: f64,
    elements: Vec<PageElement>,
}

impl FlipbookDocument {
    /// An empty document with uniform sheet margins.
    pub fn new(paper: PaperSize, sheet_margin_cm: f64) -> Self {
        Self {
            paper,
            sheet_margin_cm,
            elements: Vec::new(),
        }
    }

    /// Append a card at the end of the shared run.
    pub fn push(&mut self, element: PageElement) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[PageElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Card numbers in document order.
    pub fn numbers(&self) -> Vec<usize> {
        self.elements.iter().map(|e| e.number).collect()
    }

    /// Printable area `(width, height)` in centimetres.
    pub fn content_area_cm(&self) -> (f64, f64) {
        let (w, h) = self.paper.dimensions_cm();
        (
            w - 2.0 * self.sheet_margin_cm,
            h - 2.0 * self.sheet_margin_cm,
        )
    }

    /// Estimate how the inline cards flow onto sheets.
    pub fn fit(&self) -> PageFit {
        PageFit::estimate(self)
    }
}

/// How the cards of a document flow onto printed sheets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageFit {
    /// Cards on the first line.
    pub cards_per_line: usize,
    /// Lines of cards stacked on one sheet.
    pub lines_per_sheet: usize,
    /// Total lines of cards.
    pub lines: usize,
    /// Sheets needed to print every card.
    pub sheets: usize,
}

impl PageFit {
    /// Simulate inline flow: cards left to right, wrapping when the next card
    /// would overflow the content width, lines stacked at the tallest card
    /// height. A card wider than the content area takes a line of its own.
    pub fn estimate(doc: &FlipbookDocument) -> Self {
        if doc.is_empty() {
            return Self::default();
        }
        let (content_w, content_h) = doc.content_area_cm();

        let mut lines = 1usize;
        let mut first_line = 0usize;
        let mut line_w = 0.0f64;
        let mut in_line = 0usize;
        for e in doc.elements() {
            let w = e.display_width_cm();
            if in_line > 0 && line_w + w > content_w {
                lines += 1;
                line_w = 0.0;
                in_line = 0;
            }
            line_w += w;
            in_line += 1;
            if lines == 1 {
                first_line = in_line;
            }
        }

        let line_h = doc
            .elements()
            .iter()
            .map(|e| e.display_height_cm)
            .fold(0.0f64, f64::max);
        let lines_per_sheet = ((content_h / line_h).floor() as usize).max(1);

        Self {
            cards_per_line: first_line,
            lines_per_sheet,
            lines,
            sheets: lines.div_ceil(lines_per_sheet),
        }
    }
}

/// Persists a rendered document.
///
/// Implementations either write the whole document to `path` or return an
/// error; a failed save must not leave a file that looks complete.
pub trait DocumentSink {
    /// Save `document` to `path`, returning the number of bytes written.
    fn save(&self, document: &FlipbookDocument, path: &Path) -> Result<u64, FlipbookError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: usize, width_px: u32, height_px: u32, height_cm: f64) -> PageElement {
        PageElement {
            number,
            png: Vec::new(),
            width_px,
            height_px,
            left_margin_px: 0,
            display_height_cm: height_cm,
        }
    }

    fn doc_with(n: usize, width_px: u32, height_px: u32) -> FlipbookDocument {
        let mut doc = FlipbookDocument::new(PaperSize::A4, 1.0);
        for i in 1..=n {
            doc.push(card(i, width_px, height_px, 3.0));
        }
        doc
    }

    #[test]
    fn display_width_follows_aspect_ratio() {
        let e = card(1, 200, 100, 3.5);
        assert!((e.display_width_cm() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn empty_document_needs_no_sheets() {
        let doc = FlipbookDocument::new(PaperSize::A4, 1.27);
        assert!(doc.is_empty());
        assert_eq!(doc.fit(), PageFit::default());
    }

    #[test]
    fn cards_wrap_at_content_width() {
        // content area on A4 with 1 cm margins: 19 × 27.7 cm
        // each card 6 cm wide, 3 cm tall → 3 per line, 9 lines per sheet
        let doc = doc_with(10, 200, 100);
        let fit = doc.fit();
        assert_eq!(fit.cards_per_line, 3);
        assert_eq!(fit.lines, 4);
        assert_eq!(fit.lines_per_sheet, 9);
        assert_eq!(fit.sheets, 1);
    }

    #[test]
    fn many_cards_need_several_sheets() {
        let doc = doc_with(28, 200, 100);
        let fit = doc.fit();
        // 28 cards / 3 per line = 10 lines → 2 sheets of 9 lines
        assert_eq!(fit.lines, 10);
        assert_eq!(fit.sheets, 2);
    }

    #[test]
    fn oversized_card_gets_own_line() {
        let mut doc = FlipbookDocument::new(PaperSize::A4, 1.0);
        doc.push(card(1, 1000, 100, 3.0)); // 30 cm wide
        doc.push(card(2, 1000, 100, 3.0));
        let fit = doc.fit();
        assert_eq!(fit.cards_per_line, 1);
        assert_eq!(fit.lines, 2);
    }

    #[test]
    fn numbers_follow_push_order() {
        let doc = doc_with(5, 10, 10);
        assert_eq!(doc.numbers(), vec![1, 2, 3, 4, 5]);
    }
}
