//! Frame batch → printable flipbook document.
//!
//! Every frame goes through the same fixed stages, in order:
//!
//! 1. [`pipeline::margin`]: white binding strip on the left
//! 2. [`pipeline::border`]: one-pixel grey cut guide around the whole card
//! 3. [`pipeline::stamp`]: 1-based card number in the lower-left corner
//! 4. [`pipeline::encode`]: PNG in memory
//!
//! The cards are then placed, in batch order, into one run of a
//! [`FlipbookDocument`] at the configured display height, and the document is
//! handed to a [`DocumentSink`]. Rendering is a pure function of the frames
//! and the layout; only the save touches the file system.

use crate::config::{FlipbookConfig, LayoutParameters};
use crate::document::docx::DocxSink;
use crate::document::{DocumentSink, FlipbookDocument, PageElement};
use crate::error::FlipbookError;
use crate::frame::{Frame, FrameBatch};
use crate::output::RenderStats;
use crate::pipeline::{border, encode, margin, stamp};
use crate::progress::ProgressCallback;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Turn one frame into a finished card. `number` is 1-based.
pub fn render_card(
    frame: &Frame,
    number: usize,
    params: &LayoutParameters,
) -> Result<PageElement, FlipbookError> {
    let (with_margin, left_margin_px) = margin::apply(frame, params)?;
    let mut card = border::add_cut_guide(&with_margin);
    stamp::stamp_number(&mut card, number)?;

    let png = encode::encode_card(&card)
        .map_err(|source| FlipbookError::EncodeFailed { frame: number, source })?;

    debug!(
        "Card {}: {}x{} px, margin {} px, {} bytes",
        number,
        card.width(),
        card.height(),
        left_margin_px,
        png.len()
    );
    Ok(PageElement {
        number,
        png,
        width_px: card.width(),
        height_px: card.height(),
        left_margin_px,
        display_height_cm: params.target_height_cm,
    })
}

/// Build the in-memory document for `frames` without saving it.
///
/// Zero frames give an empty document, not an error. Parameters that fail
/// [`LayoutParameters::validate`] are rejected before any card is built.
pub fn render_document(
    frames: &[Frame],
    params: &LayoutParameters,
    progress: Option<&ProgressCallback>,
) -> Result<FlipbookDocument, FlipbookError> {
    params.validate()?;
    let total = frames.len();
    if let Some(cb) = progress {
        cb.on_render_start(total);
    }

    if params.border_linewidth_px != border::CUT_GUIDE_WIDTH {
        warn!(
            "border linewidth {} px requested; cut guide is always {} px",
            params.border_linewidth_px,
            border::CUT_GUIDE_WIDTH
        );
    }
    if let Some(first) = frames.first() {
        if frames.iter().any(|f| f.dimensions() != first.dimensions()) {
            warn!("Frames differ in size; cards will not line up when printed");
        }
    } else {
        warn!("No frames to render; writing an empty flipbook");
    }

    let mut doc = FlipbookDocument::new(params.paper, params.sheet_margin_cm);
    for (i, frame) in frames.iter().enumerate() {
        let number = i + 1;
        doc.push(render_card(frame, number, params)?);
        if let Some(cb) = progress {
            cb.on_card_rendered(number, total);
        }
    }
    Ok(doc)
}

/// Render `frames` and save the document through `sink`.
///
/// Either every card renders and the save succeeds, or an error is returned
/// and no document is left at `dest`.
pub fn render_with_sink<S: DocumentSink + ?Sized>(
    frames: &[Frame],
    params: &LayoutParameters,
    dest: &Path,
    sink: &S,
    progress: Option<&ProgressCallback>,
) -> Result<RenderStats, FlipbookError> {
    let total_start = Instant::now();
    info!("Rendering {} frames to '{}'", frames.len(), dest.display());

    let render_start = Instant::now();
    let doc = render_document(frames, params, progress)?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let fit = doc.fit();
    let bytes_written = sink.save(&doc, dest)?;
    if let Some(cb) = progress {
        cb.on_render_complete(dest, doc.len());
    }

    let stats = RenderStats {
        output_path: dest.to_path_buf(),
        frames: frames.len(),
        cards: doc.len(),
        left_margin_px: doc.elements().first().map_or(0, |e| e.left_margin_px),
        fit,
        bytes_written,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Rendered {} cards ({} per line, ~{} sheets) in {}ms",
        stats.cards, fit.cards_per_line, fit.sheets, stats.total_duration_ms
    );
    Ok(stats)
}

/// Render `frames` with `params` into a `.docx` at `dest`.
///
/// # Example
/// ```rust,no_run
/// use flipbook_printer::{render, Frame, LayoutParameters};
/// use std::path::Path;
///
/// let frames = vec![Frame::new(320, 240); 12];
/// let stats = render(&frames, &LayoutParameters::default(), Path::new("book.docx")).unwrap();
/// assert_eq!(stats.cards, 12);
/// ```
pub fn render(
    frames: &[Frame],
    params: &LayoutParameters,
    dest: &Path,
) -> Result<RenderStats, FlipbookError> {
    render_with_sink(frames, params, dest, &DocxSink, None)
}

/// Render a finished batch with the job's layout and progress callback.
/// The batch is consumed.
pub fn render_batch(
    batch: FrameBatch,
    config: &FlipbookConfig,
    dest: &Path,
) -> Result<RenderStats, FlipbookError> {
    render_with_sink(
        batch.frames(),
        &config.layout,
        dest,
        &DocxSink,
        config.progress_callback.as_ref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::Mutex;

    fn frames(n: usize, w: u32, h: u32) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame::from_pixel(w, h, Rgb([(i * 20) as u8, 200, 100])))
            .collect()
    }

    fn params(height: f64, margin: f64) -> LayoutParameters {
        LayoutParameters::builder()
            .target_height_cm(height)
            .left_margin_cm(margin)
            .build()
            .unwrap()
    }

    fn decode(element: &PageElement) -> image::RgbImage {
        image::load_from_memory(&element.png).unwrap().to_rgb8()
    }

    /// The card `frame` should become when numbered `number`.
    fn expected_card(frame: &Frame, number: usize, p: &LayoutParameters) -> image::RgbImage {
        let (with_margin, _) = margin::apply(frame, p).unwrap();
        let mut card = border::add_cut_guide(&with_margin);
        stamp::stamp_number(&mut card, number).unwrap();
        card
    }

    #[derive(Default)]
    struct MemorySink {
        saved: Mutex<Option<FlipbookDocument>>,
    }

    impl DocumentSink for MemorySink {
        fn save(&self, document: &FlipbookDocument, _path: &Path) -> Result<u64, FlipbookError> {
            *self.saved.lock().unwrap() = Some(document.clone());
            Ok(document.len() as u64)
        }
    }

    struct FailingSink;

    impl DocumentSink for FailingSink {
        fn save(&self, _document: &FlipbookDocument, path: &Path) -> Result<u64, FlipbookError> {
            Err(FlipbookError::DocumentWriteFailed {
                path: path.to_path_buf(),
                detail: "disk full".into(),
            })
        }
    }

    #[test]
    fn card_geometry_includes_margin_and_border() {
        // 100 px tall frame, 4 cm printed, 2 cm margin → 50 px
        let el = render_card(&Frame::new(160, 100), 1, &params(4.0, 2.0)).unwrap();
        assert_eq!(el.left_margin_px, 50);
        assert_eq!((el.width_px, el.height_px), (160 + 50 + 2, 100 + 2));
        assert_eq!(el.display_height_cm, 4.0);

        let img = decode(&el);
        assert_eq!(img.dimensions(), (212, 102));
        assert_eq!(img.get_pixel(0, 0), &border::CUT_GUIDE_COLOR);
        assert_eq!(img.get_pixel(211, 101), &border::CUT_GUIDE_COLOR);
        assert_eq!(img.get_pixel(25, 5), &margin::MARGIN_COLOR);
    }

    #[test]
    fn cards_are_numbered_in_batch_order() {
        let batch = frames(12, 120, 90);
        let p = params(3.5, 2.5);
        let doc = render_document(&batch, &p, None).unwrap();
        assert_eq!(doc.numbers(), (1..=12).collect::<Vec<_>>());
        for (frame, el) in batch.iter().zip(doc.elements()) {
            assert_eq!(decode(el), expected_card(frame, el.number, &p), "card {}", el.number);
        }
        assert_ne!(decode(&doc.elements()[0]), expected_card(&batch[0], 2, &p));
    }

    #[test]
    fn margin_shrinks_as_target_height_grows() {
        let frame = frames(1, 50, 100);
        let small = render_document(&frame, &params(2.0, 1.0), None).unwrap();
        let large = render_document(&frame, &params(5.0, 1.0), None).unwrap();
        assert_eq!(small.elements()[0].left_margin_px, 50);
        assert_eq!(large.elements()[0].left_margin_px, 20);
    }

    #[test]
    fn empty_batch_is_an_empty_document() {
        let sink = MemorySink::default();
        let stats =
            render_with_sink(&[], &params(3.5, 2.5), Path::new("x.docx"), &sink, None).unwrap();
        assert_eq!(stats.cards, 0);
        assert_eq!(stats.left_margin_px, 0);
        assert!(sink.saved.lock().unwrap().as_ref().unwrap().is_empty());
    }

    #[test]
    fn rendering_is_repeatable() {
        let batch = frames(5, 64, 48);
        let p = params(3.5, 2.5);
        let a = render_document(&batch, &p, None).unwrap();
        let b = render_document(&batch, &p, None).unwrap();
        assert_eq!(a.numbers(), b.numbers());
        let margins = |d: &FlipbookDocument| {
            d.elements().iter().map(|e| e.left_margin_px).collect::<Vec<_>>()
        };
        assert_eq!(margins(&a), margins(&b));
    }

    #[test]
    fn sink_failure_propagates() {
        let err = render_with_sink(
            &frames(2, 10, 10),
            &params(3.5, 2.5),
            Path::new("x.docx"),
            &FailingSink,
            None,
        )
        .unwrap_err();
        assert!(err.is_render_failure());
    }

    #[test]
    fn render_writes_docx() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("book.docx");
        let stats = render(&frames(3, 40, 30), &LayoutParameters::default(), &dest).unwrap();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.cards, 3);
        assert_eq!(stats.bytes_written, std::fs::metadata(&dest).unwrap().len());
        assert!(stats.fit.sheets >= 1);
    }

    #[test]
    fn wide_border_request_still_draws_one_pixel_guide() {
        let p = LayoutParameters::builder()
            .target_height_cm(4.0)
            .left_margin_cm(2.0)
            .border_linewidth_px(3)
            .build()
            .unwrap();
        let el = render_card(&Frame::new(160, 100), 1, &p).unwrap();
        assert_eq!((el.width_px, el.height_px), (160 + 50 + 2, 100 + 2));

        let img = decode(&el);
        assert_eq!(img.get_pixel(0, 50), &border::CUT_GUIDE_COLOR);
        assert_eq!(img.get_pixel(1, 50), &margin::MARGIN_COLOR);
        assert_eq!(img.get_pixel(25, 0), &border::CUT_GUIDE_COLOR);
        assert_eq!(img.get_pixel(25, 1), &margin::MARGIN_COLOR);
    }

    #[test]
    fn oversized_margin_fails_without_saving() {
        let p = LayoutParameters::builder()
            .left_margin_cm(1e12)
            .build()
            .unwrap();
        let sink = MemorySink::default();
        let err = render_with_sink(&frames(2, 40, 30), &p, Path::new("x.docx"), &sink, None)
            .unwrap_err();
        assert!(matches!(err, FlipbookError::InvalidConfig(_)));
        assert!(sink.saved.lock().unwrap().is_none());
    }

    #[test]
    fn hand_built_parameters_are_validated() {
        let p = LayoutParameters {
            target_height_cm: 0.0,
            ..LayoutParameters::default()
        };
        let err = render_document(&frames(1, 40, 30), &p, None).unwrap_err();
        assert!(matches!(err, FlipbookError::InvalidConfig(_)));

        let p = LayoutParameters {
            left_margin_cm: -1.0,
            ..LayoutParameters::default()
        };
        assert!(render_document(&[], &p, None).is_err());
    }
}
